use std::path::{Path, PathBuf};

use anyhow::Context;
use axum::async_trait;
use bytes::Bytes;

/// Seam over the artifact file area so handlers never touch paths directly.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn put_object(&self, name: &str, body: Bytes) -> anyhow::Result<()>;
    /// Returns `None` when no object exists under `name`.
    async fn get_object(&self, name: &str) -> anyhow::Result<Option<Bytes>>;
}

/// Local-directory store; object names are plain file names inside `root`.
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub async fn create(root: &Path) -> anyhow::Result<Self> {
        tokio::fs::create_dir_all(root)
            .await
            .with_context(|| format!("create artifact dir {}", root.display()))?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }
}

#[async_trait]
impl ArtifactStore for FsStore {
    async fn put_object(&self, name: &str, body: Bytes) -> anyhow::Result<()> {
        let path = self.root.join(name);
        tokio::fs::write(&path, &body)
            .await
            .with_context(|| format!("write artifact {}", path.display()))?;
        Ok(())
    }

    async fn get_object(&self, name: &str) -> anyhow::Result<Option<Bytes>> {
        let path = self.root.join(name);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(Bytes::from(bytes))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("read artifact {}", path.display())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_get_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FsStore::create(dir.path()).await.expect("create store");

        store
            .put_object("a.png", Bytes::from_static(b"\x89PNGdata"))
            .await
            .expect("put should succeed");

        let got = store.get_object("a.png").await.expect("get should succeed");
        assert_eq!(got, Some(Bytes::from_static(b"\x89PNGdata")));
    }

    #[tokio::test]
    async fn get_missing_returns_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FsStore::create(dir.path()).await.expect("create store");
        let got = store.get_object("nope.png").await.expect("get ok");
        assert!(got.is_none());
    }

    #[tokio::test]
    async fn put_overwrites_existing_object() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FsStore::create(dir.path()).await.expect("create store");

        store
            .put_object("x.png", Bytes::from_static(b"first"))
            .await
            .unwrap();
        store
            .put_object("x.png", Bytes::from_static(b"second"))
            .await
            .unwrap();

        let got = store.get_object("x.png").await.unwrap();
        assert_eq!(got, Some(Bytes::from_static(b"second")));
    }
}
