use bytes::Bytes;
use time::OffsetDateTime;
use tracing::info;

use crate::{error::AppError, state::AppState};

use super::{encoder, repo::QrCode};

/// Filenames are deterministic in owner and second-resolution timestamp.
/// Two generates by the same user within one second collide and the second
/// file silently overwrites the first; the metadata rows stay distinct.
pub fn derive_filename(user_id: i64, now: OffsetDateTime) -> String {
    format!("qr_{}_{}.png", user_id, now.unix_timestamp())
}

/// Encode `data`, write the image, then record the metadata row.
///
/// The file write deliberately comes first: a failed insert leaves an
/// orphan file, never a row pointing at a file that was never written.
/// The two writes are not transactionally linked.
pub async fn generate_qr(
    state: &AppState,
    user_id: i64,
    data: &str,
) -> Result<QrCode, AppError> {
    let filename = derive_filename(user_id, OffsetDateTime::now_utc());

    let png = encoder::encode(data).map_err(|e| AppError::Encoding(e.to_string()))?;

    state
        .storage
        .put_object(&filename, Bytes::from(png))
        .await
        .map_err(AppError::StorageWrite)?;

    let code = QrCode::create(&state.db, user_id, data, &filename).await?;
    info!(user_id = %user_id, qr_id = %code.id, filename = %code.filename, "qr code generated");
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn filename_encodes_owner_and_second() {
        let ts = datetime!(2024-05-01 12:00:00 UTC);
        assert_eq!(derive_filename(7, ts), format!("qr_7_{}.png", ts.unix_timestamp()));
    }

    #[test]
    fn same_second_collides_for_same_user() {
        // Known weakness, asserted rather than hidden.
        let ts = datetime!(2024-05-01 12:00:00 UTC);
        assert_eq!(derive_filename(1, ts), derive_filename(1, ts));
    }

    #[test]
    fn distinct_users_never_collide() {
        let ts = datetime!(2024-05-01 12:00:00 UTC);
        assert_ne!(derive_filename(1, ts), derive_filename(2, ts));
    }
}
