//! Session tokens: a signed JWT carried in an HttpOnly cookie, bound to a
//! server-side `sessions` row so logout actually revokes it.

use std::time::Duration;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tower_cookies::{Cookie, Cookies};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{config::SessionConfig, error::AppError, state::AppState};

use super::repo;

pub const SESSION_COOKIE: &str = "qrkeep_session";

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: i64,
    pub sid: String,
    pub iat: usize,
    pub exp: usize,
    pub iss: String,
    pub aud: String,
}

#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    audience: String,
    ttl: Duration,
}

impl FromRef<AppState> for SessionKeys {
    fn from_ref(state: &AppState) -> Self {
        Self::from_config(&state.config.session)
    }
}

impl SessionKeys {
    pub fn from_config(cfg: &SessionConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            ttl: Duration::from_secs((cfg.ttl_minutes as u64) * 60),
        }
    }

    pub fn sign(&self, user_id: i64, sid: &str) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(self.ttl.as_secs() as i64);
        let claims = SessionClaims {
            sub: user_id,
            sid: sid.to_string(),
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %user_id, "session token signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> anyhow::Result<SessionClaims> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<SessionClaims>(token, &self.decoding, &validation)?;
        debug!(user_id = %data.claims.sub, "session token verified");
        Ok(data.claims)
    }
}

/// Create a session row for `user_id` and set the signed cookie.
pub async fn establish(
    state: &AppState,
    cookies: &Cookies,
    user_id: i64,
) -> Result<(), AppError> {
    let sid = Uuid::new_v4().to_string();
    repo::create_session(&state.db, &sid, user_id).await?;

    let keys = SessionKeys::from_ref(state);
    let token = keys.sign(user_id, &sid).map_err(AppError::Internal)?;

    let mut cookie = Cookie::new(SESSION_COOKIE, token);
    cookie.set_http_only(true);
    cookie.set_path("/");
    cookies.add(cookie);
    Ok(())
}

/// Resolve the current request's session to a user id, if any.
///
/// A token that fails signature or expiry checks, or whose session row is
/// gone (logged out), resolves to `None` rather than an error.
pub async fn resolve(state: &AppState, cookies: &Cookies) -> Result<Option<i64>, AppError> {
    let Some(cookie) = cookies.get(SESSION_COOKIE) else {
        return Ok(None);
    };
    let keys = SessionKeys::from_ref(state);
    let claims = match keys.verify(cookie.value()) {
        Ok(c) => c,
        Err(_) => {
            warn!("invalid or expired session token");
            return Ok(None);
        }
    };
    let bound = repo::session_user(&state.db, &claims.sid).await?;
    Ok(bound.filter(|uid| *uid == claims.sub))
}

/// Drop the session row and the cookie. A no-op without an active session.
pub async fn destroy(state: &AppState, cookies: &Cookies) -> Result<(), AppError> {
    if let Some(cookie) = cookies.get(SESSION_COOKIE) {
        let keys = SessionKeys::from_ref(state);
        if let Ok(claims) = keys.verify(cookie.value()) {
            repo::delete_session(&state.db, &claims.sid).await?;
            debug!(user_id = %claims.sub, "session destroyed");
        }
        let mut removal = Cookie::new(SESSION_COOKIE, "");
        removal.set_path("/");
        cookies.remove(removal);
    }
    Ok(())
}

/// Extractor guarding identity-requiring handlers; rejects with a redirect
/// to the login page.
pub struct SessionUser(pub i64);

#[async_trait]
impl FromRequestParts<AppState> for SessionUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let cookies = Cookies::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::Unauthenticated)?;
        match resolve(state, &cookies).await? {
            Some(user_id) => Ok(SessionUser(user_id)),
            None => Err(AppError::Unauthenticated),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_keys(secret: &str) -> SessionKeys {
        SessionKeys::from_config(&SessionConfig {
            secret: secret.into(),
            issuer: "test-issuer".into(),
            audience: "test-aud".into(),
            ttl_minutes: 5,
        })
    }

    #[test]
    fn sign_and_verify_roundtrip() {
        let keys = make_keys("dev-secret");
        let sid = Uuid::new_v4().to_string();
        let token = keys.sign(42, &sid).expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.sid, sid);
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.aud, "test-aud");
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let token = make_keys("secret-one").sign(1, "sid").expect("sign");
        assert!(make_keys("secret-two").verify(&token).is_err());
    }

    #[test]
    fn verify_rejects_tampered_token() {
        let keys = make_keys("dev-secret");
        let mut token = keys.sign(7, "sid").expect("sign");
        // Flip a character in the signature segment.
        let flipped = if token.ends_with('x') { 'y' } else { 'x' };
        token.pop();
        token.push(flipped);
        assert!(keys.verify(&token).is_err());
    }

    #[test]
    fn verify_rejects_foreign_issuer() {
        let other = SessionKeys::from_config(&SessionConfig {
            secret: "dev-secret".into(),
            issuer: "someone-else".into(),
            audience: "test-aud".into(),
            ttl_minutes: 5,
        });
        let token = other.sign(1, "sid").expect("sign");
        assert!(make_keys("dev-secret").verify(&token).is_err());
    }
}
