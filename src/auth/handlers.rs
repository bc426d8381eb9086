use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tower_cookies::Cookies;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginForm, RegisterForm},
        password::{hash_password, verify_password},
        repo::{self, User},
        session,
    },
    error::AppError,
    pages,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", get(register_page).post(register))
        .route("/login", get(login_page).post(login))
        .route("/logout", get(logout))
}

pub(crate) fn is_valid_username(username: &str) -> bool {
    lazy_static! {
        static ref USERNAME_RE: Regex = Regex::new(r"^[A-Za-z0-9_.-]{3,150}$").unwrap();
    }
    USERNAME_RE.is_match(username)
}

#[instrument(skip(state, cookies))]
pub async fn register_page(
    State(state): State<AppState>,
    cookies: Cookies,
) -> Result<Response, AppError> {
    if session::resolve(&state, &cookies).await?.is_some() {
        return Ok(Redirect::to("/").into_response());
    }
    Ok(Html(pages::register_page(None)).into_response())
}

#[instrument(skip(state, form))]
pub async fn register(
    State(state): State<AppState>,
    Form(mut form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    form.username = form.username.trim().to_string();

    if !is_valid_username(&form.username) {
        warn!(username = %form.username, "invalid username");
        return Ok(Html(pages::register_page(Some(
            "Usernames are 3-150 letters, digits, '_', '.' or '-'.",
        )))
        .into_response());
    }
    if form.password.is_empty() {
        warn!("empty password");
        return Ok(Html(pages::register_page(Some("Password cannot be empty."))).into_response());
    }

    // Ensure the username is not taken before any write happens.
    if User::find_by_username(&state.db, &form.username)
        .await?
        .is_some()
    {
        warn!(username = %form.username, "username already registered");
        return Err(AppError::DuplicateUsername);
    }

    let hash = hash_password(&form.password).map_err(AppError::Internal)?;

    let user = match User::create(&state.db, &form.username, &hash).await {
        Ok(u) => u,
        // A racing registration can still hit the unique index.
        Err(e) if repo::is_duplicate_username(&e) => return Err(AppError::DuplicateUsername),
        Err(e) => return Err(e.into()),
    };

    info!(user_id = %user.id, username = %user.username, "user registered");
    Ok(Redirect::to("/login").into_response())
}

#[instrument(skip(state, cookies))]
pub async fn login_page(
    State(state): State<AppState>,
    cookies: Cookies,
) -> Result<Response, AppError> {
    if session::resolve(&state, &cookies).await?.is_some() {
        return Ok(Redirect::to("/").into_response());
    }
    Ok(Html(pages::login_page(None)).into_response())
}

#[instrument(skip(state, cookies, form))]
pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(mut form): Form<LoginForm>,
) -> Result<Response, AppError> {
    form.username = form.username.trim().to_string();

    let user = match User::find_by_username(&state.db, &form.username).await? {
        Some(u) => u,
        None => {
            warn!(username = %form.username, "login unknown username");
            return Err(AppError::InvalidCredentials);
        }
    };

    let ok = verify_password(&form.password, &user.password_hash).map_err(AppError::Internal)?;
    if !ok {
        warn!(username = %form.username, user_id = %user.id, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }

    session::establish(&state, &cookies, user.id).await?;
    info!(user_id = %user.id, username = %user.username, "user logged in");
    Ok(Redirect::to("/").into_response())
}

#[instrument(skip(state, cookies))]
pub async fn logout(
    State(state): State<AppState>,
    cookies: Cookies,
) -> Result<Redirect, AppError> {
    session::destroy(&state, &cookies).await?;
    Ok(Redirect::to("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_validation() {
        assert!(is_valid_username("alice"));
        assert!(is_valid_username("a.b-c_9"));
        assert!(!is_valid_username("al"));
        assert!(!is_valid_username("has space"));
        assert!(!is_valid_username(""));
        assert!(!is_valid_username(&"x".repeat(151)));
    }
}
