use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use tower_cookies::Cookies;
use tracing::{instrument, warn};

use crate::{
    auth::{repo::User, session, session::SessionUser},
    error::AppError,
    pages,
    state::AppState,
};

use super::{dto::GenerateForm, repo::QrCode, service};

pub fn qr_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/generate", post(generate))
        .route("/download/:filename", get(download))
}

/// Dashboard for a live session, landing page otherwise.
#[instrument(skip(state, cookies))]
pub async fn index(State(state): State<AppState>, cookies: Cookies) -> Result<Response, AppError> {
    let Some(user_id) = session::resolve(&state, &cookies).await? else {
        return Ok(Html(pages::landing_page()).into_response());
    };

    // A session row pointing at a deleted user should not happen, but a
    // stale cookie falls back to login rather than a 500.
    let Some(user) = User::find_by_id(&state.db, user_id).await? else {
        warn!(user_id = %user_id, "session resolved to unknown user");
        return Ok(Redirect::to("/login").into_response());
    };

    let codes = QrCode::list_by_user(&state.db, user_id).await?;
    Ok(Html(pages::dashboard_page(&user.username, &codes)).into_response())
}

#[instrument(skip(state, form))]
pub async fn generate(
    State(state): State<AppState>,
    SessionUser(user_id): SessionUser,
    Form(form): Form<GenerateForm>,
) -> Result<Redirect, AppError> {
    service::generate_qr(&state, user_id, &form.data).await?;
    Ok(Redirect::to("/"))
}

/// Streams a stored image as an attachment.
///
/// There is deliberately no ownership check here: anyone who knows a
/// filename can fetch it. Adding enforcement would change the external
/// contract, so the gap stays until that decision is made.
#[instrument(skip(state))]
pub async fn download(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    // Contain lookups to the artifact directory itself.
    if filename.contains('/') || filename.contains('\\') || filename.contains("..") {
        return Ok((StatusCode::NOT_FOUND, "Not Found").into_response());
    }

    let bytes = match state
        .storage
        .get_object(&filename)
        .await
        .map_err(AppError::Internal)?
    {
        Some(b) => b,
        None => return Ok((StatusCode::NOT_FOUND, "Not Found").into_response()),
    };

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("image/png"));
    headers.insert(
        header::CONTENT_DISPOSITION,
        format!("attachment; filename=\"{filename}\"")
            .parse()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("content-disposition: {e}")))?,
    );
    Ok((headers, bytes).into_response())
}
