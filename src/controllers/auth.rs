use axum::{
    extract::State,
    response::{IntoResponse, Redirect},
    routing::post,
    Router,
};
use std::sync::Arc;

use crate::error::AppResult;
use crate::middleware::AdminSession;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/signout", post(sign_out))
}

/// Завершает сессию и отправляет на публичную страницу.
pub async fn sign_out(
    State(state): State<Arc<AppState>>,
    admin: AdminSession,
) -> AppResult<impl IntoResponse> {
    if state.config.features.enable_auth {
        state.identity.sign_out(&admin.token, &admin.session).await?;
    }
    Ok(Redirect::to("/"))
}
