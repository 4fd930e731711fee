use axum::{extract::State, response::IntoResponse, routing::{get, post}, Json, Router};
use chrono::Utc;
use std::sync::Arc;

use crate::error::AppResult;
use crate::middleware::AdminSession;
use crate::services::front_page::{load_front_page, reorder, ReorderGesture, RetryPolicy};
use crate::services::loader::{cancellable, ViewScope};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/frontpage", get(get_front_page))
        .route("/frontpage/reorder", post(reorder_front_page))
}

pub async fn get_front_page(
    State(state): State<Arc<AppState>>,
    _admin: AdminSession,
) -> AppResult<impl IntoResponse> {
    let scope = ViewScope::new(&state.shutdown);
    let events = cancellable(
        scope.token(),
        load_front_page(state.events.as_ref(), Utc::now()),
    )
    .await?;
    Ok(Json(events))
}

pub async fn reorder_front_page(
    State(state): State<Arc<AppState>>,
    admin: AdminSession,
    Json(gesture): Json<ReorderGesture>,
) -> AppResult<impl IntoResponse> {
    tracing::debug!("{} moves {} over {}", admin.session.username, gesture.active, gesture.over);
    let policy = RetryPolicy::from_config(&state.config.front_page);
    let outcome = reorder(state.events.as_ref(), &gesture, policy, Utc::now()).await?;
    Ok(Json(outcome))
}
