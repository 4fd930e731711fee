use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use chrono::Utc;
use std::sync::Arc;

use crate::error::AppResult;
use crate::middleware::AdminSession;
use crate::services::loader::{load_admin_data, ViewScope};
use crate::services::stats;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/stats", get(get_stats))
}

pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    _admin: AdminSession,
) -> AppResult<impl IntoResponse> {
    let scope = ViewScope::new(&state.shutdown);
    let data = load_admin_data(&state, &scope).await?;
    Ok(Json(stats::compute(
        &data.events,
        &data.facilities,
        &data.clients,
        Utc::now(),
    )))
}
