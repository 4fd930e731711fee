use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use super::{read_files, saved, UPLOAD_LIMIT_BYTES};
use crate::error::AppResult;
use crate::middleware::AdminSession;
use crate::services::facilities::{build_listing, FacilityFilter};
use crate::services::forms::FacilityForm;
use crate::services::loader::{load_admin_data, ViewScope};
use crate::services::logos;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/facilities", get(list_facilities).post(create_facility))
        .route("/facilities/{id}", put(update_facility).delete(delete_facility))
        .route(
            "/facilities/{id}/logos",
            post(upload_logos)
                .delete(remove_logo)
                .layer(DefaultBodyLimit::max(UPLOAD_LIMIT_BYTES)),
        )
}

pub async fn list_facilities(
    State(state): State<Arc<AppState>>,
    _admin: AdminSession,
    Query(filter): Query<FacilityFilter>,
) -> AppResult<impl IntoResponse> {
    let scope = ViewScope::new(&state.shutdown);
    let data = load_admin_data(&state, &scope).await?;
    Ok(Json(build_listing(data.facilities, &data.events, &filter)))
}

pub async fn create_facility(
    State(state): State<Arc<AppState>>,
    admin: AdminSession,
    Json(form): Json<FacilityForm>,
) -> AppResult<impl IntoResponse> {
    let input = form.into_input()?;
    let id = state.facilities.create(input).await?;
    info!("Facility {} created by {}", id, admin.session.username);
    Ok((StatusCode::CREATED, saved(id)))
}

pub async fn update_facility(
    State(state): State<Arc<AppState>>,
    admin: AdminSession,
    Path(id): Path<String>,
    Json(form): Json<FacilityForm>,
) -> AppResult<impl IntoResponse> {
    let patch = form.into_patch(&id)?;
    let id = state.facilities.update(patch).await?;
    info!("Facility {} updated by {}", id, admin.session.username);
    Ok(saved(id))
}

pub async fn delete_facility(
    State(state): State<Arc<AppState>>,
    admin: AdminSession,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let id = state.facilities.delete(&id).await?;
    info!("Facility {} deleted by {}", id, admin.session.username);
    Ok(saved(id))
}

#[derive(Debug, Default, Deserialize)]
pub struct UploadQuery {
    #[serde(default)]
    pub replace: bool,
}

pub async fn upload_logos(
    State(state): State<Arc<AppState>>,
    _admin: AdminSession,
    Path(id): Path<String>,
    Query(query): Query<UploadQuery>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let files = read_files(multipart).await?;
    let result = logos::upload_facility_logos(
        state.storage.as_ref(),
        state.facilities.as_ref(),
        &id,
        files,
        query.replace,
    )
    .await?;

    info!(
        "Facility {} logos: {} uploaded, {} skipped, {} failed",
        id,
        result.report.uploaded.len(),
        result.report.skipped.len(),
        result.report.failed.len()
    );
    Ok(Json(result))
}

#[derive(Debug, Deserialize)]
pub struct LogoQuery {
    pub url: String,
}

pub async fn remove_logo(
    State(state): State<Arc<AppState>>,
    _admin: AdminSession,
    Path(id): Path<String>,
    Query(query): Query<LogoQuery>,
) -> AppResult<impl IntoResponse> {
    let facility = logos::remove_facility_logo(
        state.storage.as_ref(),
        state.facilities.as_ref(),
        &id,
        &query.url,
    )
    .await?;
    Ok(Json(facility))
}
