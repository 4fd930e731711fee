use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use std::sync::Arc;
use tracing::info;

use super::{read_files, saved, UPLOAD_LIMIT_BYTES};
use crate::error::{AppError, AppResult};
use crate::middleware::AdminSession;
use crate::models::Client;
use crate::services::facilities::alpha_cmp;
use crate::services::forms::CompanyForm;
use crate::services::loader::{cancellable, ViewScope};
use crate::services::logos;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/companies", get(list_companies).post(create_company))
        .route("/companies/{id}", put(update_company).delete(delete_company))
        .route(
            "/companies/{id}/logo",
            post(upload_logo).layer(DefaultBodyLimit::max(UPLOAD_LIMIT_BYTES)),
        )
}

pub async fn list_companies(
    State(state): State<Arc<AppState>>,
    _admin: AdminSession,
) -> AppResult<impl IntoResponse> {
    let scope = ViewScope::new(&state.shutdown);
    let load = async { Ok::<_, AppError>(state.clients.list_all().await?) };
    let mut clients: Vec<Client> = cancellable(scope.token(), load).await?;
    clients.sort_by(|a, b| alpha_cmp(&a.company_name, &b.company_name));
    Ok(Json(clients))
}

pub async fn create_company(
    State(state): State<Arc<AppState>>,
    admin: AdminSession,
    Json(form): Json<CompanyForm>,
) -> AppResult<impl IntoResponse> {
    let input = form.into_input()?;
    let id = state.clients.create(input).await?;
    info!("Company {} created by {}", id, admin.session.username);
    Ok((StatusCode::CREATED, saved(id)))
}

pub async fn update_company(
    State(state): State<Arc<AppState>>,
    admin: AdminSession,
    Path(id): Path<String>,
    Json(form): Json<CompanyForm>,
) -> AppResult<impl IntoResponse> {
    let patch = form.into_patch(&id)?;
    let id = state.clients.update(patch).await?;
    info!("Company {} updated by {}", id, admin.session.username);
    Ok(saved(id))
}

pub async fn delete_company(
    State(state): State<Arc<AppState>>,
    admin: AdminSession,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let id = state.clients.delete(&id).await?;
    info!("Company {} deleted by {}", id, admin.session.username);
    Ok(saved(id))
}

pub async fn upload_logo(
    State(state): State<Arc<AppState>>,
    _admin: AdminSession,
    Path(id): Path<String>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let file = read_files(multipart)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::Validation("select a logo file".to_string()))?;

    let client =
        logos::upload_company_logo(state.storage.as_ref(), state.clients.as_ref(), &id, file)
            .await?;
    Ok(Json(client))
}
