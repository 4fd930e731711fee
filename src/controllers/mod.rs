pub mod auth;
pub mod companies;
pub mod events;
pub mod facilities;
pub mod frontpage;
pub mod public;
pub mod stats;

use axum::{extract::Multipart, routing::get, Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::services::logos::UploadFile;

pub(crate) const UPLOAD_LIMIT_BYTES: usize = 10 * 1024 * 1024;

/// Маршруты админки, монтируются под `/api`.
pub fn routes() -> Router<Arc<crate::AppState>> {
    let admin = Router::new()
        .merge(events::routes())
        .merge(facilities::routes())
        .merge(companies::routes())
        .merge(frontpage::routes())
        .merge(stats::routes())
        .merge(auth::routes());

    Router::new().nest("/admin", admin)
}

/// Полное приложение без слоёв трассировки.
pub fn app(state: Arc<crate::AppState>) -> Router {
    Router::new()
        .route("/", get(public::landing))
        .route("/health", get(public::health))
        .nest("/api", routes())
        .with_state(state)
}

pub(crate) fn saved(id: String) -> Json<Value> {
    Json(json!({ "success": true, "id": id }))
}

/// Все файловые поля формы. Поля без имени файла пропускаются.
pub(crate) async fn read_files(mut multipart: Multipart) -> AppResult<Vec<UploadFile>> {
    let mut files = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid upload: {}", e)))?
    {
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("invalid upload: {}", e)))?;

        files.push(UploadFile {
            file_name,
            content_type,
            data,
        });
    }
    Ok(files)
}
