use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, put},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use super::saved;
use crate::error::AppResult;
use crate::middleware::AdminSession;
use crate::models::{ClientSummary, EventCategory, FacilitySummary, LinkKind};
use crate::services::facilities::{alpha_cmp, eligible_facilities, TIME_ZONES};
use crate::services::forms::EventForm;
use crate::services::lifecycle::DEFAULT_TIME_ZONE;
use crate::services::loader::{load_admin_data, ViewScope};
use crate::services::ordering::{build_event_list, EventFilter};
use crate::services::links;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/events", get(list_events).post(create_event))
        .route("/events/form-options", get(form_options))
        .route("/events/{id}", put(update_event).delete(delete_event))
        .route("/events/{id}/form", get(edit_form))
        .route("/events/{id}/links/{link}", patch(toggle_link))
}

pub async fn list_events(
    State(state): State<Arc<AppState>>,
    _admin: AdminSession,
    Query(filter): Query<EventFilter>,
) -> AppResult<impl IntoResponse> {
    let scope = ViewScope::new(&state.shutdown);
    let data = load_admin_data(&state, &scope).await?;
    Ok(Json(build_event_list(data.events, &filter, Utc::now())))
}

pub async fn create_event(
    State(state): State<Arc<AppState>>,
    admin: AdminSession,
    Json(form): Json<EventForm>,
) -> AppResult<impl IntoResponse> {
    let input = form.into_input()?;
    let id = state.events.create(input).await?;
    info!("Event {} created by {}", id, admin.session.username);
    Ok((StatusCode::CREATED, saved(id)))
}

pub async fn update_event(
    State(state): State<Arc<AppState>>,
    admin: AdminSession,
    Path(id): Path<String>,
    Json(form): Json<EventForm>,
) -> AppResult<impl IntoResponse> {
    let patch = form.into_patch(&id)?;
    let id = state.events.update(patch).await?;
    info!("Event {} updated by {}", id, admin.session.username);
    Ok(saved(id))
}

pub async fn delete_event(
    State(state): State<Arc<AppState>>,
    admin: AdminSession,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let id = state.events.delete(&id).await?;
    info!("Event {} deleted by {}", id, admin.session.username);
    Ok(saved(id))
}

/// Форма редактирования, время в локальной зоне события.
pub async fn edit_form(
    State(state): State<Arc<AppState>>,
    _admin: AdminSession,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let mut event = state.events.get(&id).await?;
    if event.time_zone.is_none() && event.facility.is_none() {
        if let Ok(facility) = state.facilities.get(&event.facility_id).await {
            event.facility = Some(facility.summary());
        }
    }
    Ok(Json(EventForm::from_event(&event)))
}

#[derive(Debug, Deserialize)]
pub struct FormOptionsQuery {
    pub category: Option<EventCategory>,
    pub facility_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkOption {
    pub kind: LinkKind,
    pub label: &'static str,
    pub url_field: &'static str,
    pub show_field: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormOptions {
    pub categories: Vec<EventCategory>,
    pub facilities: Vec<FacilitySummary>,
    pub clients: Vec<ClientSummary>,
    pub logos: Vec<String>,
    pub time_zone: String,
    pub time_zones: Vec<&'static str>,
    pub links: Vec<LinkOption>,
}

/// Выпадающие списки формы события: объекты под выбранный вид,
/// компании, логотипы и зона выбранного объекта.
pub async fn form_options(
    State(state): State<Arc<AppState>>,
    _admin: AdminSession,
    Query(query): Query<FormOptionsQuery>,
) -> AppResult<impl IntoResponse> {
    let scope = ViewScope::new(&state.shutdown);
    let data = load_admin_data(&state, &scope).await?;

    let selected = query
        .facility_id
        .as_deref()
        .and_then(|id| data.facilities.iter().find(|f| f.id == id))
        .cloned();

    let mut clients: Vec<ClientSummary> = data.clients.iter().map(|c| c.summary()).collect();
    clients.sort_by(|a, b| {
        alpha_cmp(
            a.company_name.as_deref().unwrap_or_default(),
            b.company_name.as_deref().unwrap_or_default(),
        )
    });

    Ok(Json(FormOptions {
        categories: EventCategory::ALL.to_vec(),
        facilities: eligible_facilities(data.facilities, query.category)
            .iter()
            .map(|f| f.summary())
            .collect(),
        clients,
        logos: selected.as_ref().map(|f| f.logos.clone()).unwrap_or_default(),
        time_zone: selected
            .and_then(|f| f.time_zone)
            .unwrap_or_else(|| DEFAULT_TIME_ZONE.to_string()),
        time_zones: TIME_ZONES.to_vec(),
        links: LinkKind::ALL
            .iter()
            .map(|&kind| LinkOption {
                kind,
                label: kind.label(),
                url_field: kind.url_field(),
                show_field: kind.show_field(),
            })
            .collect(),
    }))
}

pub async fn toggle_link(
    State(state): State<Arc<AppState>>,
    _admin: AdminSession,
    Path((id, link)): Path<(String, LinkKind)>,
) -> AppResult<impl IntoResponse> {
    let event = links::toggle_link(state.events.as_ref(), &id, link).await?;
    Ok(Json(event))
}
