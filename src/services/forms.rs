//! Формы создания и редактирования. Проверка полей идёт до любого
//! обращения к API; время в форме - локальное время объекта.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::lifecycle::{from_local_input, parse_time_zone, to_local_input, DEFAULT_TIME_ZONE};
use crate::error::{AppError, AppResult};
use crate::models::{
    non_empty, ClientPatch, CreateClientInput, CreateEventInput, CreateFacilityInput, Event,
    EventCategory, EventLinks, EventPatch, FacilityPatch, FacilityType,
};

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message("is required".into()));
    }
    Ok(())
}

fn coordinate(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() || value.trim().parse::<f64>().is_ok_and(f64::is_finite) {
        return Ok(());
    }
    Err(ValidationError::new("coordinate").with_message("must be a number".into()))
}

fn parse_coordinate(value: Option<String>) -> AppResult<Option<f64>> {
    match non_empty(value) {
        Some(v) => v
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| AppError::Validation(format!("'{}' is not a valid coordinate", v))),
        None => Ok(None),
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EventForm {
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "is required"))]
    pub start_date_time: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "is required"))]
    pub end_date_time: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "is required"))]
    pub facility_id: String,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    #[validate(required(message = "is required"))]
    pub event_type: Option<EventCategory>,
    #[serde(default)]
    #[validate(length(min = 1, message = "is required"))]
    pub time_zone: String,
    #[serde(default)]
    pub event_logo: Option<String>,
    #[serde(flatten)]
    pub links: EventLinks,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default = "default_true")]
    pub is_public: bool,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub expected_version: Option<i64>,
}

impl EventForm {
    /// Форма редактирования: время переводится в зону события,
    /// иначе в зону объекта, иначе в зону по умолчанию.
    pub fn from_event(event: &Event) -> Self {
        let zone_name = event
            .time_zone
            .clone()
            .or_else(|| event.facility.as_ref().and_then(|f| f.time_zone.clone()))
            .filter(|z| parse_time_zone(z).is_ok())
            .unwrap_or_else(|| DEFAULT_TIME_ZONE.to_string());
        let zone = super::lifecycle::display_zone(Some(&zone_name));

        EventForm {
            name: event.name.clone(),
            start_date_time: to_local_input(event.start_date_time, zone),
            end_date_time: to_local_input(event.end_date_time, zone),
            facility_id: event.facility_ref().unwrap_or_default().to_string(),
            client_id: event.client_ref().map(str::to_string),
            event_type: event.category,
            time_zone: zone_name,
            event_logo: event.event_logo.clone(),
            links: event.links.clone(),
            notes: event.notes.clone(),
            is_public: event.is_public,
            featured: event.featured,
            expected_version: event.version,
        }
    }

    pub fn into_input(self) -> AppResult<CreateEventInput> {
        self.validate()?;

        let zone = parse_time_zone(&self.time_zone)?;
        let category = self
            .event_type
            .ok_or_else(|| AppError::Validation("eventType is required".to_string()))?;

        Ok(CreateEventInput {
            name: self.name.trim().to_string(),
            start_date_time: from_local_input(&self.start_date_time, zone)?,
            end_date_time: from_local_input(&self.end_date_time, zone)?,
            facility_id: self.facility_id,
            client_id: non_empty(self.client_id),
            category,
            time_zone: self.time_zone.trim().to_string(),
            event_logo: non_empty(self.event_logo),
            links: self.links.normalized(),
            notes: non_empty(self.notes),
            is_public: self.is_public,
            featured: self.featured,
        })
    }

    pub fn into_patch(self, id: &str) -> AppResult<EventPatch> {
        let expected_version = self.expected_version;
        let mut patch = EventPatch::replace_with(id, self.into_input()?);
        patch.expected_version = expected_version;
        Ok(patch)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FacilityForm {
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zipcode: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "coordinate"))]
    pub latitude: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "coordinate"))]
    pub longitude: Option<String>,
    #[serde(default)]
    pub facility_type: Option<FacilityType>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, message = "is required"))]
    pub time_zone: String,
    /// Без поля список логотипов при обновлении не трогаем.
    #[serde(default)]
    pub logos: Option<Vec<String>>,
    #[serde(default)]
    pub expected_version: Option<i64>,
}

impl FacilityForm {
    pub fn into_input(self) -> AppResult<CreateFacilityInput> {
        self.validate()?;
        parse_time_zone(&self.time_zone)?;

        Ok(CreateFacilityInput {
            name: self.name.trim().to_string(),
            address: non_empty(self.address),
            city: non_empty(self.city),
            state: non_empty(self.state).map(|s| s.trim().to_string()),
            zipcode: non_empty(self.zipcode),
            latitude: parse_coordinate(self.latitude)?,
            longitude: parse_coordinate(self.longitude)?,
            facility_type: self.facility_type,
            description: non_empty(self.description),
            time_zone: self.time_zone.trim().to_string(),
            logos: self.logos.unwrap_or_default(),
        })
    }

    pub fn into_patch(self, id: &str) -> AppResult<FacilityPatch> {
        let expected_version = self.expected_version;
        let logos = self.logos.clone();
        let mut patch = FacilityPatch::replace_with(id, self.into_input()?);
        patch.logos = logos;
        patch.expected_version = expected_version;
        Ok(patch)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CompanyForm {
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub company_name: String,
    #[serde(default)]
    pub company_website: Option<String>,
    #[serde(default)]
    pub company_description: Option<String>,
    /// Отсутствует - логотип не меняется, пустая строка - убрать.
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub expected_version: Option<i64>,
}

impl CompanyForm {
    pub fn into_input(self) -> AppResult<CreateClientInput> {
        self.validate()?;
        Ok(CreateClientInput {
            company_name: self.company_name.trim().to_string(),
            company_website: non_empty(self.company_website),
            company_description: non_empty(self.company_description),
            logo: non_empty(self.logo),
        })
    }

    pub fn into_patch(self, id: &str) -> AppResult<ClientPatch> {
        let expected_version = self.expected_version;
        let logo = self.logo.clone().map(|l| non_empty(Some(l)));
        let input = self.into_input()?;
        Ok(ClientPatch {
            id: id.to_string(),
            company_name: Some(input.company_name),
            company_website: Some(input.company_website),
            company_description: Some(input.company_description),
            logo,
            expected_version,
        })
    }
}
