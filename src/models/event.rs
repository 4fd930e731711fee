use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::facility::FacilityType;
use super::link::{EventLinks, LinksPatch};
use super::{ClientSummary, FacilitySummary};

/// Вид соревнования.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventCategory {
    IndoorTrack,
    OutdoorTrack,
    CrossCountry,
}

impl EventCategory {
    pub const ALL: [EventCategory; 3] = [
        EventCategory::IndoorTrack,
        EventCategory::OutdoorTrack,
        EventCategory::CrossCountry,
    ];

    /// У объектов кросс называется `CROSS_COUNTRY_COURSE`, у событий `CROSS_COUNTRY`.
    pub fn facility_type(self) -> FacilityType {
        match self {
            EventCategory::IndoorTrack => FacilityType::IndoorTrack,
            EventCategory::OutdoorTrack => FacilityType::OutdoorTrack,
            EventCategory::CrossCountry => FacilityType::CrossCountryCourse,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EventCategory::IndoorTrack => "INDOOR_TRACK",
            EventCategory::OutdoorTrack => "OUTDOOR_TRACK",
            EventCategory::CrossCountry => "CROSS_COUNTRY",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub name: String,
    pub start_date_time: DateTime<Utc>,
    pub end_date_time: DateTime<Utc>,
    #[serde(default)]
    pub time_zone: Option<String>,
    #[serde(default, rename = "eventType")]
    pub category: Option<EventCategory>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub featured: bool,
    #[serde(default)]
    pub front_page_order: Option<i32>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub is_public: bool,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub event_logo: Option<String>,
    #[serde(flatten)]
    pub links: EventLinks,
    #[serde(default, rename = "facilityID")]
    pub facility_id: String,
    #[serde(default, rename = "clientID")]
    pub client_id: Option<String>,
    #[serde(default)]
    pub facility: Option<FacilitySummary>,
    #[serde(default)]
    pub client: Option<ClientSummary>,
    #[serde(default, rename = "_version")]
    pub version: Option<i64>,
}

impl Event {
    /// Id объекта: из прямой ссылки или из присоединённой записи.
    pub fn facility_ref(&self) -> Option<&str> {
        if !self.facility_id.is_empty() {
            return Some(&self.facility_id);
        }
        self.facility.as_ref().map(|f| f.id.as_str())
    }

    pub fn client_ref(&self) -> Option<&str> {
        self.client_id
            .as_deref()
            .or_else(|| self.client.as_ref().map(|c| c.id.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventInput {
    pub name: String,
    pub start_date_time: DateTime<Utc>,
    pub end_date_time: DateTime<Utc>,
    #[serde(rename = "facilityID")]
    pub facility_id: String,
    #[serde(rename = "clientID")]
    pub client_id: Option<String>,
    #[serde(rename = "eventType")]
    pub category: EventCategory,
    pub time_zone: String,
    pub event_logo: Option<String>,
    #[serde(flatten)]
    pub links: EventLinks,
    pub notes: Option<String>,
    pub is_public: bool,
    pub featured: bool,
}

/// `UpdateEventInput`: API меняет только присутствующие поля.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPatch {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date_time: Option<DateTime<Utc>>,
    #[serde(rename = "facilityID", skip_serializing_if = "Option::is_none")]
    pub facility_id: Option<String>,
    #[serde(rename = "clientID", skip_serializing_if = "Option::is_none")]
    pub client_id: Option<Option<String>>,
    #[serde(rename = "eventType", skip_serializing_if = "Option::is_none")]
    pub category: Option<EventCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_logo: Option<Option<String>>,
    #[serde(flatten)]
    pub links: LinksPatch,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub front_page_order: Option<Option<i32>>,
    #[serde(rename = "_version", skip_serializing_if = "Option::is_none")]
    pub expected_version: Option<i64>,
}

impl EventPatch {
    pub fn new(id: impl Into<String>) -> Self {
        EventPatch {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Полная перезапись из формы редактирования.
    pub fn replace_with(id: impl Into<String>, input: CreateEventInput) -> Self {
        EventPatch {
            id: id.into(),
            name: Some(input.name),
            start_date_time: Some(input.start_date_time),
            end_date_time: Some(input.end_date_time),
            facility_id: Some(input.facility_id),
            client_id: Some(input.client_id),
            category: Some(input.category),
            time_zone: Some(input.time_zone),
            event_logo: Some(input.event_logo),
            links: LinksPatch::replace_all(input.links),
            notes: Some(input.notes),
            is_public: Some(input.is_public),
            featured: Some(input.featured),
            front_page_order: None,
            expected_version: None,
        }
    }

    pub fn apply(self, event: &mut Event) {
        if let Some(v) = self.name {
            event.name = v;
        }
        if let Some(v) = self.start_date_time {
            event.start_date_time = v;
        }
        if let Some(v) = self.end_date_time {
            event.end_date_time = v;
        }
        if let Some(v) = self.facility_id {
            if event.facility.as_ref().is_some_and(|f| f.id != v) {
                event.facility = None;
            }
            event.facility_id = v;
        }
        if let Some(v) = self.client_id {
            if event.client.as_ref().map(|c| Some(c.id.as_str())) != Some(v.as_deref()) {
                event.client = None;
            }
            event.client_id = v;
        }
        if let Some(v) = self.category {
            event.category = Some(v);
        }
        if let Some(v) = self.time_zone {
            event.time_zone = Some(v);
        }
        if let Some(v) = self.event_logo {
            event.event_logo = v;
        }
        self.links.apply(&mut event.links);
        if let Some(v) = self.notes {
            event.notes = v;
        }
        if let Some(v) = self.is_public {
            event.is_public = v;
        }
        if let Some(v) = self.featured {
            event.featured = v;
        }
        if let Some(v) = self.front_page_order {
            event.front_page_order = v;
        }
    }
}

impl Event {
    pub fn from_input(id: String, input: CreateEventInput) -> Self {
        Event {
            id,
            name: input.name,
            start_date_time: input.start_date_time,
            end_date_time: input.end_date_time,
            time_zone: Some(input.time_zone),
            category: Some(input.category),
            featured: input.featured,
            front_page_order: None,
            is_public: input.is_public,
            notes: input.notes,
            event_logo: input.event_logo,
            links: input.links,
            facility_id: input.facility_id,
            client_id: input.client_id,
            facility: None,
            client: None,
            version: Some(1),
        }
    }
}
