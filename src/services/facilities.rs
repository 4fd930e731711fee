//! Группировка объектов по штатам, фильтры списка и выбор объекта для события.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

use crate::models::{Event, EventCategory, Facility, FacilityType};

pub const US_STATES: [&str; 50] = [
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "FL", "GA", "HI", "ID", "IL", "IN", "IA",
    "KS", "KY", "LA", "ME", "MD", "MA", "MI", "MN", "MS", "MO", "MT", "NE", "NV", "NH", "NJ",
    "NM", "NY", "NC", "ND", "OH", "OK", "OR", "PA", "RI", "SC", "SD", "TN", "TX", "UT", "VT",
    "VA", "WA", "WV", "WI", "WY",
];

pub const UNKNOWN_GROUP: &str = "Unknown";
pub const INTERNATIONAL_GROUP: &str = "International";

/// Часовые пояса в выпадающем списке формы объекта.
pub const TIME_ZONES: [&str; 8] = [
    "America/New_York",
    "America/Chicago",
    "America/Denver",
    "America/Phoenix",
    "America/Los_Angeles",
    "America/Anchorage",
    "Pacific/Honolulu",
    "UTC",
];

/// Сравнение для списков в интерфейсе: без учёта регистра, затем как есть.
pub(crate) fn alpha_cmp(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

pub fn group_key(state: Option<&str>) -> &str {
    match state {
        None | Some("") => UNKNOWN_GROUP,
        Some(code) if US_STATES.contains(&code) => code,
        Some(_) => INTERNATIONAL_GROUP,
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FacilityView {
    #[serde(flatten)]
    pub facility: Facility,
    pub event_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct FacilityGroup {
    pub key: String,
    pub count: usize,
    pub facilities: Vec<FacilityView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FacilityListing {
    pub count: usize,
    pub states: Vec<String>,
    pub groups: Vec<FacilityGroup>,
}

/// Ключи по алфавиту, `International` всегда последним.
pub fn group_facilities(views: Vec<FacilityView>) -> Vec<FacilityGroup> {
    let mut groups: HashMap<String, Vec<FacilityView>> = HashMap::new();
    for view in views {
        let key = group_key(view.facility.state.as_deref()).to_string();
        groups.entry(key).or_default().push(view);
    }

    let mut groups: Vec<FacilityGroup> = groups
        .into_iter()
        .map(|(key, mut facilities)| {
            facilities.sort_by(|a, b| alpha_cmp(&a.facility.name, &b.facility.name));
            FacilityGroup {
                key,
                count: facilities.len(),
                facilities,
            }
        })
        .collect();

    groups.sort_by(|a, b| {
        match (a.key == INTERNATIONAL_GROUP, b.key == INTERNATIONAL_GROUP) {
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            _ => alpha_cmp(&a.key, &b.key),
        }
    });
    groups
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FacilityFilter {
    pub search: Option<String>,
    pub state: Option<String>,
    pub facility_type: Option<FacilityType>,
}

impl FacilityFilter {
    pub fn matches(&self, facility: &Facility) -> bool {
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            if !facility
                .name
                .to_lowercase()
                .contains(&search.to_lowercase())
            {
                return false;
            }
        }
        if let Some(state) = self.state.as_deref().filter(|s| !s.is_empty()) {
            if facility.state.as_deref() != Some(state) {
                return false;
            }
        }
        if let Some(facility_type) = self.facility_type {
            if facility.facility_type != Some(facility_type) {
                return false;
            }
        }
        true
    }
}

/// Различные непустые штаты для фильтра.
pub fn state_options(facilities: &[Facility]) -> Vec<String> {
    facilities
        .iter()
        .filter_map(|f| f.state.as_deref())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn event_counts(events: &[Event]) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for event in events {
        if let Some(id) = event.facility_ref() {
            *counts.entry(id.to_string()).or_insert(0) += 1;
        }
    }
    counts
}

pub fn build_listing(
    facilities: Vec<Facility>,
    events: &[Event],
    filter: &FacilityFilter,
) -> FacilityListing {
    let states = state_options(&facilities);
    let counts = event_counts(events);

    let views: Vec<FacilityView> = facilities
        .into_iter()
        .filter(|f| filter.matches(f))
        .map(|facility| FacilityView {
            event_count: counts.get(&facility.id).copied().unwrap_or(0),
            facility,
        })
        .collect();

    FacilityListing {
        count: views.len(),
        states,
        groups: group_facilities(views),
    }
}

/// Объекты, подходящие под вид соревнования. Без вида подходят все.
pub fn eligible_facilities(
    facilities: Vec<Facility>,
    category: Option<EventCategory>,
) -> Vec<Facility> {
    let mut eligible: Vec<Facility> = match category {
        Some(category) => facilities
            .into_iter()
            .filter(|f| f.facility_type == Some(category.facility_type()))
            .collect(),
        None => facilities,
    };
    eligible.sort_by(|a, b| alpha_cmp(&a.name, &b.name));
    eligible
}
