//! Сводная статистика по событиям для страницы Stats.

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use std::collections::HashMap;

use super::facilities::{alpha_cmp, UNKNOWN_GROUP};
use super::lifecycle::EventStatus;
use crate::models::{Client, Event, Facility};

pub const TOP_LIMIT: usize = 8;
pub const NO_CLIENT: &str = "No Client";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total: usize,
    pub upcoming: usize,
    pub live: usize,
    pub completed: usize,
    pub featured: usize,
    pub public: usize,
    pub this_year: usize,
    pub by_category: Vec<Tally>,
    pub by_state: Vec<Tally>,
    pub top_clients: Vec<Tally>,
    pub top_facilities: Vec<Tally>,
}

/// Больше событий выше, при равенстве по имени.
fn ranked(counts: HashMap<String, usize>, limit: Option<usize>) -> Vec<Tally> {
    let mut tallies: Vec<Tally> = counts
        .into_iter()
        .map(|(label, count)| Tally { label, count })
        .collect();
    tallies.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| alpha_cmp(&a.label, &b.label)));
    if let Some(limit) = limit {
        tallies.truncate(limit);
    }
    tallies
}

pub fn compute(
    events: &[Event],
    facilities: &[Facility],
    clients: &[Client],
    now: DateTime<Utc>,
) -> Statistics {
    let facility_by_id: HashMap<&str, &Facility> =
        facilities.iter().map(|f| (f.id.as_str(), f)).collect();
    let client_by_id: HashMap<&str, &Client> =
        clients.iter().map(|c| (c.id.as_str(), c)).collect();

    let mut stats = Statistics {
        total: events.len(),
        upcoming: 0,
        live: 0,
        completed: 0,
        featured: 0,
        public: 0,
        this_year: 0,
        by_category: Vec::new(),
        by_state: Vec::new(),
        top_clients: Vec::new(),
        top_facilities: Vec::new(),
    };

    let mut by_category: HashMap<String, usize> = HashMap::new();
    let mut by_state: HashMap<String, usize> = HashMap::new();
    let mut by_client: HashMap<String, usize> = HashMap::new();
    let mut by_facility: HashMap<String, usize> = HashMap::new();

    for event in events {
        match EventStatus::derive(event.start_date_time, event.end_date_time, now) {
            EventStatus::Scheduled | EventStatus::ComingUp => stats.upcoming += 1,
            EventStatus::Live => stats.live += 1,
            EventStatus::Completed => stats.completed += 1,
        }
        if event.featured {
            stats.featured += 1;
        }
        if event.is_public {
            stats.public += 1;
        }
        if event.start_date_time.year() == now.year() {
            stats.this_year += 1;
        }

        let category = event
            .category
            .map(|c| c.as_str())
            .unwrap_or(UNKNOWN_GROUP);
        *by_category.entry(category.to_string()).or_insert(0) += 1;

        let facility = event.facility_ref().and_then(|id| facility_by_id.get(id));
        let state = facility
            .and_then(|f| f.state.as_deref())
            .or_else(|| event.facility.as_ref().and_then(|f| f.state.as_deref()))
            .filter(|s| !s.is_empty())
            .unwrap_or(UNKNOWN_GROUP);
        *by_state.entry(state.to_string()).or_insert(0) += 1;

        let facility_name = facility
            .map(|f| f.name.as_str())
            .or_else(|| event.facility.as_ref().and_then(|f| f.name.as_deref()))
            .unwrap_or(UNKNOWN_GROUP);
        *by_facility.entry(facility_name.to_string()).or_insert(0) += 1;

        let client_name = event
            .client_ref()
            .and_then(|id| client_by_id.get(id))
            .map(|c| c.company_name.as_str())
            .or_else(|| event.client.as_ref().and_then(|c| c.company_name.as_deref()))
            .unwrap_or(NO_CLIENT);
        *by_client.entry(client_name.to_string()).or_insert(0) += 1;
    }

    stats.by_category = ranked(by_category, None);
    stats.by_state = ranked(by_state, None);
    stats.top_clients = ranked(by_client, Some(TOP_LIMIT));
    stats.top_facilities = ranked(by_facility, Some(TOP_LIMIT));
    stats
}
