use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::lifecycle::{display_zone, format_event_date, EventStatus};
use crate::models::{Event, EventCategory};

/// Событие с вычисленным статусом и подписью дат.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventView {
    #[serde(flatten)]
    pub event: Event,
    pub status: EventStatus,
    pub status_label: &'static str,
    pub date_label: String,
}

impl EventView {
    pub fn new(event: Event, now: DateTime<Utc>) -> Self {
        let status = EventStatus::derive(event.start_date_time, event.end_date_time, now);
        let zone = event
            .time_zone
            .as_deref()
            .or_else(|| event.facility.as_ref().and_then(|f| f.time_zone.as_deref()));
        let date_label = format_event_date(
            event.start_date_time,
            Some(event.end_date_time),
            display_zone(zone),
        );
        EventView {
            event,
            status,
            status_label: status.label(),
            date_label,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct YearGroup {
    pub year: i32,
    pub events: Vec<EventView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EventList {
    pub count: usize,
    pub years: Vec<YearGroup>,
}

fn display_order(a: &EventView, b: &EventView) -> Ordering {
    a.status
        .display_rank()
        .cmp(&b.status.display_rank())
        .then_with(|| {
            if a.status == EventStatus::Completed {
                // Недавно завершённые выше
                b.event.end_date_time.cmp(&a.event.end_date_time)
            } else {
                a.event.start_date_time.cmp(&b.event.start_date_time)
            }
        })
}

/// Стабильная сортировка: статус, затем дата.
pub fn sort_for_display(views: &mut [EventView]) {
    views.sort_by(display_order);
}

/// Группы по году начала (UTC), новые годы первыми.
pub fn group_by_year(mut views: Vec<EventView>) -> Vec<YearGroup> {
    sort_for_display(&mut views);

    let mut years: BTreeMap<i32, Vec<EventView>> = BTreeMap::new();
    for view in views {
        years
            .entry(view.event.start_date_time.year())
            .or_default()
            .push(view);
    }

    years
        .into_iter()
        .rev()
        .map(|(year, events)| YearGroup { year, events })
        .collect()
}

/// Фильтры списка событий. Даты - календарные дни, сравниваются с полуночью UTC.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventFilter {
    pub category: Option<EventCategory>,
    pub facility_id: Option<String>,
    pub client_id: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

impl EventFilter {
    pub fn matches(&self, event: &Event) -> bool {
        if let Some(category) = self.category {
            if event.category != Some(category) {
                return false;
            }
        }
        if let Some(facility_id) = self.facility_id.as_deref().filter(|v| !v.is_empty()) {
            if event.facility_ref() != Some(facility_id) {
                return false;
            }
        }
        if let Some(client_id) = self.client_id.as_deref().filter(|v| !v.is_empty()) {
            if event.client_ref() != Some(client_id) {
                return false;
            }
        }
        if let Some(from) = self.date_from {
            if event.start_date_time < midnight_utc(from) {
                return false;
            }
        }
        if let Some(to) = self.date_to {
            if event.end_date_time > midnight_utc(to) {
                return false;
            }
        }
        true
    }
}

pub fn build_event_list(events: Vec<Event>, filter: &EventFilter, now: DateTime<Utc>) -> EventList {
    let views: Vec<EventView> = events
        .into_iter()
        .filter(|e| filter.matches(e))
        .map(|e| EventView::new(e, now))
        .collect();

    EventList {
        count: views.len(),
        years: group_by_year(views),
    }
}
