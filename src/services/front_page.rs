//! Порядок избранных событий на главной странице.
//!
//! Порядок хранится в поле `frontPageOrder` каждого события. После
//! перестановки отправляются патчи только тем событиям, чей индекс
//! изменился. Патчи идут параллельно, каждый с повторами; если часть
//! не применилась, это возвращается как ошибка, а не теряется.

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

use super::ordering::EventView;
use crate::config::FrontPageConfig;
use crate::error::{AppError, AppResult, FailedUpdate};
use crate::gateway::{GatewayError, Repository};
use crate::models::{Event, EventPatch};

/// Позиция для событий без `frontPageOrder`: после всех упорядоченных.
pub const UNORDERED_SENTINEL: i32 = 999;

/// Избранные события в порядке главной. Равные позиции сохраняют порядок API.
pub fn featured_in_order(events: Vec<Event>) -> Vec<Event> {
    let mut featured: Vec<Event> = events.into_iter().filter(|e| e.featured).collect();
    featured.sort_by_key(|e| e.front_page_order.unwrap_or(UNORDERED_SENTINEL));
    featured
}

/// Вынуть элемент с позиции `from` и вставить на позицию `to`.
pub fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) -> bool {
    if from >= items.len() || to >= items.len() {
        return false;
    }
    let item = items.remove(from);
    items.insert(to, item);
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderUpdate {
    pub id: String,
    pub front_page_order: i32,
}

/// Патчи для всех, чья новая позиция отличается от сохранённой.
pub fn pending_updates(sequence: &[Event]) -> Vec<OrderUpdate> {
    sequence
        .iter()
        .enumerate()
        .filter_map(|(index, event)| {
            let index = index as i32;
            (event.front_page_order != Some(index)).then(|| OrderUpdate {
                id: event.id.clone(),
                front_page_order: index,
            })
        })
        .collect()
}

/// Перетаскивание: `active` бросили на место `over`.
#[derive(Debug, Clone, Deserialize)]
pub struct ReorderGesture {
    pub active: String,
    pub over: String,
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &FrontPageConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            backoff: Duration::from_millis(config.retry_backoff_ms),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderOutcome {
    pub events: Vec<EventView>,
    pub applied: Vec<String>,
}

async fn persist_one<Rp>(repo: &Rp, update: &OrderUpdate, policy: RetryPolicy) -> Result<(), GatewayError>
where
    Rp: Repository<Event> + ?Sized,
{
    let mut attempt = 1;
    loop {
        let mut patch = EventPatch::new(&update.id);
        patch.front_page_order = Some(Some(update.front_page_order));

        match repo.update(patch).await {
            Ok(_) => return Ok(()),
            Err(e) if attempt < policy.max_attempts && e.is_transient() => {
                warn!(
                    "Front page order for {} failed (attempt {}/{}): {}",
                    update.id, attempt, policy.max_attempts, e
                );
                tokio::time::sleep(policy.backoff * attempt).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Отправляет все патчи параллельно. Возвращает id применённых и список ошибок.
pub async fn persist_order<Rp>(
    repo: &Rp,
    updates: &[OrderUpdate],
    policy: RetryPolicy,
) -> (Vec<String>, Vec<FailedUpdate>)
where
    Rp: Repository<Event> + ?Sized,
{
    let results = join_all(updates.iter().map(|u| persist_one(repo, u, policy))).await;

    let mut applied = Vec::new();
    let mut failed = Vec::new();
    for (update, result) in updates.iter().zip(results) {
        match result {
            Ok(()) => applied.push(update.id.clone()),
            Err(e) => {
                tracing::error!("Failed to save front page order for {}: {:?}", update.id, e);
                failed.push(FailedUpdate {
                    id: update.id.clone(),
                    error: e.to_string(),
                });
            }
        }
    }
    (applied, failed)
}

pub async fn load_front_page<Rp>(repo: &Rp, now: DateTime<Utc>) -> AppResult<Vec<EventView>>
where
    Rp: Repository<Event> + ?Sized,
{
    let events = featured_in_order(repo.list_all().await?);
    Ok(events.into_iter().map(|e| EventView::new(e, now)).collect())
}

pub async fn reorder<Rp>(
    repo: &Rp,
    gesture: &ReorderGesture,
    policy: RetryPolicy,
    now: DateTime<Utc>,
) -> AppResult<ReorderOutcome>
where
    Rp: Repository<Event> + ?Sized,
{
    let mut sequence = featured_in_order(repo.list_all().await?);

    let from = sequence.iter().position(|e| e.id == gesture.active);
    let to = sequence.iter().position(|e| e.id == gesture.over);
    let (from, to) = match (from, to) {
        (Some(from), Some(to)) if from != to => (from, to),
        _ => {
            return Ok(ReorderOutcome {
                events: sequence.into_iter().map(|e| EventView::new(e, now)).collect(),
                applied: Vec::new(),
            })
        }
    };

    move_item(&mut sequence, from, to);
    let updates = pending_updates(&sequence);
    let (applied, failed) = persist_order(repo, &updates, policy).await;

    if !failed.is_empty() {
        return Err(AppError::ReorderIncomplete {
            failed,
            total: updates.len(),
        });
    }

    info!("Front page reordered: {} moved to {}, {} updates", gesture.active, to, applied.len());

    for (index, event) in sequence.iter_mut().enumerate() {
        event.front_page_order = Some(index as i32);
    }
    Ok(ReorderOutcome {
        events: sequence.into_iter().map(|e| EventView::new(e, now)).collect(),
        applied,
    })
}
