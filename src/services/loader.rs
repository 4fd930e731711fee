//! Загрузка данных для экранов админки.
//!
//! Каждый экран получает свой `ViewScope`: дочерний токен от токена
//! остановки сервера. Когда scope уничтожается (запрос закончен или
//! клиент ушёл) или сервер останавливается, незавершённая загрузка
//! отбрасывается, а не дописывает результат в закрытый экран.

use std::collections::HashMap;
use std::future::Future;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::models::{Client, Event, Facility};
use crate::AppState;

pub struct ViewScope {
    token: CancellationToken,
    _guard: DropGuard,
}

impl ViewScope {
    pub fn new(parent: &CancellationToken) -> Self {
        let token = parent.child_token();
        Self {
            _guard: token.clone().drop_guard(),
            token,
        }
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn is_closed(&self) -> bool {
        self.token.is_cancelled()
    }
}

pub async fn cancellable<T, F>(token: &CancellationToken, load: F) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    tokio::select! {
        biased;
        _ = token.cancelled() => {
            debug!("View closed, discarding load result");
            Err(AppError::Cancelled)
        }
        result = load => result,
    }
}

#[derive(Debug, Clone, Default)]
pub struct AdminData {
    pub events: Vec<Event>,
    pub facilities: Vec<Facility>,
    pub clients: Vec<Client>,
}

/// Подставляет сводки объекта и компании в события, где API их не вернул.
pub fn attach_summaries(events: &mut [Event], facilities: &[Facility], clients: &[Client]) {
    let facility_by_id: HashMap<&str, &Facility> =
        facilities.iter().map(|f| (f.id.as_str(), f)).collect();
    let client_by_id: HashMap<&str, &Client> =
        clients.iter().map(|c| (c.id.as_str(), c)).collect();

    for event in events.iter_mut() {
        if event.facility.is_none() {
            event.facility = facility_by_id
                .get(event.facility_id.as_str())
                .map(|f| f.summary());
        }
        if event.client.is_none() {
            event.client = event
                .client_id
                .as_deref()
                .and_then(|id| client_by_id.get(id))
                .map(|c| c.summary());
        }
    }
}

/// События, объекты и компании параллельно.
pub async fn load_admin_data(state: &AppState, scope: &ViewScope) -> AppResult<AdminData> {
    let load = async {
        let (mut events, facilities, clients) = tokio::try_join!(
            state.events.list_all(),
            state.facilities.list_all(),
            state.clients.list_all()
        )?;
        attach_summaries(&mut events, &facilities, &clients);
        Ok::<_, AppError>(AdminData {
            events,
            facilities,
            clients,
        })
    };
    cancellable(scope.token(), load).await
}
