//! Паттерн "Автоматический выключатель" для запросов к GraphQL API.
//! Он не даёт бесконечно долбить неработающий сервис.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, RwLock};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// Состояния выключателя.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// **Closed (Замкнуто)**: обычный режим, запросы разрешены.
    Closed,
    /// **Open (Разомкнуто)**: после серии сбоев запросы временно запрещены.
    Open,
    /// **HalfOpen (Полуоткрыто)**: таймаут истёк, пропускаем пробный запрос.
    HalfOpen,
}

#[derive(Debug)]
pub struct CircuitBreaker {
    state: RwLock<CircuitState>,
    /// Счетчик последовательных сбоев.
    failure_count: AtomicU32,
    /// Момент последнего сбоя для расчета таймаута.
    last_failure: Mutex<Option<Instant>>,
    failure_threshold: u32,
    timeout_duration: Duration,
}

impl CircuitBreaker {
    pub fn new(failure_threshold: u32, timeout_seconds: u64) -> Self {
        Self {
            state: RwLock::new(CircuitState::Closed),
            failure_count: AtomicU32::new(0),
            last_failure: Mutex::new(None),
            failure_threshold: failure_threshold.max(1),
            timeout_duration: Duration::from_secs(timeout_seconds),
        }
    }

    /// Можно ли выполнить следующий запрос.
    pub fn can_execute(&self) -> bool {
        match self.state() {
            CircuitState::Closed | CircuitState::HalfOpen => true,
            CircuitState::Open => {
                let elapsed = self
                    .last_failure
                    .lock()
                    .map(|last| last.map(|t| t.elapsed()))
                    .unwrap_or(None);

                match elapsed {
                    Some(elapsed) if elapsed < self.timeout_duration => false,
                    _ => {
                        self.set_state(CircuitState::HalfOpen);
                        info!("Circuit breaker transitioning to HalfOpen state");
                        true
                    }
                }
            }
        }
    }

    pub fn record_success(&self) {
        if self.state() == CircuitState::HalfOpen {
            info!("Circuit breaker recovered - transitioning to Closed state");
        }
        self.set_state(CircuitState::Closed);
        self.failure_count.store(0, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        let failure_count = self.failure_count.fetch_add(1, Ordering::Relaxed) + 1;
        if let Ok(mut last) = self.last_failure.lock() {
            *last = Some(Instant::now());
        }

        match self.state() {
            CircuitState::Closed if failure_count >= self.failure_threshold => {
                self.set_state(CircuitState::Open);
                error!(
                    "Circuit breaker OPENED - {} failures reached threshold {}",
                    failure_count, self.failure_threshold
                );
            }
            CircuitState::HalfOpen => {
                self.set_state(CircuitState::Open);
                warn!("Circuit breaker test failed - returning to Open state");
            }
            _ => {}
        }
    }

    pub fn state(&self) -> CircuitState {
        // Отравленная блокировка не должна валить запросы: считаем цепь замкнутой
        self.state.read().map(|s| *s).unwrap_or(CircuitState::Closed)
    }

    pub fn failure_count(&self) -> u32 {
        self.failure_count.load(Ordering::Relaxed)
    }

    fn set_state(&self, next: CircuitState) {
        if let Ok(mut state) = self.state.write() {
            *state = next;
        }
    }
}
