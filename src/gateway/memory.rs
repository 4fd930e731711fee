use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::{GatewayError, GatewayResult, Record, Repository};

/// Хранит записи в памяти процесса. Используется в режиме `GATEWAY_MODE=memory`
/// и в тестах; ведёт себя как API: частичные патчи, проверка `_version`.
pub struct MemoryRepository<R> {
    records: RwLock<Vec<R>>,
}

impl<R: Record> MemoryRepository<R> {
    pub fn new() -> Self {
        Self::with_records(Vec::new())
    }

    pub fn with_records(records: Vec<R>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    pub async fn snapshot(&self) -> Vec<R> {
        self.records.read().await.clone()
    }
}

impl<R: Record> Default for MemoryRepository<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R: Record> Repository<R> for MemoryRepository<R> {
    async fn list_all(&self) -> GatewayResult<Vec<R>> {
        Ok(self.records.read().await.clone())
    }

    async fn create(&self, input: R::Create) -> GatewayResult<String> {
        let id = Uuid::new_v4().to_string();
        let record = R::from_input(id.clone(), input);
        self.records.write().await.push(record);
        debug!("Created {} {}", R::KIND, id);
        Ok(id)
    }

    async fn update(&self, patch: R::Patch) -> GatewayResult<String> {
        let id = R::patch_id(&patch).to_string();
        let expected = R::patch_version(&patch);

        let mut records = self.records.write().await;
        let record = records
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| GatewayError::NotFound {
                kind: R::KIND,
                id: id.clone(),
            })?;

        if let (Some(expected), Some(current)) = (expected, record.version()) {
            if expected != current {
                return Err(GatewayError::Conflict(format!(
                    "{} {} is at version {}, update expected {}",
                    R::KIND,
                    id,
                    current,
                    expected
                )));
            }
        }

        record.apply_patch(patch);
        let next = record.version().unwrap_or(0) + 1;
        record.set_version(next);
        Ok(id)
    }

    async fn delete(&self, id: &str) -> GatewayResult<String> {
        let mut records = self.records.write().await;
        let position = records
            .iter()
            .position(|r| r.id() == id)
            .ok_or_else(|| GatewayError::NotFound {
                kind: R::KIND,
                id: id.to_string(),
            })?;
        records.remove(position);
        Ok(id.to_string())
    }
}
