//! Внешние сервисы: управляемый GraphQL API, объектное хранилище логотипов
//! и сервис идентификации. Приложение не хранит данные само, все записи
//! живут во внешнем API, а здесь только тонкие клиенты к нему.

pub mod circuit_breaker;
pub mod graphql;
pub mod identity;
pub mod memory;
pub mod records;
pub mod storage;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

pub use graphql::{GraphQlClient, GraphQlRepository};
pub use identity::{IdentityClient, IdentityError, Session};
pub use memory::MemoryRepository;
pub use storage::{BlobStore, MemoryBlobStore, S3BlobStore, StorageError};

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("circuit breaker is open - data gateway temporarily unavailable")]
    CircuitOpen,
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),
    #[error("gateway responded with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("graphql: {}", .0.join("; "))]
    GraphQl(Vec<String>),
    #[error("conflicting update: {0}")]
    Conflict(String),
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },
    #[error("response is missing '{0}'")]
    MissingData(String),
    #[error("decode: {0}")]
    Decode(#[from] serde_json::Error),
}

impl GatewayError {
    /// Сбой сети или сервиса, а не самого запроса: есть смысл повторить.
    pub fn is_transient(&self) -> bool {
        match self {
            GatewayError::Http(_) | GatewayError::CircuitOpen => true,
            GatewayError::Status { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Тип записи во внешнем API: имя, GraphQL-документы и правила применения патча.
pub trait Record: Clone + Send + Sync + DeserializeOwned + 'static {
    type Create: Serialize + Send + Sync + 'static;
    type Patch: Serialize + Send + Sync + 'static;

    /// `Event`, `Facility`, `Client` - из этого строятся имена мутаций.
    const KIND: &'static str;
    /// Поле списка в ответе, например `listEvents`.
    const LIST_FIELD: &'static str;
    /// Запрос списка с параметрами `$limit` и `$nextToken`.
    const LIST_QUERY: &'static str;

    fn id(&self) -> &str;
    fn version(&self) -> Option<i64>;
    fn set_version(&mut self, version: i64);
    fn from_input(id: String, input: Self::Create) -> Self;

    fn patch_id(patch: &Self::Patch) -> &str;
    fn patch_version(patch: &Self::Patch) -> Option<i64>;
    fn apply_patch(&mut self, patch: Self::Patch);

    fn create_mutation() -> String {
        format!(
            "mutation Create($input: Create{kind}Input!) {{ create{kind}(input: $input) {{ id }} }}",
            kind = Self::KIND
        )
    }

    fn update_mutation() -> String {
        format!(
            "mutation Update($input: Update{kind}Input!) {{ update{kind}(input: $input) {{ id }} }}",
            kind = Self::KIND
        )
    }

    fn delete_mutation() -> String {
        format!(
            "mutation Delete($input: Delete{kind}Input!) {{ delete{kind}(input: $input) {{ id }} }}",
            kind = Self::KIND
        )
    }
}

/// Репозиторий записей одного типа. Все мутации возвращают id записи.
#[async_trait]
pub trait Repository<R: Record>: Send + Sync {
    async fn list_all(&self) -> GatewayResult<Vec<R>>;
    async fn create(&self, input: R::Create) -> GatewayResult<String>;
    async fn update(&self, patch: R::Patch) -> GatewayResult<String>;
    async fn delete(&self, id: &str) -> GatewayResult<String>;

    /// У API нет выборки по id в используемой схеме, поэтому ищем в полном списке.
    async fn get(&self, id: &str) -> GatewayResult<R> {
        self.list_all()
            .await?
            .into_iter()
            .find(|r| r.id() == id)
            .ok_or_else(|| GatewayError::NotFound {
                kind: R::KIND,
                id: id.to_string(),
            })
    }
}
