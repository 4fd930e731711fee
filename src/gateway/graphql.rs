//! Клиент управляемого GraphQL API и репозиторий записей поверх него.
//!
//! Все запросы проходят через `CircuitBreaker`: при серии сетевых сбоев
//! клиент перестаёт ходить в API и сразу отвечает `GatewayError::CircuitOpen`.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

use super::circuit_breaker::{CircuitBreaker, CircuitState};
use super::{GatewayError, GatewayResult, Record, Repository};
use crate::config::{CircuitBreakerConfig, GatewayConfig};

/// Размер страницы при выгрузке полного списка.
const PAGE_SIZE: u32 = 1000;

#[derive(Debug, Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: Value,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Option<Vec<GraphQlErrorItem>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphQlErrorItem {
    message: String,
    #[serde(default)]
    error_type: Option<String>,
}

impl GraphQlErrorItem {
    /// Проверка версии записи на стороне API не прошла.
    fn is_conflict(&self) -> bool {
        self.error_type.as_deref().is_some_and(|t| {
            t.contains("ConditionalCheckFailed") || t.contains("ConflictUnhandled")
        })
    }
}

#[derive(Clone)]
pub struct GraphQlClient {
    endpoint: String,
    api_key: String,
    http_client: reqwest::Client,
    circuit_breaker: Arc<CircuitBreaker>,
}

impl GraphQlClient {
    pub fn from_config(
        config: &GatewayConfig,
        breaker: &CircuitBreakerConfig,
    ) -> GatewayResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            endpoint: config.graphql_url.clone(),
            api_key: config.api_key.clone(),
            http_client,
            circuit_breaker: Arc::new(CircuitBreaker::new(
                breaker.failure_threshold,
                breaker.timeout_seconds,
            )),
        })
    }

    /// Выполняет GraphQL-документ и возвращает поле `data`.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        document: &str,
        variables: Value,
    ) -> GatewayResult<T> {
        if !self.circuit_breaker.can_execute() {
            warn!("Circuit breaker is OPEN - blocking data gateway request");
            return Err(GatewayError::CircuitOpen);
        }

        let response = match self.send(document, variables).await {
            Ok(response) => response,
            Err(e) => {
                error!("Data gateway request failed: {:?}", e);
                // 4xx - ошибка запроса, сервис при этом жив
                if e.is_transient() {
                    self.circuit_breaker.record_failure();
                } else {
                    self.circuit_breaker.record_success();
                }
                return Err(e);
            }
        };
        self.circuit_breaker.record_success();

        let response: GraphQlResponse<T> = serde_json::from_value(response)?;
        if let Some(errors) = response.errors.filter(|e| !e.is_empty()) {
            if let Some(conflict) = errors.iter().find(|e| e.is_conflict()) {
                return Err(GatewayError::Conflict(conflict.message.clone()));
            }
            return Err(GatewayError::GraphQl(
                errors.into_iter().map(|e| e.message).collect(),
            ));
        }

        response
            .data
            .ok_or_else(|| GatewayError::MissingData("data".to_string()))
    }

    /// Сетевая часть запроса: транспорт и HTTP-статус.
    async fn send(&self, document: &str, variables: Value) -> GatewayResult<Value> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .json(&GraphQlRequest {
                query: document,
                variables,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<Value>().await?)
    }

    pub fn circuit_state(&self) -> CircuitState {
        self.circuit_breaker.state()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", bound = "R: DeserializeOwned")]
struct Page<R> {
    #[serde(default = "Vec::new")]
    items: Vec<Option<R>>,
    #[serde(default)]
    next_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IdOnly {
    id: String,
}

/// Репозиторий записей `R` поверх `GraphQlClient`.
pub struct GraphQlRepository<R> {
    client: GraphQlClient,
    _record: PhantomData<fn() -> R>,
}

impl<R> GraphQlRepository<R> {
    pub fn new(client: GraphQlClient) -> Self {
        Self {
            client,
            _record: PhantomData,
        }
    }
}

impl<R: Record> GraphQlRepository<R> {
    async fn mutate<I: Serialize + Sync>(
        &self,
        document: String,
        field: String,
        input: &I,
        id_hint: &str,
    ) -> GatewayResult<String> {
        let variables = json!({ "input": serde_json::to_value(input)? });
        let mut data: HashMap<String, Option<IdOnly>> =
            self.client.execute(&document, variables).await?;

        match data.remove(&field) {
            Some(Some(record)) => Ok(record.id),
            Some(None) => Err(GatewayError::NotFound {
                kind: R::KIND,
                id: id_hint.to_string(),
            }),
            None => Err(GatewayError::MissingData(field)),
        }
    }
}

#[async_trait]
impl<R: Record> Repository<R> for GraphQlRepository<R> {
    async fn list_all(&self) -> GatewayResult<Vec<R>> {
        let mut records = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let mut data: HashMap<String, Page<R>> = self
                .client
                .execute(
                    R::LIST_QUERY,
                    json!({ "limit": PAGE_SIZE, "nextToken": next_token }),
                )
                .await?;

            let page = data
                .remove(R::LIST_FIELD)
                .ok_or_else(|| GatewayError::MissingData(R::LIST_FIELD.to_string()))?;

            // Удалённые записи приходят как null
            records.extend(page.items.into_iter().flatten());

            match page.next_token {
                Some(token) => next_token = Some(token),
                None => break,
            }
        }

        debug!("Loaded {} {} records", records.len(), R::KIND);
        Ok(records)
    }

    async fn create(&self, input: R::Create) -> GatewayResult<String> {
        self.mutate(
            R::create_mutation(),
            format!("create{}", R::KIND),
            &input,
            "",
        )
        .await
    }

    async fn update(&self, patch: R::Patch) -> GatewayResult<String> {
        let id = R::patch_id(&patch).to_string();
        self.mutate(R::update_mutation(), format!("update{}", R::KIND), &patch, &id)
            .await
    }

    async fn delete(&self, id: &str) -> GatewayResult<String> {
        self.mutate(
            R::delete_mutation(),
            format!("delete{}", R::KIND),
            &json!({ "id": id }),
            id,
        )
        .await
    }
}
