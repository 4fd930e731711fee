pub mod config;
pub mod controllers;
pub mod error;
pub mod gateway;
pub mod middleware;
pub mod models;
pub mod services;

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use config::{Config, GatewayMode};
use gateway::{
    BlobStore, GraphQlClient, GraphQlRepository, IdentityClient, IdentityError, MemoryBlobStore,
    MemoryRepository, Repository, S3BlobStore,
};
use models::{Client, Event, Facility};

/// Хранилища, с которыми работает приложение.
pub struct Stores {
    pub events: Arc<dyn Repository<Event>>,
    pub facilities: Arc<dyn Repository<Facility>>,
    pub clients: Arc<dyn Repository<Client>>,
    pub storage: Arc<dyn BlobStore>,
}

impl Stores {
    pub fn memory(config: &Config) -> Self {
        Stores {
            events: Arc::new(MemoryRepository::<Event>::new()),
            facilities: Arc::new(MemoryRepository::<Facility>::new()),
            clients: Arc::new(MemoryRepository::<Client>::new()),
            storage: Arc::new(MemoryBlobStore::new(config.storage.public_base_url.clone())),
        }
    }

    pub async fn remote(config: &Config) -> anyhow::Result<Self> {
        // Один клиент и один circuit breaker на все три типа записей
        let client = GraphQlClient::from_config(&config.gateway, &config.circuit_breaker)?;
        Ok(Stores {
            events: Arc::new(GraphQlRepository::<Event>::new(client.clone())),
            facilities: Arc::new(GraphQlRepository::<Facility>::new(client.clone())),
            clients: Arc::new(GraphQlRepository::<Client>::new(client)),
            storage: Arc::new(S3BlobStore::new(&config.storage).await),
        })
    }
}

// Shared state для всего приложения
pub struct AppState {
    pub config: Config,
    pub events: Arc<dyn Repository<Event>>,
    pub facilities: Arc<dyn Repository<Facility>>,
    pub clients: Arc<dyn Repository<Client>>,
    pub storage: Arc<dyn BlobStore>,
    pub identity: IdentityClient,
    pub shutdown: CancellationToken,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Arc<Self>> {
        let stores = match config.gateway.mode {
            GatewayMode::Graphql => {
                info!("Using GraphQL gateway at {}", config.gateway.graphql_url);
                Stores::remote(&config).await?
            }
            GatewayMode::Memory => {
                info!("Using in-memory gateway");
                Stores::memory(&config)
            }
        };
        Ok(Self::with_stores(config, stores)?)
    }

    pub fn with_stores(config: Config, stores: Stores) -> Result<Arc<Self>, IdentityError> {
        let identity = IdentityClient::from_config(&config.identity)?;
        Ok(Arc::new(Self {
            events: stores.events,
            facilities: stores.facilities,
            clients: stores.clients,
            storage: stores.storage,
            identity,
            shutdown: CancellationToken::new(),
            config,
        }))
    }

    /// Пустое состояние в памяти без авторизации (локальный запуск и тесты).
    pub fn in_memory() -> Result<Arc<Self>, IdentityError> {
        let config = Config::in_memory();
        let stores = Stores::memory(&config);
        Self::with_stores(config, stores)
    }
}
