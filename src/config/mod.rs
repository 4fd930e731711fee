use serde::Deserialize;
use std::env;
use std::str::FromStr;

// Главная структура конфигурации - контейнер для всех настроек
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub gateway: GatewayConfig,
    pub storage: StorageConfig,
    pub identity: IdentityConfig,
    pub circuit_breaker: CircuitBreakerConfig,
    pub front_page: FrontPageConfig,
    pub features: FeatureFlags,
}

// Настройки приложения
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub rust_log: String,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Какой бэкенд данных использовать: управляемый GraphQL API или память процесса.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayMode {
    Graphql,
    Memory,
}

// Настройки GraphQL API
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    pub mode: GatewayMode,
    pub graphql_url: String,
    pub api_key: String,
    pub timeout_seconds: u64,
}

// Настройки объектного хранилища логотипов
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub bucket: String,
    pub region: String,
    /// S3-совместимый endpoint вместо AWS (MinIO, локальные тесты).
    pub endpoint: Option<String>,
    pub force_path_style: bool,
    /// Без ключей используется стандартная цепочка AWS (env, профиль, роль).
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    /// Откуда логотипы отдаются публично, без завершающего `/`.
    pub public_base_url: String,
}

// Настройки сервиса идентификации
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

// Настройки Circuit Breaker
#[derive(Debug, Clone, Deserialize)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: u32,
    pub timeout_seconds: u64,
}

// Настройки сохранения порядка главной страницы
#[derive(Debug, Clone, Deserialize)]
pub struct FrontPageConfig {
    pub max_attempts: u32,
    pub retry_backoff_ms: u64,
}

// Feature flags для включения/выключения функциональности
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureFlags {
    pub enable_auth: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::Missing(name))
}

fn or_default(name: &'static str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parsed<T: FromStr>(name: &'static str, default: &str) -> Result<T, ConfigError> {
    let value = or_default(name, default);
    value
        .parse()
        .map_err(|_| ConfigError::Invalid { name, value })
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let mode = match or_default("GATEWAY_MODE", "graphql").to_lowercase().as_str() {
            "graphql" => GatewayMode::Graphql,
            "memory" => GatewayMode::Memory,
            other => {
                return Err(ConfigError::Invalid {
                    name: "GATEWAY_MODE",
                    value: other.to_string(),
                })
            }
        };

        // В режиме memory внешний API не нужен
        let (graphql_url, api_key) = match mode {
            GatewayMode::Graphql => (required("GRAPHQL_URL")?, required("GRAPHQL_API_KEY")?),
            GatewayMode::Memory => (or_default("GRAPHQL_URL", ""), or_default("GRAPHQL_API_KEY", "")),
        };

        let bucket = or_default("S3_BUCKET", "kammererfacilitiesba978-dev");
        let public_base_url = env::var("STORAGE_PUBLIC_URL")
            .unwrap_or_else(|_| format!("https://{}.s3.amazonaws.com", bucket));

        let log_format = match or_default("LOG_FORMAT", "pretty").to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Config {
            app: AppConfig {
                host: or_default("HOST", "0.0.0.0"),
                port: parsed("PORT", "8000")?,
                environment: or_default("ENVIRONMENT", "development"),
                rust_log: or_default("RUST_LOG", "timing_admin=debug,tower_http=debug"),
                log_format,
            },
            gateway: GatewayConfig {
                mode,
                graphql_url,
                api_key,
                timeout_seconds: parsed("GRAPHQL_TIMEOUT_SECONDS", "30")?,
            },
            storage: StorageConfig {
                region: or_default("S3_REGION", "us-east-1"),
                endpoint: env::var("S3_ENDPOINT").ok(),
                force_path_style: parsed("S3_FORCE_PATH_STYLE", "false")?,
                access_key_id: env::var("S3_ACCESS_KEY_ID").ok(),
                secret_access_key: env::var("S3_SECRET_ACCESS_KEY").ok(),
                public_base_url: public_base_url.trim_end_matches('/').to_string(),
                bucket,
            },
            identity: IdentityConfig {
                base_url: or_default("IDENTITY_URL", "http://localhost:9000"),
                timeout_seconds: parsed("IDENTITY_TIMEOUT_SECONDS", "10")?,
            },
            circuit_breaker: CircuitBreakerConfig {
                failure_threshold: parsed("CIRCUIT_BREAKER_FAILURE_THRESHOLD", "5")?,
                timeout_seconds: parsed("CIRCUIT_BREAKER_TIMEOUT_SECONDS", "60")?,
            },
            front_page: FrontPageConfig {
                max_attempts: parsed("FRONTPAGE_MAX_ATTEMPTS", "3")?,
                retry_backoff_ms: parsed("FRONTPAGE_RETRY_BACKOFF_MS", "200")?,
            },
            features: FeatureFlags {
                enable_auth: parsed("ENABLE_AUTH", "true")?,
            },
        })
    }

    /// Конфигурация для локального запуска и тестов: всё в памяти, без авторизации.
    pub fn in_memory() -> Self {
        Config {
            app: AppConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                environment: "test".to_string(),
                rust_log: "timing_admin=debug".to_string(),
                log_format: LogFormat::Pretty,
            },
            gateway: GatewayConfig {
                mode: GatewayMode::Memory,
                graphql_url: String::new(),
                api_key: String::new(),
                timeout_seconds: 5,
            },
            storage: StorageConfig {
                bucket: "test-bucket".to_string(),
                region: "us-east-1".to_string(),
                endpoint: None,
                force_path_style: false,
                access_key_id: None,
                secret_access_key: None,
                public_base_url: "https://test-bucket.s3.amazonaws.com".to_string(),
            },
            identity: IdentityConfig {
                base_url: "http://localhost:9000".to_string(),
                timeout_seconds: 5,
            },
            circuit_breaker: CircuitBreakerConfig {
                failure_threshold: 5,
                timeout_seconds: 60,
            },
            front_page: FrontPageConfig {
                max_attempts: 1,
                retry_backoff_ms: 0,
            },
            features: FeatureFlags { enable_auth: false },
        }
    }
}
