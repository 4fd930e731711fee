use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

use crate::config::IdentityConfig;

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("session is missing or expired")]
    InvalidSession,
    #[error("reqwest: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("identity service responded with status {0}")]
    Status(u16),
}

/// Проверенная сессия администратора.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Клиент сервиса идентификации: проверка токена и выход из сессии.
#[derive(Clone)]
pub struct IdentityClient {
    base_url: String,
    http_client: reqwest::Client,
}

impl IdentityClient {
    pub fn from_config(config: &IdentityConfig) -> Result<Self, IdentityError> {
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http_client: reqwest::Client::builder()
                .timeout(Duration::from_secs(config.timeout_seconds))
                .build()?,
        })
    }

    pub async fn verify(&self, token: &str) -> Result<Session, IdentityError> {
        let response = self
            .http_client
            .get(format!("{}/oauth2/userInfo", self.base_url))
            .bearer_auth(token)
            .send()
            .await?;

        match response.status().as_u16() {
            200..=299 => Ok(response.json::<Session>().await?),
            401 | 403 => Err(IdentityError::InvalidSession),
            status => {
                warn!("Identity service returned {} while verifying session", status);
                Err(IdentityError::Status(status))
            }
        }
    }

    /// Инвалидирует сессию на стороне сервиса идентификации.
    pub async fn sign_out(&self, token: &str, session: &Session) -> Result<(), IdentityError> {
        let response = self
            .http_client
            .post(format!("{}/oauth2/signout", self.base_url))
            .bearer_auth(token)
            .send()
            .await?;

        match response.status().as_u16() {
            // Уже истёкшая сессия - тоже выход
            200..=299 | 401 => {
                info!("Signed out {}", session.username);
                Ok(())
            }
            status => Err(IdentityError::Status(status)),
        }
    }
}
