use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use std::sync::Arc;

use crate::error::AppError;
use crate::gateway::{IdentityError, Session};

/// Сессия администратора, проверенная сервисом идентификации.
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub session: Session,
    pub token: String,
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

// Bearer-токен проверяется во внешнем сервисе на каждый запрос
impl FromRequestParts<Arc<crate::AppState>> for AdminSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<crate::AppState>,
    ) -> Result<Self, Self::Rejection> {
        if !state.config.features.enable_auth {
            return Ok(AdminSession {
                session: Session {
                    username: "local-admin".to_string(),
                    email: None,
                },
                token: String::new(),
            });
        }

        let token = bearer_token(parts).ok_or(AppError::Unauthorized)?;

        match state.identity.verify(token).await {
            Ok(session) => Ok(AdminSession {
                session,
                token: token.to_string(),
            }),
            Err(IdentityError::InvalidSession) => Err(AppError::Unauthorized),
            Err(e) => {
                tracing::error!("Session verification failed: {:?}", e);
                Err(e.into())
            }
        }
    }
}
