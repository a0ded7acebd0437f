use std::sync::Arc;

use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use subtle::ConstantTimeEq;
use uuid::Uuid;

use carshare_core::AppError;
use carshare_core::models::{ActingUser, Role};

use crate::error::ApiError;
use crate::state::AppState;

/// Bearer tokens issued by the identity service, mapped to the users they
/// act for.
///
/// Loaded from `CARSHARE_TOKENS` as comma-separated `token=user_uuid:role`
/// entries, e.g. `s3cret=6f1c…:admin,t0ken=9a2b…:user`.
#[derive(Debug, Clone, Default)]
pub struct TokenDirectory {
    entries: Vec<(String, ActingUser)>,
}

impl TokenDirectory {
    pub fn new(entries: Vec<(String, ActingUser)>) -> Self {
        Self { entries }
    }

    pub fn from_env() -> Result<Self, AppError> {
        match std::env::var("CARSHARE_TOKENS") {
            Ok(raw) => Self::parse(&raw),
            Err(_) => {
                tracing::warn!("CARSHARE_TOKENS not set; every authenticated route will return 401");
                Ok(Self::default())
            }
        }
    }

    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let mut entries = Vec::new();
        for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let invalid = || {
                AppError::ConfigError(format!(
                    "Invalid CARSHARE_TOKENS entry '{entry}': expected token=user_uuid:role"
                ))
            };
            let (token, identity) = entry.split_once('=').ok_or_else(invalid)?;
            let (id, role) = identity.split_once(':').ok_or_else(invalid)?;
            if token.is_empty() {
                return Err(invalid());
            }
            let id: Uuid = id.parse().map_err(|_| invalid())?;
            let role: Role = role.parse().map_err(|_| invalid())?;
            entries.push((token.to_string(), ActingUser::new(id, role)));
        }
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every entry is compared in constant time so lookups don't leak
    /// which prefix matched.
    pub fn resolve(&self, token: &str) -> Option<ActingUser> {
        let mut found = None;
        for (candidate, user) in &self.entries {
            if bool::from(candidate.as_bytes().ct_eq(token.as_bytes())) {
                found = Some(*user);
            }
        }
        found
    }
}

/// Middleware that resolves `Authorization: Bearer <token>` into an
/// [`ActingUser`] request extension.
pub async fn require_user(
    State(state): State<Arc<AppState>>,
    mut request: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "));

    let Some(actor) = token.and_then(|t| state.tokens.resolve(t)) else {
        return ApiError(AppError::Unauthorized(
            "Missing or invalid Authorization header. Expected: Bearer <token>".to_string(),
        ))
        .into_response();
    };

    tracing::debug!(actor_id = %actor.id, role = %actor.role, "Authenticated request");
    request.extensions_mut().insert(actor);
    next.run(request).await
}
