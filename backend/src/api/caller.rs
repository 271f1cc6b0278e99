//! Caller identity
//!
//! Authentication happens upstream; the authenticated user id arrives in a
//! request header whose name is configured by `USER_ID_HEADER`.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::app::AppState;
use crate::error::CatalogError;

/// Id of the authenticated caller. Rejects with 401 when absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerId(pub String);

impl FromRequestParts<AppState> for CallerId {
    type Rejection = CatalogError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(state.config.user_id_header.as_str())
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| CallerId(id.to_string()))
            .ok_or(CatalogError::Unauthorized)
    }
}
