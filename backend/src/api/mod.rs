//! REST route definitions
//!
//! One router per entity, all nested under `/api`. Handlers only bind
//! request parameters and call into [`crate::orm::Crud`].

pub mod actors;
pub mod caller;
pub mod genres;
pub mod health;
pub mod movies;
pub mod reviews;
pub mod venues;

use axum::{
    Json, Router,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::app::AppState;

pub use caller::CallerId;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(genres::router())
        .merge(actors::router())
        .merge(movies::router())
        .merge(venues::router())
        .merge(reviews::router())
}

/// `201 Created` with a `Location` header pointing at the new resource.
pub(crate) fn created<T: Serialize>(location: String, body: T) -> Response {
    (
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(body),
    )
        .into_response()
}
