//! Cinema venue endpoints

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
    routing::get,
};

use super::created;
use crate::app::AppState;
use crate::entities::{Venue, VenueCreate, VenueRead};
use crate::error::CatalogResult;
use crate::geo::{NearbyQuery, NearbyVenue, nearby_venues};
use crate::orm::{Crud, Validate};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/venues", get(list_venues).post(create_venue))
        .route("/venues/nearby", get(list_nearby))
        .route(
            "/venues/{id}",
            get(get_venue).put(replace_venue).delete(delete_venue),
        )
}

fn crud(state: &AppState) -> Crud<'_, Venue> {
    Crud::new(&state.pool, &state.mapper)
}

async fn list_venues(State(state): State<AppState>) -> CatalogResult<Json<Vec<VenueRead>>> {
    Ok(Json(crud(&state).list_all().await?))
}

/// GET /api/venues/nearby?latitude=..&longitude=..&distanceInKms=..
async fn list_nearby(
    State(state): State<AppState>,
    Query(query): Query<NearbyQuery>,
) -> CatalogResult<Json<Vec<NearbyVenue>>> {
    query.validate()?;
    let venues = nearby_venues(&state.pool, state.mapper.geometry(), &query).await?;
    Ok(Json(venues))
}

async fn get_venue(State(state): State<AppState>, Path(id): Path<i64>) -> CatalogResult<Json<VenueRead>> {
    Ok(Json(crud(&state).get(id).await?))
}

async fn create_venue(
    State(state): State<AppState>,
    Json(input): Json<VenueCreate>,
) -> CatalogResult<Response> {
    let (id, read) = crud(&state).create(input).await?;
    Ok(created(format!("/api/venues/{id}"), read))
}

async fn replace_venue(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<VenueCreate>,
) -> CatalogResult<StatusCode> {
    crud(&state).replace(id, input).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_venue(State(state): State<AppState>, Path(id): Path<i64>) -> CatalogResult<StatusCode> {
    crud(&state).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
