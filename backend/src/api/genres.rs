//! Genre endpoints

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::Response,
    routing::get,
};

use super::created;
use crate::app::AppState;
use crate::entities::{Genre, GenreCreate, GenreRead};
use crate::error::CatalogResult;
use crate::orm::Crud;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/genres", get(list_genres).post(create_genre))
        .route(
            "/genres/{id}",
            get(get_genre).put(replace_genre).delete(delete_genre),
        )
}

fn crud(state: &AppState) -> Crud<'_, Genre> {
    Crud::new(&state.pool, &state.mapper)
}

async fn list_genres(State(state): State<AppState>) -> CatalogResult<Json<Vec<GenreRead>>> {
    Ok(Json(crud(&state).list_all().await?))
}

async fn get_genre(State(state): State<AppState>, Path(id): Path<i64>) -> CatalogResult<Json<GenreRead>> {
    Ok(Json(crud(&state).get(id).await?))
}

async fn create_genre(
    State(state): State<AppState>,
    Json(input): Json<GenreCreate>,
) -> CatalogResult<Response> {
    let (id, read) = crud(&state).create(input).await?;
    Ok(created(format!("/api/genres/{id}"), read))
}

async fn replace_genre(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<GenreCreate>,
) -> CatalogResult<StatusCode> {
    crud(&state).replace(id, input).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_genre(State(state): State<AppState>, Path(id): Path<i64>) -> CatalogResult<StatusCode> {
    crud(&state).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
