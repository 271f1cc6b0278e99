//! Movie endpoints

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::Response,
    routing::get,
};

use super::created;
use crate::app::AppState;
use crate::entities::{Actor, Movie, MovieCreate, MovieRead};
use crate::error::{CatalogError, CatalogResult};
use crate::orm::{Crud, ListParams, PatchDocument, Predicate, ValidationErrors};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/movies", get(list_movies).post(create_movie))
        .route(
            "/movies/{id}",
            get(get_movie)
                .put(replace_movie)
                .patch(patch_movie)
                .delete(delete_movie),
        )
}

fn crud(state: &AppState) -> Crud<'_, Movie> {
    Crud::new(&state.pool, &state.mapper)
}

/// A director id must name an existing actor.
async fn check_director(state: &AppState, input: &MovieCreate) -> CatalogResult<()> {
    if let Some(director_id) = input.director_id
        && !Crud::<Actor>::new(&state.pool, &state.mapper).exists(director_id).await?
    {
        return Err(CatalogError::Validation(ValidationErrors::single(
            "directorId",
            format!("Actor {director_id} does not exist"),
        )));
    }
    Ok(())
}

/// GET /api/movies?filter={"director.name":"..."}&sort=["title","DESC"]&range=[0,9]
async fn list_movies(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> CatalogResult<(HeaderMap, Json<Vec<MovieRead>>)> {
    let mut headers = HeaderMap::new();
    let movies = crud(&state)
        .list_filtered(
            Predicate::All,
            &params.filter(),
            params.sort().as_ref(),
            params.range().as_ref(),
            &mut headers,
        )
        .await?;
    Ok((headers, Json(movies)))
}

async fn get_movie(State(state): State<AppState>, Path(id): Path<i64>) -> CatalogResult<Json<MovieRead>> {
    Ok(Json(crud(&state).get(id).await?))
}

async fn create_movie(
    State(state): State<AppState>,
    Json(input): Json<MovieCreate>,
) -> CatalogResult<Response> {
    check_director(&state, &input).await?;
    let (id, read) = crud(&state).create(input).await?;
    Ok(created(format!("/api/movies/{id}"), read))
}

async fn replace_movie(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<MovieCreate>,
) -> CatalogResult<StatusCode> {
    check_director(&state, &input).await?;
    crud(&state).replace(id, input).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn patch_movie(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(document): Json<PatchDocument>,
) -> CatalogResult<StatusCode> {
    crud(&state).patch(id, &document).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_movie(State(state): State<AppState>, Path(id): Path<i64>) -> CatalogResult<StatusCode> {
    crud(&state).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
