//! Actor endpoints

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::Response,
    routing::get,
};

use super::created;
use crate::app::AppState;
use crate::entities::{Actor, ActorCreate, ActorRead};
use crate::error::CatalogResult;
use crate::orm::{Crud, ListParams, PatchDocument, Predicate};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/actors", get(list_actors).post(create_actor))
        .route(
            "/actors/{id}",
            get(get_actor)
                .put(replace_actor)
                .patch(patch_actor)
                .delete(delete_actor),
        )
}

fn crud(state: &AppState) -> Crud<'_, Actor> {
    Crud::new(&state.pool, &state.mapper)
}

/// GET /api/actors?filter={..}&sort=[..]&range=[..]
async fn list_actors(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> CatalogResult<(HeaderMap, Json<Vec<ActorRead>>)> {
    let mut headers = HeaderMap::new();
    let actors = crud(&state)
        .list_filtered(
            Predicate::All,
            &params.filter(),
            params.sort().as_ref(),
            params.range().as_ref(),
            &mut headers,
        )
        .await?;
    Ok((headers, Json(actors)))
}

async fn get_actor(State(state): State<AppState>, Path(id): Path<i64>) -> CatalogResult<Json<ActorRead>> {
    Ok(Json(crud(&state).get(id).await?))
}

async fn create_actor(
    State(state): State<AppState>,
    Json(input): Json<ActorCreate>,
) -> CatalogResult<Response> {
    let (id, read) = crud(&state).create(input).await?;
    Ok(created(format!("/api/actors/{id}"), read))
}

async fn replace_actor(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<ActorCreate>,
) -> CatalogResult<StatusCode> {
    crud(&state).replace(id, input).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn patch_actor(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(document): Json<PatchDocument>,
) -> CatalogResult<StatusCode> {
    crud(&state).patch(id, &document).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_actor(State(state): State<AppState>, Path(id): Path<i64>) -> CatalogResult<StatusCode> {
    crud(&state).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
