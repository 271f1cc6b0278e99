//! Movie review endpoints
//!
//! Reviews live under their movie. Writes require a caller identity and
//! only the author may replace or delete a review.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::Response,
    routing::get,
};
use tracing::info;

use super::{CallerId, created};
use crate::app::AppState;
use crate::entities::review::{by_author, of_movie};
use crate::entities::{Movie, Review, ReviewCreate, ReviewRead};
use crate::error::{CatalogError, CatalogResult};
use crate::orm::{Crud, EntityQuery, EntityShapes, PageDescriptor, PageParams, Validate};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/movies/{movie_id}/reviews",
            get(list_reviews).post(create_review),
        )
        .route(
            "/movies/{movie_id}/reviews/{review_id}",
            get(get_review).put(replace_review).delete(delete_review),
        )
}

fn crud(state: &AppState) -> Crud<'_, Review> {
    Crud::new(&state.pool, &state.mapper)
}

async fn check_movie(state: &AppState, movie_id: i64) -> CatalogResult<()> {
    if Crud::<Movie>::new(&state.pool, &state.mapper).exists(movie_id).await? {
        Ok(())
    } else {
        Err(CatalogError::NotFound)
    }
}

/// Load a review, treating one attached to another movie as missing.
async fn find_review(state: &AppState, movie_id: i64, review_id: i64) -> CatalogResult<Review> {
    crud(state)
        .find(review_id)
        .await?
        .filter(|review| review.movie_id == movie_id)
        .ok_or(CatalogError::NotFound)
}

/// GET /api/movies/{movie_id}/reviews?page=1&recordsPerPage=10
async fn list_reviews(
    State(state): State<AppState>,
    Path(movie_id): Path<i64>,
    Query(params): Query<PageParams>,
) -> CatalogResult<(HeaderMap, Json<Vec<ReviewRead>>)> {
    check_movie(&state, movie_id).await?;
    let page = PageDescriptor::from_params(
        params,
        state.config.default_page_size,
        state.config.max_page_size,
    )?;

    let mut headers = HeaderMap::new();
    let reviews = crud(&state)
        .list_paged(of_movie(movie_id), &page, &mut headers)
        .await?;
    Ok((headers, Json(reviews)))
}

async fn get_review(
    State(state): State<AppState>,
    Path((movie_id, review_id)): Path<(i64, i64)>,
) -> CatalogResult<Json<ReviewRead>> {
    let review = find_review(&state, movie_id, review_id).await?;
    Ok(Json(review.to_read(&state.mapper)))
}

async fn create_review(
    State(state): State<AppState>,
    Path(movie_id): Path<i64>,
    CallerId(user_id): CallerId,
    Json(input): Json<ReviewCreate>,
) -> CatalogResult<Response> {
    check_movie(&state, movie_id).await?;
    input.validate()?;

    let existing = EntityQuery::<Review>::new()
        .filter(of_movie(movie_id).and(by_author(&user_id)))
        .count(&state.pool)
        .await?;
    if existing > 0 {
        return Err(CatalogError::bad_request(
            "The user has already reviewed this movie",
        ));
    }

    let row = Review::from_create(input, &state.mapper).owned_by(movie_id, user_id);
    let row = crud(&state).insert(row).await?;
    info!(movie_id, review_id = row.id, "Review created");
    Ok(created(
        format!("/api/movies/{movie_id}/reviews/{}", row.id),
        row.to_read(&state.mapper),
    ))
}

async fn replace_review(
    State(state): State<AppState>,
    Path((movie_id, review_id)): Path<(i64, i64)>,
    CallerId(user_id): CallerId,
    Json(input): Json<ReviewCreate>,
) -> CatalogResult<StatusCode> {
    let review = find_review(&state, movie_id, review_id).await?;
    if review.user_id != user_id {
        return Err(CatalogError::bad_request(
            "Only the author may edit this review",
        ));
    }
    input.validate()?;

    let mut row = Review::from_create(input, &state.mapper).owned_by(movie_id, user_id);
    row.id = review.id;
    crud(&state).update(&row).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_review(
    State(state): State<AppState>,
    Path((movie_id, review_id)): Path<(i64, i64)>,
    CallerId(user_id): CallerId,
) -> CatalogResult<StatusCode> {
    let review = find_review(&state, movie_id, review_id).await?;
    if review.user_id != user_id {
        return Err(CatalogError::forbidden(
            "Only the author may delete this review",
        ));
    }
    crud(&state).delete(review.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
