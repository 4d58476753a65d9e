//! Catalog routes

use axum::extract::State;
use axum::Json;
use validator::Validate;
use crate::domain::aggregates::{MovieFilter, MovieSort};
use crate::http::error::ApiError;
use crate::http::extract::Query;
use crate::http::schemas::{MovieListParams, MovieListResponse};
use crate::http::AppState;

pub async fn list_movies(
    State(s): State<AppState>,
    Query(p): Query<MovieListParams>,
) -> Result<Json<MovieListResponse>, ApiError> {
    p.validate()?;
    let page = p.page()?;
    let filter = MovieFilter {
        year: p.year,
        min_imdb: p.min_imdb,
        max_imdb: p.max_imdb,
        genre: p.genre,
        director: p.director,
        star: p.star,
        search: p.search,
        sort: p.sort_by.as_deref().and_then(MovieSort::parse),
    };
    let movies = s.catalog.list_movies(&filter, page).await?;
    Ok(Json(movies.into()))
}
