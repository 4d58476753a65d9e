//! Catalog lookup

use std::sync::Arc;
use crate::domain::aggregates::{Movie, MovieFilter};
use crate::domain::value_objects::Page;
use crate::store::Store;
use crate::{Result, StorefrontError};

#[derive(Debug)]
pub struct MoviePage {
    pub movies: Vec<Movie>,
    pub page: Page,
    pub total_items: u64,
}

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn Store>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn Store>) -> Self { Self { store } }

    pub async fn list_movies(&self, filter: &MovieFilter, page: Page) -> Result<MoviePage> {
        let (movies, total_items) = self.store.list_movies(filter, page).await?;
        if movies.is_empty() {
            return Err(StorefrontError::not_found("No movies found."));
        }
        Ok(MoviePage { movies, page, total_items })
    }
}
