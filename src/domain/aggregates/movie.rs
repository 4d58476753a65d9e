//! Movie catalog read model

use serde::Serialize;
use crate::domain::value_objects::{Money, MovieId};

/// Catalog entry. Read-only from the storefront's point of view.
#[derive(Clone, Debug, PartialEq, Serialize, sqlx::FromRow)]
pub struct Movie {
    pub id: MovieId,
    pub name: String,
    pub year: i32,
    pub time: i32,
    pub imdb: f64,
    pub votes: i32,
    pub description: String,
    pub price: Money,
}

/// Descending sort keys accepted by the movie listing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MovieSort { Price, Year, Votes }

impl MovieSort {
    /// Unknown keys fall back to the default ordering.
    pub fn parse(key: &str) -> Option<Self> {
        match key {
            "price" => Some(Self::Price),
            "year" => Some(Self::Year),
            "votes" => Some(Self::Votes),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MovieFilter {
    pub year: Option<i32>,
    pub min_imdb: Option<f64>,
    pub max_imdb: Option<f64>,
    pub genre: Option<String>,
    pub director: Option<String>,
    pub star: Option<String>,
    pub search: Option<String>,
    pub sort: Option<MovieSort>,
}

/// Case-insensitive substring match, the `ILIKE '%needle%'` of the catalog filters.
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_keys() {
        assert_eq!(MovieSort::parse("votes"), Some(MovieSort::Votes));
        assert_eq!(MovieSort::parse("rating"), None);
    }

    #[test]
    fn test_contains_ci() {
        assert!(contains_ci("The Godfather", "godf"));
        assert!(!contains_ci("Alien", "aliens"));
    }
}
