use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::MediaError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: String,
    pub title: String,
    pub overview: String,
    pub release_date: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub popularity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Serie {
    pub id: String,
    pub title: String,
    pub overview: String,
    pub start_date: String,
    pub end_date: Option<String>,
    pub run_time: u32,
    pub number_of_episodes: usize,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    /// `rating * rating_count` as reported by the series upstream.
    pub popularity: f64,
}

/// Anything a search result list can be ranked by.
pub trait Ranked {
    fn popularity(&self) -> f64;
}

impl Ranked for Movie {
    fn popularity(&self) -> f64 {
        self.popularity
    }
}

impl Ranked for Serie {
    fn popularity(&self) -> f64 {
        self.popularity
    }
}

/// Sorts by descending popularity. The sort is stable, so ties keep upstream order.
pub fn sort_by_popularity<T: Ranked>(items: &mut [T]) {
    items.sort_by(|a, b| b.popularity().total_cmp(&a.popularity()));
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Movie,
    Serie,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Movie => "MOVIE",
            MediaType::Serie => "SERIE",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = MediaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MOVIE" => Ok(MediaType::Movie),
            "SERIE" => Ok(MediaType::Serie),
            other => Err(MediaError::UnknownMediaType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetMediaByIdRequest {
    pub media_type: String,
    pub media_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GetMediaByIdResponse {
    Movie(Movie),
    Serie(Serie),
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchByNameRequest {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchMovieByNameResponse {
    pub movies_list: Vec<Movie>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchSerieByNameResponse {
    pub series_list: Vec<Serie>,
}
