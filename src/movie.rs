use async_trait::async_trait;
use reqwest::{header::ACCEPT, Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::MovieConfig;
use crate::error::MediaError;
use crate::models::{sort_by_popularity, Movie};
use crate::provider::MediaProvider;

/// Adapter for the TMDB-shaped movie catalog.
#[derive(Debug, Clone)]
pub struct MovieClient {
    client: Client,
    config: MovieConfig,
}

impl MovieClient {
    pub fn new(client: Client, config: MovieConfig) -> Self {
        Self { client, config }
    }

    async fn fetch(&self, url: &str, context: &str) -> Result<(StatusCode, String), MediaError> {
        let res = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .bearer_auth(&self.config.token)
            .send()
            .await
            .map_err(|e| MediaError::transport(context, e))?;
        let status = res.status();
        let text = res
            .text()
            .await
            .map_err(|e| MediaError::transport(context, e))?;
        Ok((status, text))
    }

    fn to_movie(&self, entry: MovieEntry, id: String) -> Movie {
        Movie {
            id,
            title: entry.title.unwrap_or_default(),
            overview: entry.overview.unwrap_or_default(),
            release_date: entry.release_date.unwrap_or_default(),
            poster_path: image_url(&self.config.image_base, entry.poster_path),
            backdrop_path: image_url(&self.config.image_base, entry.backdrop_path),
            popularity: entry.popularity.unwrap_or_default(),
        }
    }
}

#[async_trait]
impl MediaProvider for MovieClient {
    type Item = Movie;

    async fn search_by_name(&self, name: &str) -> Result<Vec<Movie>, MediaError> {
        #[derive(Deserialize)]
        struct SearchResponse {
            results: Vec<MovieEntry>,
        }

        let context = "Error fetching movie search results";
        let url = format!(
            "{}/search/movie?sort_by=popularity.desc&query={}&include_adult=true&language=en-US&page=1",
            self.config.base_url,
            urlencoding::encode(name)
        );
        debug!(url = %url, "Movie search request");
        let (status, body) = self.fetch(&url, context).await?;
        if !status.is_success() {
            return Err(MediaError::upstream(context, status));
        }
        let data: SearchResponse = serde_json::from_str(&body)
            .map_err(|e| MediaError::decode(format!("movie search for '{name}'"), e))?;

        let mut movies: Vec<Movie> = data
            .results
            .into_iter()
            .filter_map(|entry| match upstream_id(entry.id.as_ref()) {
                Some(id) => Some(self.to_movie(entry, id)),
                None => {
                    warn!("Skipping movie search result without an id");
                    None
                }
            })
            .collect();
        sort_by_popularity(&mut movies);
        info!("Movie search '{}' returned {} results", name, movies.len());
        Ok(movies)
    }

    async fn get_by_id(&self, id: &str) -> Result<Movie, MediaError> {
        let context = format!("Error fetching details for movie ID {id}");
        let url = format!(
            "{}/movie/{}?language=en-US&{}",
            self.config.base_url,
            urlencoding::encode(id),
            self.config.api_key_param
        );
        debug!(movie_id = %id, "Movie detail request");
        let (status, body) = self.fetch(&url, &context).await?;
        if status == StatusCode::NOT_FOUND {
            return Err(not_found(id));
        }
        if !status.is_success() {
            return Err(MediaError::upstream(context, status));
        }
        let entry: MovieEntry = serde_json::from_str(&body)
            .map_err(|e| MediaError::decode(format!("movie detail for ID {id}"), e))?;
        let movie_id = upstream_id(entry.id.as_ref()).ok_or_else(|| not_found(id))?;
        Ok(self.to_movie(entry, movie_id))
    }
}

fn not_found(id: &str) -> MediaError {
    MediaError::NotFound(format!("Movie with id {id} not found"))
}

#[derive(Debug, Deserialize)]
struct MovieEntry {
    id: Option<Value>,
    title: Option<String>,
    overview: Option<String>,
    release_date: Option<String>,
    poster_path: Option<String>,
    backdrop_path: Option<String>,
    #[serde(default)]
    popularity: Option<f64>,
}

/// String form of an upstream identifier; `None` when absent or empty.
fn upstream_id(id: Option<&Value>) -> Option<String> {
    match id? {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        _ => None,
    }
}

fn image_url(base: &str, path: Option<String>) -> Option<String> {
    path.filter(|p| !p.is_empty())
        .map(|p| format!("{base}{p}"))
}
