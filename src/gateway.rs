use std::sync::Arc;
use tracing::info;

use crate::error::MediaError;
use crate::models::{
    GetMediaByIdResponse, MediaType, Movie, SearchMovieByNameResponse, SearchSerieByNameResponse,
    Serie,
};
use crate::provider::MediaProvider;

pub type MovieProvider = Arc<dyn MediaProvider<Item = Movie>>;
pub type SerieProvider = Arc<dyn MediaProvider<Item = Serie>>;

/// Routes each operation to exactly one upstream adapter.
#[derive(Clone)]
pub struct MediaGateway {
    movies: MovieProvider,
    series: SerieProvider,
}

impl MediaGateway {
    pub fn new(movies: MovieProvider, series: SerieProvider) -> Self {
        Self { movies, series }
    }

    pub async fn get_media_by_id(
        &self,
        media_type: &str,
        media_id: &str,
    ) -> Result<GetMediaByIdResponse, MediaError> {
        let kind: MediaType = media_type.parse()?;
        info!("Get media by id: {} {}", kind, media_id);
        match kind {
            MediaType::Movie => self
                .movies
                .get_by_id(media_id)
                .await
                .map(GetMediaByIdResponse::Movie),
            MediaType::Serie => self
                .series
                .get_by_id(media_id)
                .await
                .map(GetMediaByIdResponse::Serie),
        }
    }

    pub async fn search_movie_by_name(
        &self,
        name: &str,
    ) -> Result<SearchMovieByNameResponse, MediaError> {
        let movies_list = self.movies.search_by_name(name).await?;
        Ok(SearchMovieByNameResponse { movies_list })
    }

    pub async fn search_serie_by_name(
        &self,
        name: &str,
    ) -> Result<SearchSerieByNameResponse, MediaError> {
        let series_list = self.series.search_by_name(name).await?;
        Ok(SearchSerieByNameResponse { series_list })
    }
}
