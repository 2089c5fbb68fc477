use async_trait::async_trait;
use futures::future::try_join_all;
use reqwest::{Client, Response};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::{debug, info};

use crate::config::SeriesConfig;
use crate::error::MediaError;
use crate::models::{sort_by_popularity, Serie};
use crate::provider::MediaProvider;

/// Adapter for the Episodate-shaped series catalog.
///
/// Searching is two-phase: the search endpoint only yields ids, so every hit is
/// enriched with a detail request. The detail requests run concurrently with no cap.
#[derive(Debug, Clone)]
pub struct SeriesClient {
    client: Client,
    config: SeriesConfig,
}

impl SeriesClient {
    pub fn new(client: Client, config: SeriesConfig) -> Self {
        Self { client, config }
    }

    async fn get(&self, url: &str, context: &str) -> Result<Response, MediaError> {
        self.client
            .get(url)
            .send()
            .await
            .map_err(|e| MediaError::transport(context, e))
    }

    async fn search_ids(&self, name: &str) -> Result<Vec<Value>, MediaError> {
        #[derive(Deserialize)]
        struct SearchHit {
            id: Value,
        }
        #[derive(Deserialize)]
        struct SearchResponse {
            #[serde(default)]
            tv_shows: Vec<SearchHit>,
        }

        let context = "Error fetching search results";
        let url = format!(
            "{}/search?q={}&page=1",
            self.config.base_url,
            urlencoding::encode(name)
        );
        debug!(url = %url, "Series search request");
        let res = self.get(&url, context).await?;
        if !res.status().is_success() {
            return Err(MediaError::upstream(context, res.status()));
        }
        let body = res
            .text()
            .await
            .map_err(|e| MediaError::transport(context, e))?;
        let data: SearchResponse = serde_json::from_str(&body)
            .map_err(|e| MediaError::decode(format!("series search for '{name}'"), e))?;
        Ok(data.tv_shows.into_iter().map(|hit| hit.id).collect())
    }

    /// Fetches the raw detail payload; `Ok(None)` when the upstream has no show data.
    async fn fetch_detail(&self, id: &str) -> Result<Option<ShowDetail>, MediaError> {
        #[derive(Deserialize)]
        struct DetailResponse {
            #[serde(rename = "tvShow", default)]
            tv_show: Value,
        }

        let context = format!("Error fetching details for series ID {id}");
        let url = format!(
            "{}/show-details?q={}",
            self.config.base_url,
            urlencoding::encode(id)
        );
        debug!(series_id = %id, "Series detail request");
        let res = self.get(&url, &context).await?;
        let status = res.status();
        if !status.is_success() {
            return Err(MediaError::upstream(context, status));
        }
        let body = res
            .text()
            .await
            .map_err(|e| MediaError::transport(context.as_str(), e))?;
        let decode_context = format!("series detail for ID {id}");
        let data: DetailResponse = serde_json::from_str(&body)
            .map_err(|e| MediaError::decode(decode_context.as_str(), e))?;
        if is_empty_show(&data.tv_show) {
            return Ok(None);
        }
        serde_json::from_value(data.tv_show)
            .map(Some)
            .map_err(|e| MediaError::decode(decode_context, e))
    }

    async fn detail_for_search(&self, id: String) -> Result<Serie, MediaError> {
        match self.fetch_detail(&id).await? {
            Some(show) => Ok(show.into_serie()),
            None => Err(not_found(&id)),
        }
    }
}

#[async_trait]
impl MediaProvider for SeriesClient {
    type Item = Serie;

    async fn search_by_name(&self, name: &str) -> Result<Vec<Serie>, MediaError> {
        let ids = self.search_ids(name).await?;
        debug!("Series search '{}' yielded {} candidates", name, ids.len());

        // Any failing detail request fails the whole search and drops the rest.
        let mut series = try_join_all(
            ids.iter()
                .map(|id| self.detail_for_search(id_string(id))),
        )
        .await?;

        sort_by_popularity(&mut series);
        info!("Series search '{}' returned {} results", name, series.len());
        Ok(series)
    }

    async fn get_by_id(&self, id: &str) -> Result<Serie, MediaError> {
        match self.fetch_detail(id).await {
            Ok(Some(show)) => Ok(show.into_serie()),
            Ok(None) => Err(not_found(id)),
            Err(MediaError::Upstream { status, .. }) => Err(MediaError::InvalidArgument(format!(
                "Error fetching details for series ID {id}: {status}"
            ))),
            Err(e) => Err(e),
        }
    }
}

fn not_found(id: &str) -> MediaError {
    MediaError::NotFound(format!("Serie with id {id} not found"))
}

fn id_string(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// The upstream answers unknown ids with `"tvShow": []`.
fn is_empty_show(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
        _ => false,
    }
}

#[derive(Debug, Deserialize)]
struct ShowDetail {
    id: Value,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    start_date: Option<String>,
    #[serde(default)]
    end_date: Option<String>,
    #[serde(default)]
    runtime: Option<u32>,
    #[serde(default)]
    episodes: Option<Vec<Value>>,
    #[serde(default)]
    image_path: Option<String>,
    #[serde(default)]
    pictures: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_number")]
    rating: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    rating_count: f64,
}

impl ShowDetail {
    fn into_serie(self) -> Serie {
        Serie {
            id: id_string(&self.id),
            title: self.name.unwrap_or_default(),
            overview: self.description.unwrap_or_default(),
            start_date: self.start_date.unwrap_or_default(),
            end_date: self.end_date,
            run_time: self.runtime.unwrap_or_default(),
            number_of_episodes: self.episodes.map_or(0, |e| e.len()),
            poster_path: self.image_path.filter(|p| !p.is_empty()),
            backdrop_path: self
                .pictures
                .and_then(|p| p.into_iter().next())
                .filter(|p| !p.is_empty()),
            popularity: self.rating * self.rating_count,
        }
    }
}

/// Accepts `8`, `8.5`, `"8.5"`, `""` or `null`; blanks count as zero.
fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Numeric {
        Number(f64),
        Text(String),
    }

    match Option::<Numeric>::deserialize(deserializer)? {
        None => Ok(0.0),
        Some(Numeric::Number(n)) => Ok(n),
        Some(Numeric::Text(s)) if s.trim().is_empty() => Ok(0.0),
        Some(Numeric::Text(s)) => s.trim().parse().map_err(|_| {
            serde::de::Error::custom(format!("expected a numeric string, got '{s}'"))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::{Duration, Instant};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> SeriesClient {
        SeriesClient::new(
            Client::new(),
            SeriesConfig {
                base_url: server.uri(),
            },
        )
    }

    fn show(id: i64, name: &str, rating: Value, rating_count: Value) -> Value {
        json!({
            "tvShow": {
                "id": id,
                "name": name,
                "description": format!("{name} description."),
                "start_date": "1979-05-20",
                "end_date": null,
                "runtime": 50,
                "episodes": [1, 2, 3],
                "image_path": "/poster.jpg",
                "pictures": ["/backdrop.jpg"],
                "rating": rating,
                "rating_count": rating_count
            }
        })
    }

    async fn mount_search(server: &MockServer, ids: &[i64]) {
        let hits: Vec<Value> = ids.iter().map(|id| json!({ "id": id })).collect();
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "Alien"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total": ids.len().to_string(),
                "page": 1,
                "pages": 1,
                "tv_shows": hits
            })))
            .mount(server)
            .await;
    }

    async fn mount_detail(server: &MockServer, id: i64, response: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path("/show-details"))
            .and(query_param("q", id.to_string()))
            .respond_with(response)
            .expect(1)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn search_enriches_every_hit_and_sorts_by_derived_popularity() {
        let server = MockServer::start().await;
        mount_search(&server, &[333, 212, 111]).await;
        mount_detail(
            &server,
            333,
            ResponseTemplate::new(200).set_body_json(show(333, "Serie Covenant", json!(6.5), json!(2000))),
        )
        .await;
        mount_detail(
            &server,
            212,
            ResponseTemplate::new(200).set_body_json(show(212, "Serie 2", json!(7), json!(3000))),
        )
        .await;
        mount_detail(
            &server,
            111,
            ResponseTemplate::new(200).set_body_json(show(111, "Serie 1", json!(8), json!(4000))),
        )
        .await;

        let series = client_for(&server).search_by_name("Alien").await.unwrap();

        let ids: Vec<&str> = series.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["111", "212", "333"]);
        let popularity: Vec<f64> = series.iter().map(|s| s.popularity).collect();
        assert_eq!(popularity, vec![32000.0, 21000.0, 13000.0]);
        assert_eq!(
            series[0],
            Serie {
                id: "111".to_string(),
                title: "Serie 1".to_string(),
                overview: "Serie 1 description.".to_string(),
                start_date: "1979-05-20".to_string(),
                end_date: None,
                run_time: 50,
                number_of_episodes: 3,
                poster_path: Some("/poster.jpg".to_string()),
                backdrop_path: Some("/backdrop.jpg".to_string()),
                popularity: 32000.0,
            }
        );
    }

    #[tokio::test]
    async fn search_accepts_ratings_sent_as_strings() {
        let server = MockServer::start().await;
        mount_search(&server, &[111]).await;
        mount_detail(
            &server,
            111,
            ResponseTemplate::new(200).set_body_json(show(111, "Serie 1", json!("8"), json!("4000"))),
        )
        .await;

        let series = client_for(&server).search_by_name("Alien").await.unwrap();
        assert_eq!(series[0].popularity, 32000.0);
    }

    #[tokio::test]
    async fn search_maps_missing_images_to_none() {
        let server = MockServer::start().await;
        mount_search(&server, &[111]).await;
        let mut body = show(111, "Serie 1", json!(8), json!(4000));
        body["tvShow"]["image_path"] = Value::Null;
        body["tvShow"]["pictures"] = json!([]);
        mount_detail(&server, 111, ResponseTemplate::new(200).set_body_json(body)).await;

        let series = client_for(&server).search_by_name("Alien").await.unwrap();

        assert_eq!(series.len(), 1);
        assert_eq!(series[0].poster_path, None);
        assert_eq!(series[0].backdrop_path, None);
        assert_eq!(series[0].popularity, 32000.0);
    }

    #[tokio::test]
    async fn episode_count_ignores_declared_totals() {
        let server = MockServer::start().await;
        mount_search(&server, &[5]).await;
        let mut body = show(5, "Long Show", json!(1), json!(1));
        body["tvShow"]["episodes"] = json!([{ "season": 1, "episode": 1 }, { "season": 1, "episode": 2 }]);
        body["tvShow"]["total_episodes"] = json!(99);
        mount_detail(&server, 5, ResponseTemplate::new(200).set_body_json(body)).await;

        let series = client_for(&server).search_by_name("Alien").await.unwrap();
        assert_eq!(series[0].number_of_episodes, 2);
    }

    #[tokio::test]
    async fn detail_requests_run_concurrently() {
        let server = MockServer::start().await;
        let ids = [1, 2, 3, 4, 5];
        mount_search(&server, &ids).await;
        for id in ids {
            mount_detail(
                &server,
                id,
                ResponseTemplate::new(200)
                    .set_body_json(show(id, "Serie", json!(1), json!(id)))
                    .set_delay(Duration::from_millis(400)),
            )
            .await;
        }

        let started = Instant::now();
        let series = client_for(&server).search_by_name("Alien").await.unwrap();
        let elapsed = started.elapsed();

        assert_eq!(series.len(), 5);
        // Sequential requests would take at least 2s.
        assert!(elapsed < Duration::from_millis(1200), "took {elapsed:?}");
    }

    #[tokio::test]
    async fn null_collections_count_as_empty() {
        let server = MockServer::start().await;
        mount_search(&server, &[111]).await;
        let mut body = show(111, "Serie 1", json!(8), json!(4000));
        body["tvShow"]["episodes"] = Value::Null;
        body["tvShow"]["pictures"] = Value::Null;
        mount_detail(&server, 111, ResponseTemplate::new(200).set_body_json(body)).await;

        let series = client_for(&server).search_by_name("Alien").await.unwrap();

        assert_eq!(series[0].number_of_episodes, 0);
        assert_eq!(series[0].backdrop_path, None);
        assert_eq!(series[0].popularity, 32000.0);
    }

    #[tokio::test]
    async fn search_without_hits_skips_detail_phase() {
        let server = MockServer::start().await;
        mount_search(&server, &[]).await;
        Mock::given(method("GET"))
            .and(path("/show-details"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let series = client_for(&server).search_by_name("Alien").await.unwrap();
        assert!(series.is_empty());
    }

    #[tokio::test]
    async fn search_phase_failure_aborts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/show-details"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = client_for(&server)
            .search_by_name("Alien")
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::Upstream { .. }));
        assert_eq!(
            err.to_string(),
            "Error fetching search results: Service Unavailable"
        );
    }

    #[tokio::test]
    async fn one_failing_detail_fails_the_whole_search() {
        let server = MockServer::start().await;
        mount_search(&server, &[333, 212, 111]).await;
        Mock::given(method("GET"))
            .and(path("/show-details"))
            .and(query_param("q", "333"))
            .respond_with(ResponseTemplate::new(200).set_body_json(show(333, "A", json!(1), json!(1))))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/show-details"))
            .and(query_param("q", "212"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/show-details"))
            .and(query_param("q", "111"))
            .respond_with(ResponseTemplate::new(200).set_body_json(show(111, "C", json!(1), json!(1))))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .search_by_name("Alien")
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::Upstream { .. }));
        assert_eq!(
            err.to_string(),
            "Error fetching details for series ID 212: Internal Server Error"
        );
    }

    #[tokio::test]
    async fn get_by_id_maps_detail() {
        let server = MockServer::start().await;
        mount_detail(
            &server,
            123,
            ResponseTemplate::new(200).set_body_json(show(123, "Sit Down, Shut Up (AU)", json!(7.5), json!(10))),
        )
        .await;

        let serie = client_for(&server).get_by_id("123").await.unwrap();

        assert_eq!(serie.id, "123");
        assert_eq!(serie.title, "Sit Down, Shut Up (AU)");
        assert_eq!(serie.popularity, 75.0);
        assert_eq!(serie.number_of_episodes, 3);
    }

    #[tokio::test]
    async fn get_by_id_failure_status_is_invalid_argument() {
        let server = MockServer::start().await;
        mount_detail(&server, 123, ResponseTemplate::new(400)).await;

        let err = client_for(&server).get_by_id("123").await.unwrap_err();
        assert!(matches!(err, MediaError::InvalidArgument(_)));
        assert!(err.to_string().contains("series ID 123"));
    }

    #[tokio::test]
    async fn get_by_id_with_empty_show_is_not_found() {
        let server = MockServer::start().await;
        mount_detail(
            &server,
            999,
            ResponseTemplate::new(200).set_body_json(json!({ "tvShow": [] })),
        )
        .await;

        let err = client_for(&server).get_by_id("999").await.unwrap_err();
        assert!(matches!(err, MediaError::NotFound(_)));
        assert_eq!(err.to_string(), "Serie with id 999 not found");
    }

    #[test]
    fn empty_show_shapes() {
        assert!(is_empty_show(&Value::Null));
        assert!(is_empty_show(&json!([])));
        assert!(is_empty_show(&json!({})));
        assert!(!is_empty_show(&json!({ "id": 1 })));
    }

    #[test]
    fn lenient_number_rejects_garbage() {
        let parsed: Result<ShowDetail, _> = serde_json::from_value(json!({
            "id": 1,
            "rating": "high",
            "rating_count": 3
        }));
        assert!(parsed.is_err());
    }
}
