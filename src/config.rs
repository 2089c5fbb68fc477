use anyhow::{Context, Result};
use std::{env, fmt, net::SocketAddr};
use tracing::warn;

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:5002";

/// Connection settings for the movie catalog upstream.
#[derive(Clone, Default)]
pub struct MovieConfig {
    pub base_url: String,
    pub token: String,
    /// Prefix joined with the upstream's relative image paths.
    pub image_base: String,
    /// Raw query fragment appended to detail requests, e.g. `api_key=...`.
    pub api_key_param: String,
}

// Credentials are redacted so the config can be logged.
impl fmt::Debug for MovieConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MovieConfig")
            .field("base_url", &self.base_url)
            .field("token", &redacted(&self.token))
            .field("image_base", &self.image_base)
            .field("api_key_param", &redacted(&self.api_key_param))
            .finish()
    }
}

fn redacted(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}

#[derive(Debug, Clone, Default)]
pub struct SeriesConfig {
    pub base_url: String,
}

/// Process-wide settings, read once at startup and handed to each adapter.
#[derive(Debug, Clone)]
pub struct Config {
    pub movies: MovieConfig,
    pub series: SeriesConfig,
    pub listen_addr: SocketAddr,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let listen_raw =
            env::var("MEDIA_SEARCH_ADDR").unwrap_or_else(|_| DEFAULT_LISTEN_ADDR.to_string());
        let listen_addr = listen_raw
            .parse::<SocketAddr>()
            .with_context(|| format!("MEDIA_SEARCH_ADDR is not a socket address: {listen_raw}"))?;

        Ok(Self {
            movies: MovieConfig {
                base_url: upstream_var("MOVIES_BASE_URL"),
                token: upstream_var("MOVIES_TOKEN"),
                image_base: upstream_var("MOVIES_POSTER_PATH"),
                api_key_param: upstream_var("MOVIES_API_KEY"),
            },
            series: SeriesConfig {
                base_url: upstream_var("SERIES_BASE_URL"),
            },
            listen_addr,
        })
    }
}

// Upstream settings have no defaults; a missing one surfaces later as a failed request.
fn upstream_var(key: &str) -> String {
    match env::var(key) {
        Ok(value) => value,
        Err(_) => {
            warn!("{} is not set - requests using it will fail", key);
            String::new()
        }
    }
}
