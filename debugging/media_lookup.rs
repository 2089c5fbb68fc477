//! Run one gateway operation against the configured upstreams and print the canonical JSON.
//! Usage:
//!   cargo run --bin media_lookup -- by-id <MOVIE|SERIE> <id>
//!   cargo run --bin media_lookup -- search-movie <name>
//!   cargo run --bin media_lookup -- search-serie <name>
//! Reads MOVIES_* and SERIES_BASE_URL from the environment (.env supported).

use anyhow::{Context, Result};
use dotenvy::dotenv;
use media_search_engine::app::build_gateway;
use media_search_engine::config::Config;
use serde_json::Value;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Command {
    ById,
    SearchMovie,
    SearchSerie,
}

impl FromStr for Command {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "by-id" => Ok(Command::ById),
            "search-movie" => Ok(Command::SearchMovie),
            "search-serie" => Ok(Command::SearchSerie),
            _ => Err(anyhow::anyhow!(
                "command must be 'by-id', 'search-movie' or 'search-serie'"
            )),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: cargo run --bin media_lookup -- by-id <MOVIE|SERIE> <id>");
        eprintln!("       cargo run --bin media_lookup -- search-movie <name>");
        eprintln!("       cargo run --bin media_lookup -- search-serie <name>");
        std::process::exit(1);
    }

    let command = Command::from_str(&args[1])?;
    let config = Config::from_env()?;
    let gateway = build_gateway(&config)?;

    let output: Value = match command {
        Command::ById => {
            let id = args
                .get(3)
                .ok_or_else(|| anyhow::anyhow!("missing media id"))?;
            serde_json::to_value(gateway.get_media_by_id(&args[2], id).await?)?
        }
        Command::SearchMovie => {
            serde_json::to_value(gateway.search_movie_by_name(&args[2..].join(" ")).await?)?
        }
        Command::SearchSerie => {
            serde_json::to_value(gateway.search_serie_by_name(&args[2..].join(" ")).await?)?
        }
    };

    println!(
        "{}",
        serde_json::to_string_pretty(&output).context("Failed to render result")?
    );
    Ok(())
}
