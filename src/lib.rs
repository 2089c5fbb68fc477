pub mod app;
pub mod config;
pub mod error;
pub mod gateway;
pub mod models;
pub mod movie;
pub mod provider;
pub mod series;
