//! Runtime settings loaded from the process environment.
//!
//! The Discord token is deliberately not part of [`AppConfig`]; it is read in
//! `main` immediately before the gateway client is built and never stored.

use std::env;

/// Default audio node address, matching the docker-compose service name.
const DEFAULT_LAVALINK_ADDRESS: &str = "lavalink:2333";
/// Lavalink ships with this password; override `LAVALINK_PASSWORD` in any
/// real deployment.
const DEFAULT_LAVALINK_PASSWORD: &str = "youshallnotpass";
const DEFAULT_DATABASE_URL: &str = "sqlite://data/jukebot.sqlite?mode=rwc";
const DEFAULT_API_BIND: &str = "0.0.0.0:8080";

/// Connection settings for the external audio node.
#[derive(Debug, Clone)]
pub struct LavalinkConfig {
    /// `host:port` of the node's combined REST/websocket listener
    pub address: String,
    /// Shared secret sent as the `Authorization` header
    pub password: String,
}

/// Top-level application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// SeaORM connection string for the history store
    pub database_url: String,
    /// Audio node settings
    pub lavalink: LavalinkConfig,
    /// Bind address for the REST API
    pub api_bind: String,
}

/// Loads the application configuration from the environment, falling back to
/// defaults suitable for the standard compose setup.
#[must_use]
pub fn load_app_configuration() -> AppConfig {
    AppConfig {
        database_url: env::var("DATABASE_URL")
            .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
        lavalink: LavalinkConfig {
            address: env::var("LAVALINK_ADDRESS")
                .unwrap_or_else(|_| DEFAULT_LAVALINK_ADDRESS.to_string()),
            password: env::var("LAVALINK_PASSWORD")
                .unwrap_or_else(|_| DEFAULT_LAVALINK_PASSWORD.to_string()),
        },
        api_bind: env::var("API_BIND").unwrap_or_else(|_| DEFAULT_API_BIND.to_string()),
    }
}
