use std::{net::IpAddr, path::PathBuf};

use tokio::fs;

const DEFAULT_CONFIG_PATH: &str = "tikm_menu.toml";

/// Loads the config named by `TIKM_MENU_CONFIG`, or `tikm_menu.toml` in the
/// working directory. A missing file means defaults, a broken one is an error.
pub async fn read() -> anyhow::Result<Config> {
    let config_path = std::env::var("TIKM_MENU_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

    if !fs::try_exists(&config_path).await? {
        tracing::info!("no config at {config_path:?}, using default config");
        return Ok(Config::default());
    }

    let raw = fs::read_to_string(&config_path).await?;
    let config: Config = toml::from_str(&raw)?;
    tracing::info!("read config from {config_path:?}: {config:#?}");

    Ok(config)
}

#[derive(Debug, serde::Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    pub db: Option<DbConfig>,
    /// precomputed year statistics for /api/wrapped
    pub wrapped_stats: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        #[cfg(debug_assertions)] let db = {
            tracing::info!("using default config for db in debug");
            Some(DbConfig::default())
        };
        #[cfg(not(debug_assertions))] let db = {
            tracing::warn!("no db config provided, running without db");
            None
        };

        Self {
            db,
            server: ServerConfig::default(),
            upstream: UpstreamConfig::default(),
            wrapped_stats: None,
        }
    }
}

#[derive(Debug, serde::Deserialize)]
pub struct DbConfig {
    pub url: String,
    pub database: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: format!("mongodb://localhost:27017"),
            database: format!("tikm_menu"),
        }
    }
}

#[derive(Debug, serde::Deserialize)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        #[cfg(not(debug_assertions))]
        tracing::warn!("using default server config in release");

        ServerConfig {
            address: IpAddr::from([0, 0, 0, 0]),
            port: 3000,
        }
    }
}

#[derive(Debug, serde::Deserialize)]
pub struct UpstreamConfig {
    /// base url of the menu api, without the /api suffix
    pub url: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self { url: format!("https://tikm.coolstuff.work") }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_uses_defaults() {
        let config: Config = toml::from_str(r#"
            wrapped_stats = "data/wrapped-2025.json"

            [db]
            url = "mongodb://db:27017"
            database = "menus"
        "#).unwrap();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.upstream.url, "https://tikm.coolstuff.work");
        assert_eq!(config.db.map(|v| v.database).as_deref(), Some("menus"));
        assert_eq!(config.wrapped_stats, Some(PathBuf::from("data/wrapped-2025.json")));
    }

    #[test]
    fn server_section_overrides() {
        let config: Config = toml::from_str(r#"
            [server]
            address = "127.0.0.1"
            port = 8080

            [upstream]
            url = "http://localhost:9000"
        "#).unwrap();

        assert_eq!(config.server.address, IpAddr::from([127, 0, 0, 1]));
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.upstream.url, "http://localhost:9000");
        assert!(config.db.is_none());
    }
}
