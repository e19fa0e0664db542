//! Application settings.
//!
//! Read from an optional `settings.toml` next to the binary, then overridden
//! by `TRIPSPLIT__*` environment variables (`TRIPSPLIT__SERVER__PORT=3000`).
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub server: Option<Server>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_builder(
            Config::builder().add_source(File::with_name("settings").required(false)),
        )
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, ConfigError> {
        builder
            .add_source(Environment::with_prefix("TRIPSPLIT").separator("__"))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn from_toml(toml: &str) -> Settings {
        Settings::from_builder(Config::builder().add_source(File::from_str(toml, FileFormat::Toml)))
            .unwrap()
    }

    #[test]
    fn empty_settings_use_defaults() {
        let settings = from_toml("");
        assert_eq!(settings.app.level, "info");
        assert!(settings.server.is_none());
    }

    #[test]
    fn sqlite_server_settings() {
        let settings = from_toml(
            r#"
            [app]
            level = "debug"

            [server]
            port = 3000
            database = { sqlite = "trips.db" }
            "#,
        );
        assert_eq!(settings.app.level, "debug");
        let server = settings.server.unwrap();
        assert_eq!(server.port, 3000);
        assert!(server.bind.is_none());
        assert_eq!(server.database, Database::Sqlite("trips.db".to_string()));
    }

    #[test]
    fn memory_database() {
        let settings = from_toml(
            r#"
            [server]
            bind = "0.0.0.0"
            port = 8080
            database = "memory"
            "#,
        );
        let server = settings.server.unwrap();
        assert_eq!(server.bind.as_deref(), Some("0.0.0.0"));
        assert_eq!(server.database, Database::Memory);
    }
}
