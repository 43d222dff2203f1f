use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

#[derive(Deserialize)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub database: DatabaseSettings,
}

#[derive(Deserialize)]
pub struct ApplicationSettings {
    pub host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
}

impl ApplicationSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Deserialize)]
pub struct DatabaseSettings {
    url: SecretString,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_connections: u32,
    pub create_if_missing: bool,
}

impl DatabaseSettings {
    pub fn url(&self) -> &str {
        self.url.expose_secret()
    }
}

/// Loads settings from defaults, an optional config file and `TRIVIA__*` env vars.
///
/// Without an explicit `path`, `configuration.{yaml,toml,json}` in the working
/// directory is used when present.
pub fn get_configuration(path: Option<&Path>) -> Result<Settings, ConfigError> {
    dotenv::dotenv().ok();
    let file = match path {
        Some(path) => File::from(path).required(true),
        None => File::with_name("configuration").required(false),
    };
    Config::builder()
        .set_default("application.host", "0.0.0.0")?
        .set_default("application.port", 5000)?
        .set_default("database.url", "sqlite:trivia.db")?
        .set_default("database.max_connections", 5)?
        .set_default("database.create_if_missing", true)?
        .add_source(file)
        .add_source(
            Environment::with_prefix("TRIVIA")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?
        .try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[application]\nport = \"8080\"\n\n[database]\nurl = \"sqlite::memory:\""
        )
        .unwrap();

        let settings = get_configuration(Some(file.path())).unwrap();
        assert_eq!(settings.application.port, 8080);
        assert_eq!(settings.application.address(), "0.0.0.0:8080");
        assert_eq!(settings.database.url(), "sqlite::memory:");
        assert_eq!(settings.database.max_connections, 5);
        assert!(settings.database.create_if_missing);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        assert!(get_configuration(Some(Path::new("/nonexistent/trivia.toml"))).is_err());
    }
}
