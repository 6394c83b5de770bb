use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub server: ServerSettings,
}

#[derive(Deserialize, Clone, Debug)]
pub struct DatabaseSettings {
    pub path: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_connections: u32,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ServerSettings {
    pub host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
}

impl ServerSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Defaults, then an optional `trivia.toml` next to the binary, then
/// `TRIVIA_`-prefixed environment variables (`TRIVIA_DATABASE__PATH=...`).
pub fn get_settings() -> Result<Settings, ConfigError> {
    dotenv::dotenv().ok();
    Config::builder()
        .set_default("database.path", "trivia.db")?
        .set_default("database.max_connections", 5)?
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8080)?
        .add_source(File::with_name("trivia").required(false))
        .add_source(
            Environment::with_prefix("TRIVIA")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?
        .try_deserialize()
}
