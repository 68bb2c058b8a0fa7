//! Process-environment configuration loaded once at startup.

/// Immutable runtime configuration shared by every adapter.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bearer token for the catalog API.
    pub notion_token: String,
    /// Identifier of the catalog database holding one entry per record.
    pub notion_database_id: String,
    /// Client id for the structured metadata provider.
    pub spotify_client_id: String,
    /// Client secret for the structured metadata provider.
    pub spotify_client_secret: String,
    /// API key for the artwork hosting provider.
    pub imgbb_api_key: String,
}

impl Config {
    /// Loads every required variable from the process environment.
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            notion_token: require_env("NOTION_TOKEN")?,
            notion_database_id: require_env("NOTION_DATABASE_ID")?,
            spotify_client_id: require_env("SPOTIFY_CLIENT_ID")?,
            spotify_client_secret: require_env("SPOTIFY_CLIENT_SECRET")?,
            imgbb_api_key: require_env("IMGBB_API_KEY")?,
        })
    }
}

fn require_env(name: &str) -> Result<String, String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        Ok(_) => Err(format!("Environment variable {name} is empty")),
        Err(_) => Err(format!("Environment variable {name} is not set")),
    }
}
