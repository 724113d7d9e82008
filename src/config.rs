//! Application configuration loaded from environment variables.
//!
//! On Cloud Run the publish hook token is injected as an env var through a
//! secret binding, so everything is read from the environment once at startup.

use std::env;
use std::path::PathBuf;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// Directory holding uploaded activity files
    pub media_root: PathBuf,
    /// GCP project ID; without it trips are kept in memory
    pub gcp_project_id: Option<String>,
    /// CMS frontend URL allowed by CORS
    pub frontend_url: String,
    /// Shared secret the CMS sends with publish notifications
    pub publish_hook_token: String,
}

impl Config {
    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            port: 8080,
            media_root: PathBuf::from("media"),
            gcp_project_id: None,
            frontend_url: "http://localhost:5173".to_string(),
            publish_hook_token: "test_publish_token".to_string(),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            media_root: env::var("MEDIA_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("media")),
            gcp_project_id: env::var("GCP_PROJECT_ID")
                .ok()
                .filter(|id| !id.trim().is_empty()),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),

            publish_hook_token: env::var("PUBLISH_HOOK_TOKEN")
                .map(|v| v.trim().to_string())
                .ok()
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing("PUBLISH_HOOK_TOKEN"))?,
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
