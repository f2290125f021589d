use serde::Deserialize;
use std::time::Duration;

use crate::services::similarity::SUGGESTION_SIMILARITY_THRESHOLD;

/// Client configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Base URL of the movie library backend
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Path of the tag listing endpoint, relative to `api_base_url`
    #[serde(default = "default_tags_path")]
    pub tags_path: String,

    /// Session cookie sent with every request (`name=value`)
    #[serde(default)]
    pub session_cookie: Option<String>,

    /// Minimum normalized similarity for two tag names to count as duplicates
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,

    /// Quiet period before a keystroke burst triggers a suggestion request
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_api_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_tags_path() -> String {
    "/api/tags".to_string()
}

fn default_similarity_threshold() -> f64 {
    SUGGESTION_SIMILARITY_THRESHOLD
}

fn default_debounce_ms() -> u64 {
    150
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            tags_path: default_tags_path(),
            session_cookie: None,
            similarity_threshold: default_similarity_threshold(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = envy::from_env::<Config>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

        if !(0.0..=1.0).contains(&config.similarity_threshold) {
            anyhow::bail!(
                "similarity_threshold must be within 0.0..=1.0, got {}",
                config.similarity_threshold
            );
        }

        Ok(config)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
