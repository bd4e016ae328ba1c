//! API configuration.

use std::path::PathBuf;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Max request body size. Uploads are whole videos, so this is large.
    pub max_body_size: usize,
    /// Data root; the video library, report store, cache and workspace
    /// record live in subdirectories of it.
    pub data_dir: PathBuf,
    /// Environment (development/production)
    pub environment: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec!["*".to_string()],
            max_body_size: 2 * 1024 * 1024 * 1024, // 2GB
            data_dir: PathBuf::from("./data"),
            environment: "development".to_string(),
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("API_HOST").unwrap_or(defaults.host),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(defaults.cors_origins),
            max_body_size: std::env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_body_size),
            data_dir: std::env::var("VMARK_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            environment: std::env::var("ENVIRONMENT").unwrap_or(defaults.environment),
        }
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        self.environment.to_lowercase() == "production"
    }

    /// Directory uploaded videos are stored in.
    pub fn media_dir(&self) -> PathBuf {
        self.data_dir.join("media")
    }

    /// Directory finished reports are written to.
    pub fn reports_dir(&self) -> PathBuf {
        self.data_dir.join("reports")
    }

    /// Directory of content-hash cache entries.
    pub fn cache_dir(&self) -> PathBuf {
        self.data_dir.join("cache")
    }

    /// Path of the persisted workspace record.
    pub fn workspace_path(&self) -> PathBuf {
        self.data_dir.join("workspace.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.port, 8000);
        assert!(!config.is_production());
        assert_eq!(config.media_dir(), PathBuf::from("./data/media"));
        assert_eq!(config.workspace_path(), PathBuf::from("./data/workspace.json"));
    }
}
