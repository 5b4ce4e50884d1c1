use std::env;
use std::time::Duration;

use reqwest::Url;

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Base URL of the jobs REST backend
    /// Format: http://HOST:PORT (the `/jobs` routes are appended)
    pub api_url: String,

    /// Timeout applied to every request to the backend
    /// Default: 30 seconds
    pub request_timeout: Duration,

    /// Largest import file accepted (in bytes)
    /// Default: 10MB (10 * 1024 * 1024)
    pub max_import_size: usize,

    /// Directory for the rotating log files
    pub log_dir: String,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Optional environment variables:
    /// - JOBS_API_URL: backend base URL (default: http://localhost:8000)
    /// - REQUEST_TIMEOUT_SECS: per-request timeout in seconds (default: 30)
    /// - MAX_IMPORT_SIZE: largest accepted import file in bytes (default: 10485760 = 10MB)
    /// - LOG_DIR: log directory (default: logs)
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if it exists
        dotenv::dotenv().ok();

        let api_url = env::var("JOBS_API_URL").unwrap_or_else(|_| "http://localhost:8000".to_string());
        Self::check_url(&api_url)?;

        let request_timeout = env::var("REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(30));

        let max_import_size = env::var("MAX_IMPORT_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10 * 1024 * 1024); // Default: 10MB

        let log_dir = env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string());

        Ok(Config {
            api_url,
            request_timeout,
            max_import_size,
            log_dir,
        })
    }

    /// Replace the backend URL, e.g. from a command-line flag
    pub fn with_api_url(mut self, api_url: String) -> Result<Self, String> {
        Self::check_url(&api_url)?;
        self.api_url = api_url;
        Ok(self)
    }

    fn check_url(api_url: &str) -> Result<(), String> {
        Url::parse(api_url)
            .map(|_| ())
            .map_err(|e| format!("JOBS_API_URL '{}' is not a valid URL: {}", api_url, e))
    }
}
