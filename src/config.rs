use std::env;
use std::path::PathBuf;

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Tracker CSV file
    /// Default: job_applications.csv in the working directory
    pub tracker_file: PathBuf,

    /// Address the HTTP server binds to
    pub host: String,
    pub port: u16,

    /// Maximum payload size for all requests (in bytes)
    /// Default: 10MB (10 * 1024 * 1024)
    pub max_payload_size: usize,

    /// Directory for the rotating log files
    pub log_dir: PathBuf,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Optional environment variables:
    /// - TRACKER_FILE: path of the tracker CSV file (default: job_applications.csv)
    /// - HOST: bind address (default: 127.0.0.1)
    /// - PORT: bind port (default: 8080)
    /// - MAX_PAYLOAD_SIZE: Maximum request payload size in bytes (default: 10485760 = 10MB)
    /// - LOG_DIR: log directory (default: logs)
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if it exists
        dotenv::dotenv().ok();

        let tracker_file = env::var("TRACKER_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("job_applications.csv"));

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = match env::var("PORT") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| format!("PORT must be a port number, got '{}'", raw))?,
            Err(_) => 8080,
        };

        // Parse MAX_PAYLOAD_SIZE with default fallback
        let max_payload_size = env::var("MAX_PAYLOAD_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10 * 1024 * 1024); // Default: 10MB

        let log_dir = env::var("LOG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("logs"));

        Ok(Config {
            tracker_file,
            host,
            port,
            max_payload_size,
            log_dir,
        })
    }
}
