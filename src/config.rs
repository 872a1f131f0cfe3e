use std::path::PathBuf;
use std::time::Duration;

/// Application-level constants
pub const APP_NAME: &str = "MedGuard";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable overriding the compliance-service base URL.
pub const API_URL_ENV: &str = "MEDGUARD_API_URL";

/// Default compliance-service endpoint (local backend).
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// How often the live-stats poller re-fetches the snapshot.
pub const STATS_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Timeout for any single remote call. Generous because `/audit` waits on a
/// remote model inference.
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for establishing a connection.
pub const HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Resolve the service base URL: explicit flag wins, then the environment,
/// then the local default.
pub fn resolve_api_url(flag: Option<&str>) -> String {
    if let Some(url) = flag {
        return url.to_string();
    }
    std::env::var(API_URL_ENV).unwrap_or_else(|_| DEFAULT_API_URL.to_string())
}

/// Get the application data directory
/// ~/MedGuard/ on all platforms (user-visible)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("MedGuard")
}

/// Directory CSV report exports are written to.
pub fn exports_dir() -> PathBuf {
    app_data_dir().join("exports")
}

pub fn default_log_filter() -> String {
    format!("{}=info", env!("CARGO_PKG_NAME"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_data_dir_under_home() {
        let dir = app_data_dir();
        let home = dirs::home_dir().unwrap();
        assert!(dir.starts_with(home));
        assert!(dir.ends_with("MedGuard"));
    }

    #[test]
    fn exports_dir_under_app_data() {
        let exports = exports_dir();
        let app = app_data_dir();
        assert!(exports.starts_with(app));
        assert!(exports.ends_with("exports"));
    }

    #[test]
    fn explicit_flag_overrides_environment() {
        assert_eq!(
            resolve_api_url(Some("http://10.0.0.5:8000")),
            "http://10.0.0.5:8000"
        );
    }

    #[test]
    fn poll_interval_is_ten_seconds() {
        assert_eq!(STATS_POLL_INTERVAL, Duration::from_secs(10));
    }
}
