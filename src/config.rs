use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Medverify";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default bind address for the HTTP boundary.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8420";

/// Default tracing filter when RUST_LOG is unset.
pub fn default_log_filter() -> String {
    "medverify=info,tower=warn".to_string()
}

/// Get the application data directory
/// ~/Medverify/ on all platforms (user-visible)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Medverify")
}

/// Get the registry database path
pub fn database_path() -> PathBuf {
    app_data_dir().join("registry.db")
}
