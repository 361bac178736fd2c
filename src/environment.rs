use std::env;
use std::str::FromStr;

use tracing::warn;

const DEFAULT_LOG_DIR: &str = "logs";

/// Retrieves an environment variable and splits it into a vector of strings based on a delimiter.
///
/// # Arguments
/// - `var`: The name of the environment variable.
/// - `delimiter`: The character to split the environment variable's value by.
///
/// # Returns
/// - `Vec<String>`, with empty entries dropped
pub fn get_env_var_as_vec(var: &str, delimiter: char) -> Vec<String> {
    env::var(var)
        .unwrap_or_default()
        .split(delimiter)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Parses `var`, falling back to `default` when it is unset or unreadable.
fn get_env_var_or<T>(var: &str, default: T) -> T
where
    T: FromStr + std::fmt::Debug,
{
    match env::var(var) {
        Ok(value) if !value.trim().is_empty() => value.trim().parse().unwrap_or_else(|_| {
            warn!("Invalid value {:?} for {}, using default {:?}", value, var, default);
            default
        }),
        _ => default,
    }
}

/// Reads `var` as text, treating an unset or blank value as `default`.
fn get_env_var_or_string(var: &str, default: &str) -> String {
    env::var(var)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// The rolling log directory. Read on its own so logging can be installed
/// before `Settings::from_env` reports bad values.
pub fn log_dir_from_env() -> String {
    get_env_var_or_string("LOG_DIR", DEFAULT_LOG_DIR)
}

/// Runtime configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_path: String,
    pub port: u16,
    pub page_size: usize,
    pub admin_page_size: usize,
    pub refresh_interval_secs: u64,
    pub search_limit: i64,
    /// Accepted admin bearer tokens (comma separated `ADMIN_TOKEN`). Admin
    /// routes are disabled when empty.
    pub admin_tokens: Vec<String>,
    pub log_dir: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            database_path: "newsroom.db".to_string(),
            port: 8080,
            page_size: 12,
            admin_page_size: 20,
            refresh_interval_secs: 30,
            search_limit: 10,
            admin_tokens: Vec::new(),
            log_dir: DEFAULT_LOG_DIR.to_string(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        let defaults = Settings::default();
        Settings {
            database_path: env::var("DATABASE_PATH").unwrap_or(defaults.database_path),
            port: get_env_var_or("PORT", defaults.port),
            page_size: get_env_var_or("PAGE_SIZE", defaults.page_size).max(1),
            admin_page_size: get_env_var_or("ADMIN_PAGE_SIZE", defaults.admin_page_size).max(1),
            refresh_interval_secs: get_env_var_or(
                "REFRESH_INTERVAL_SECS",
                defaults.refresh_interval_secs,
            )
            .max(1),
            search_limit: get_env_var_or("SEARCH_LIMIT", defaults.search_limit).max(1),
            admin_tokens: get_env_var_as_vec("ADMIN_TOKEN", ','),
            log_dir: log_dir_from_env(),
        }
    }

    pub fn admin_enabled(&self) -> bool {
        !self.admin_tokens.is_empty()
    }
}
