use crate::config::types::Config;
use crate::config::validation::validate;
use crate::{ConfigError, ConfigResult};
use sha2::{Digest, Sha256};
use std::path::Path;

/// Environment variable overriding `storage.database-path`
pub const ENV_DATABASE_PATH: &str = "HARVEST_DATABASE_PATH";
/// Environment variable overriding `storage.staging-path`
pub const ENV_STAGING_PATH: &str = "HARVEST_STAGING_PATH";
/// Environment variable overriding `listing.base-url`
pub const ENV_BASE_URL: &str = "HARVEST_BASE_URL";

/// Loads and parses a configuration file from the given path
///
/// Environment overrides are applied before validation, so an overridden
/// value is checked the same way as one read from the file.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use discount_harvest::config::load_config;
///
/// let config = load_config(Path::new("harvest.toml")).unwrap();
/// println!("Max pages: {}", config.listing.max_pages);
/// ```
pub fn load_config(path: &Path) -> ConfigResult<Config> {
    let content = std::fs::read_to_string(path)?;
    let mut config = parse_config(&content)?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate(&config)?;
    Ok(config)
}

/// Parses configuration from TOML text without validating it
pub fn parse_config(content: &str) -> ConfigResult<Config> {
    Ok(toml::from_str(content)?)
}

/// Applies environment overrides through the given lookup
///
/// Taking the lookup as a closure keeps tests off the process environment.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = lookup(ENV_DATABASE_PATH) {
        tracing::debug!("{} overrides database path", ENV_DATABASE_PATH);
        config.storage.database_path = path;
    }
    if let Some(path) = lookup(ENV_STAGING_PATH) {
        tracing::debug!("{} overrides staging path", ENV_STAGING_PATH);
        config.storage.staging_path = path;
    }
    if let Some(url) = lookup(ENV_BASE_URL) {
        tracing::debug!("{} overrides listing base URL", ENV_BASE_URL);
        config.listing.base_url = url;
    }
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at the start of each run so staged snapshots can be tied back to
/// the settings that produced them.
pub fn compute_config_hash(path: &Path) -> ConfigResult<String> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> ConfigResult<(Config, String)> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}
