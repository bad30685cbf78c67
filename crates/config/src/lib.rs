use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "dzfp-client";
const KEYCHAIN_SERVICE: &str = "dzfp.credentials";

/// Test environment of the Shanghai DZFP platform.
pub const DEFAULT_ENDPOINT: &str = "http://fw1test.shdzfp.com:9000/sajt-shdzfp-sl-http/SvrServlet";

pub const SHARED_KEY_ENV: &str = "DZFP_SHARED_KEY";
pub const SHARED_KEY_SECRET: &str = "shared_key";
pub const PASSWORD_ENV: &str = "DZFP_PASSWORD";
pub const PASSWORD_SECRET: &str = "password";
pub const REGISTRATION_CODE_ENV: &str = "DZFP_REGISTRATION_CODE";
pub const REGISTRATION_CODE_SECRET: &str = "registration_code";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub identity: IdentityConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
            identity: IdentityConfig::default(),
        }
    }
}

/// Non-secret `globalInfo` fields assigned by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityConfig {
    #[serde(default = "default_terminal_code")]
    pub terminal_code: String,
    #[serde(default = "default_app_id")]
    pub app_id: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub taxpayer_id: String,
    #[serde(default)]
    pub authorization_code: String,
    #[serde(default)]
    pub request_code: String,
    #[serde(default)]
    pub response_code: String,
    /// Defaults to `user_name` when unset.
    pub platform_code: Option<String>,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            terminal_code: default_terminal_code(),
            app_id: default_app_id(),
            user_name: String::new(),
            taxpayer_id: String::new(),
            authorization_code: String::new(),
            request_code: String::new(),
            response_code: String::new(),
            platform_code: None,
        }
    }
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_terminal_code() -> String {
    "0".to_string()
}

fn default_app_id() -> String {
    "ZZS_PT_DZFP".to_string()
}

/// Location of the stored config in the platform config directory.
pub fn config_path() -> Result<PathBuf> {
    confy::get_configuration_file_path(APP_NAME, None).context("Failed to locate app config")
}

pub fn load() -> Result<AppConfig> {
    load_path(&config_path()?)
}

/// Load the config at `path`, writing defaults there when it does not exist.
pub fn load_path(path: &Path) -> Result<AppConfig> {
    let cfg: AppConfig = confy::load_path(path)
        .with_context(|| format!("Failed to load app config from {}", path.display()))?;
    Ok(cfg)
}

/// Secret stored under the client's keychain service.
pub fn get_secret(key: &str) -> Result<String> {
    let entry = keyring::Entry::new(KEYCHAIN_SERVICE, key)?;
    let password = entry.get_password()?;
    Ok(password)
}

/// Environment first, then the keychain. Empty values count as missing.
pub fn resolve_secret(env_var: &str, keychain_key: &str) -> Result<String> {
    resolve_with(env_var, keychain_key, |var| std::env::var(var).ok(), get_secret)
}

fn resolve_with(
    env_var: &str,
    keychain_key: &str,
    env: impl Fn(&str) -> Option<String>,
    keychain: impl Fn(&str) -> Result<String>,
) -> Result<String> {
    if let Some(value) = env(env_var).filter(|v| !v.is_empty()) {
        return Ok(value);
    }
    keychain(keychain_key)
        .ok()
        .filter(|v| !v.is_empty())
        .with_context(|| format!("{env_var} is not set and no '{keychain_key}' secret is stored"))
}
