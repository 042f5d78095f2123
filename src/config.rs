use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{env, fs, path::Path, path::PathBuf};
use url::Url;

/// The hosted service this client was written against.
pub const DEFAULT_BASE_URL: &str = "https://hack-or-snooze-v2.herokuapp.com";

const DEFAULT_USER_AGENT: &str = "snooze-client/0.1";
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 20;

/// On-disk shape: every field optional, defaults fill the gaps.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    pub base_url: Option<String>,
    pub user_agent: Option<String>,
    pub connect_timeout_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
}

/// Resolved settings the client is built from.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: Url,
    pub user_agent: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

pub fn load(path_override: Option<PathBuf>) -> Result<ClientConfig> {
    // An explicit path must exist and parse; no silent fallback.
    if let Some(path) = path_override {
        return resolve(read_file(&path)?);
    }

    // Otherwise, try the default config path
    if let Some(path) = default_config_path() {
        if path.is_file() {
            return resolve(read_file(&path)?);
        }
    }

    // Built-in defaults against the hosted service
    resolve(FileConfig::default())
}

fn read_file(path: &Path) -> Result<FileConfig> {
    let txt = fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    toml::from_str(&txt).with_context(|| format!("failed to parse toml: {}", path.display()))
}

fn resolve(file: FileConfig) -> Result<ClientConfig> {
    let raw = file.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    let base_url = Url::parse(&raw).with_context(|| format!("invalid base_url: {raw}"))?;
    if !matches!(base_url.scheme(), "http" | "https") {
        bail!("base_url must be http or https: {raw}");
    }
    Ok(ClientConfig {
        base_url,
        user_agent: file
            .user_agent
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
        connect_timeout: Duration::from_secs(
            file.connect_timeout_secs
                .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
        ),
        request_timeout: Duration::from_secs(
            file.request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        ),
    })
}

fn default_config_path() -> Option<PathBuf> {
    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        let mut p = PathBuf::from(xdg);
        p.push("snooze-client");
        p.push("config.toml");
        return Some(p);
    }
    if let Ok(home) = env::var("HOME") {
        let mut p = PathBuf::from(home);
        p.push(".config");
        p.push("snooze-client");
        p.push("config.toml");
        return Some(p);
    }
    None
}
