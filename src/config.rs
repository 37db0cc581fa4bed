use std::path::{Path, PathBuf};

use crate::errors::UpdateError;

pub const SOURCE_URL: &str = "https://example.com/api/data.json";
pub const REQUEST_TIMEOUT_SECS: u64 = 15;
pub const TOKEN_TTL_SECS: u64 = 86400; // 24 hours
pub const TOKEN_SIGNATURE: &str = "588f526d861adadd2c4afd858b96e0549bce537640ea7d0920da8f0af510a1f9";
pub const COOKIE_NAME: &str = "__hdnea__";
pub const TARGET_KEY: &str = "#EXTHTTP";
pub const COOKIE_FIELD: &str = "cookie";
pub const OUTPUT_RELATIVE_PATH: &str = "../data/playlist.json"; // relative to the base dir
pub const REPO_RELATIVE_PATH: &str = "../";

/// Settings for a single refresh run. Built once at startup, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub source_url: String,
    pub output_path: PathBuf,
    pub repo_root: PathBuf,
    pub request_timeout_secs: u64,
    pub token_ttl_secs: u64,
    pub signature: String,
    /// `None` writes the bare token as the cookie value.
    pub cookie_name: Option<String>,
    pub target_key: String,
    pub cookie_field: String,
    pub strict_staging: bool,
}

impl Config {
    pub fn from_base_dir(base: &Path) -> Self {
        Self {
            source_url: SOURCE_URL.to_string(),
            output_path: base.join(OUTPUT_RELATIVE_PATH),
            repo_root: base.join(REPO_RELATIVE_PATH),
            request_timeout_secs: REQUEST_TIMEOUT_SECS,
            token_ttl_secs: TOKEN_TTL_SECS,
            signature: TOKEN_SIGNATURE.to_string(),
            cookie_name: Some(COOKIE_NAME.to_string()),
            target_key: TARGET_KEY.to_string(),
            cookie_field: COOKIE_FIELD.to_string(),
            strict_staging: false,
        }
    }

    pub fn validate(&self) -> Result<(), UpdateError> {
        if self.source_url.trim().is_empty() {
            return Err(UpdateError::Config("source URL must not be empty".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(UpdateError::Config("request timeout must be greater than zero".to_string()));
        }
        if self.token_ttl_secs == 0 {
            return Err(UpdateError::Config("token lifetime must be greater than zero".to_string()));
        }
        if self.target_key.is_empty() || self.cookie_field.is_empty() {
            return Err(UpdateError::Config("target key and cookie field must be set".to_string()));
        }
        Ok(())
    }
}

/// Directory holding the running executable, falling back to the working directory.
pub fn default_base_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}
