//! Application configuration.
//!
//! Loads settings from config.json at startup. Provides the Gemini API key,
//! model selection, endpoint and output settings.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use crate::analysis::export::DEFAULT_OUTPUT_FILE;
use crate::gemini::GeminiModel;
use crate::gemini::client::DEFAULT_API_BASE;

/// Global configuration instance, initialized once at startup.
static CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// Environment variable consulted when config.json has no API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

const CONFIG_FILE: &str = "config.json";

/// Complete application configuration.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Gemini API key (Google AI Studio). Empty means "not configured".
    pub api_key: String,
    /// Model used when none is given on the command line
    pub model: GeminiModel,
    /// Generative Language API base URL
    pub api_base_url: String,
    /// Per-request timeout for each section call (seconds)
    pub request_timeout_secs: u64,
    /// Output file name, relative to the working directory
    pub output_file: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: GeminiModel::default(),
            api_base_url: DEFAULT_API_BASE.to_string(),
            request_timeout_secs: 120,
            output_file: DEFAULT_OUTPUT_FILE.to_string(),
        }
    }
}

impl AppConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// API key from the command line, then config.json, then the environment.
    pub fn resolve_api_key(&self, cli_key: Option<&str>) -> String {
        self.resolve_api_key_with(cli_key, std::env::var(API_KEY_ENV).ok())
    }

    fn resolve_api_key_with(&self, cli_key: Option<&str>, env_key: Option<String>) -> String {
        [cli_key.map(str::to_string), Some(self.api_key.clone()), env_key]
            .into_iter()
            .flatten()
            .map(|k| k.trim().to_string())
            .find(|k| !k.is_empty())
            .unwrap_or_default()
    }
}

/// Candidate config.json locations: next to the executable, then the user config dir.
fn config_candidates() -> Vec<PathBuf> {
    let mut candidates = vec![crate::paths::get_exe_dir().join(CONFIG_FILE)];
    if let Some(dir) = dirs::config_dir() {
        candidates.push(dir.join("questionnaire-analyzer").join(CONFIG_FILE));
    }
    candidates
}

/// Reads one config file, falling back to defaults on any problem.
pub fn load_config_from(config_path: &Path) -> AppConfig {
    match fs::read_to_string(config_path) {
        Ok(contents) => match serde_json::from_str(&contents) {
            Ok(config) => {
                crate::log(&format!("Config loaded from {}", config_path.display()));
                config
            }
            Err(e) => {
                crate::log(&format!(
                    "Failed to parse {}: {}. Using defaults.",
                    config_path.display(),
                    e
                ));
                AppConfig::default()
            }
        },
        Err(e) => {
            crate::log(&format!(
                "Failed to read {}: {}. Using defaults.",
                config_path.display(),
                e
            ));
            AppConfig::default()
        }
    }
}

/// Loads configuration from the first config.json found, or returns defaults.
fn load_config() -> AppConfig {
    match config_candidates().into_iter().find(|p| p.exists()) {
        Some(path) => load_config_from(&path),
        None => {
            crate::log("config.json not found. Using default config.");
            AppConfig::default()
        }
    }
}

/// Initializes the global configuration. Call once at startup.
pub fn init_config() {
    let _ = CONFIG.set(load_config());
}

/// Returns a reference to the global configuration.
/// Panics if called before init_config().
pub fn get_config() -> &'static AppConfig {
    CONFIG
        .get()
        .expect("Config not initialized. Call init_config() first.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_partial_config_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"model": "gemini-1.5-flash"}"#).unwrap();

        let config = load_config_from(&path);
        assert_eq!(config.model, GeminiModel::Flash15);
        assert_eq!(config.api_base_url, DEFAULT_API_BASE);
        assert_eq!(config.output_file, "questionnaire_analysis.json");
        assert_eq!(config.request_timeout(), Duration::from_secs(120));
    }

    #[test]
    fn test_invalid_config_falls_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"model": "not-a-model"}"#).unwrap();

        let config = load_config_from(&path);
        assert_eq!(config.model, GeminiModel::Pro25);
    }

    #[test]
    fn test_missing_config_falls_back() {
        let dir = tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.json"));
        assert!(config.api_key.is_empty());
    }

    #[test]
    fn test_api_key_precedence() {
        let config = AppConfig {
            api_key: "from-config".to_string(),
            ..AppConfig::default()
        };
        let env = Some("from-env".to_string());

        assert_eq!(config.resolve_api_key_with(Some("from-cli"), env.clone()), "from-cli");
        assert_eq!(config.resolve_api_key_with(None, env.clone()), "from-config");
        assert_eq!(config.resolve_api_key_with(Some("  "), env.clone()), "from-config");

        let empty = AppConfig::default();
        assert_eq!(empty.resolve_api_key_with(None, env), "from-env");
        assert_eq!(empty.resolve_api_key_with(None, None), "");
    }
}
