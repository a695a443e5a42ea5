//! Configuration file support
//!
//! Loads optional settings from ~/.parley/config.toml. Command line flags
//! and environment variables win over the file; built-in defaults come last.

use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_SERVER_URL: &str = "http://localhost:3000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Configuration for parley
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Gemini API key
    pub gemini_api_key: Option<String>,

    /// Gemini REST base URL (without trailing `/models`)
    pub gemini_base_url: Option<String>,

    /// Candidate models, tried in order
    pub models: Option<Vec<String>>,

    /// Bind address for `serve`
    pub host: Option<String>,

    /// Port for `serve`
    pub port: Option<u16>,

    /// Supabase project URL for the message log
    pub supabase_url: Option<String>,

    /// Supabase anon or service key
    pub supabase_key: Option<String>,

    /// Whole-request timeout for model calls, in seconds
    pub request_timeout_secs: Option<u64>,

    /// Server the `chat` REPL talks to
    pub server_url: Option<String>,

    /// Where the REPL writes generated images
    pub image_dir: Option<String>,
}

impl Config {
    /// Load config from ~/.parley/config.toml
    pub fn load() -> Self {
        Self::load_from(&config_path())
    }

    /// Load config from an explicit path. A missing or unreadable file
    /// yields the empty config.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Warning: Failed to parse {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("Warning: Failed to read {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}

/// Get the config file path
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// ~/.parley
pub fn config_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_default().join(".parley")
}

/// CLI/env value, else file value, else default
pub fn resolve<T>(cli: Option<T>, file: Option<T>, default: T) -> T {
    cli.or(file).unwrap_or(default)
}

/// Like [`resolve`] but the result may legitimately be absent
pub fn resolve_opt<T>(cli: Option<T>, file: Option<T>) -> Option<T> {
    cli.or(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.gemini_api_key.is_none());
        assert!(config.models.is_none());
    }

    #[test]
    fn test_config_path() {
        let path = config_path();
        assert!(path.to_string_lossy().contains(".parley"));
        assert!(path.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
gemini_api_key = "file-key"
models = ["gemini-pro"]
port = 8080
request_timeout_secs = 30
"#
        )
        .unwrap();

        let config = Config::load_from(file.path());
        assert_eq!(config.gemini_api_key.as_deref(), Some("file-key"));
        assert_eq!(config.models, Some(vec!["gemini-pro".to_string()]));
        assert_eq!(config.port, Some(8080));
        assert_eq!(config.request_timeout_secs, Some(30));
        assert!(config.supabase_url.is_none());
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nope.toml"));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_invalid_file_is_default() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "port = \"not a number").unwrap();
        assert_eq!(Config::load_from(file.path()), Config::default());
    }

    #[test]
    fn test_resolution_precedence() {
        assert_eq!(resolve(Some(1u16), Some(2), 3), 1);
        assert_eq!(resolve(None, Some(2u16), 3), 2);
        assert_eq!(resolve(None, None, 3u16), 3);

        assert_eq!(resolve_opt(Some("cli"), Some("file")), Some("cli"));
        assert_eq!(resolve_opt(None, Some("file")), Some("file"));
        assert_eq!(resolve_opt::<&str>(None, None), None);
    }
}
