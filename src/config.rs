use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://www.kinopoisk.ru";
pub const DEFAULT_OUTPUT: &str = "kinopoisk_ratings.csv";

/// Everything a run needs, from a TOML file, environment variables, or
/// command-line flags. See `resolve_config` in the binary for how the
/// three sources layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub cookies: String,
    #[serde(default = "default_output")]
    pub output: PathBuf,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_id: String::new(),
            cookies: String::new(),
            output: default_output(),
            base_url: default_base_url(),
        }
    }
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Reject configurations that cannot produce a meaningful run.
    pub fn validate(&self) -> Result<()> {
        if self.user_id.trim().is_empty() {
            anyhow::bail!("no user id given (set user_id, --user-id, or KINOPOISK_USER_ID)");
        }
        if self.cookies.trim().is_empty() {
            anyhow::bail!(
                "no session cookies given (set cookies, --cookies, --cookies-file, \
                 or KINOPOISK_COOKIES); ratings pages require an authenticated session"
            );
        }
        Url::parse(&self.base_url)
            .with_context(|| format!("Invalid base URL: {}", self.base_url))?;
        Ok(())
    }
}

fn default_output() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT)
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config: Config = toml::from_str(
            r#"
            user_id = "123456"
            cookies = "uid=abc; session=def"
            output = "my_ratings.csv"
            base_url = "https://kinopoisk.example"
            "#,
        )
        .unwrap();

        assert_eq!(config.user_id, "123456");
        assert_eq!(config.cookies, "uid=abc; session=def");
        assert_eq!(config.output, PathBuf::from("my_ratings.csv"));
        assert_eq!(config.base_url, "https://kinopoisk.example");
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: Config = toml::from_str(r#"user_id = "123456""#).unwrap();

        assert_eq!(config.cookies, "");
        assert_eq!(config.output, PathBuf::from(DEFAULT_OUTPUT));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_validate_requires_user_id() {
        let config = Config {
            cookies: "uid=abc".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_requires_cookies() {
        let config = Config {
            user_id: "123456".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_base_url() {
        let config = Config {
            user_id: "123456".to_string(),
            cookies: "uid=abc".to_string(),
            base_url: "not a url".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_complete_config() {
        let config = Config {
            user_id: "123456".to_string(),
            cookies: "uid=abc".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_ok());
    }
}
