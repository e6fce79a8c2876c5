// File: ./src/config.rs
// Handles configuration loading, environment overrides, and defaults.
use crate::context::AppContext;
use anyhow::Result;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::fs;

pub const DEFAULT_TODOIST_URL: &str = "https://api.todoist.com/rest/v2";

fn default_todoist_url() -> String {
    DEFAULT_TODOIST_URL.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// CalDAV server (or principal) URL.
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub allow_insecure_certs: bool,

    #[serde(default)]
    pub todoist_token: String,
    #[serde(default = "default_todoist_url")]
    pub todoist_url: String,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: String::new(),
            username: String::new(),
            password: String::new(),
            allow_insecure_certs: false,
            todoist_token: String::new(),
            todoist_url: default_todoist_url(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load the configuration from disk using an explicit context.
    /// A missing file yields the defaults; unreadable or invalid files are errors.
    pub fn load(ctx: &dyn AppContext) -> Result<Self> {
        let path = ctx.get_config_file_path()?;

        if !path.exists() {
            log::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path).map_err(|e| {
            anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e)
        })?;

        let config: Config = toml::from_str(&contents).map_err(|e| {
            anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e)
        })?;

        Ok(config)
    }

    /// File values overridden by the process environment, then validated.
    pub fn resolve(ctx: &dyn AppContext) -> Result<Self> {
        let mut config = Self::load(ctx)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Applies `CALDAV_*` / `TODOIST_*` overrides from `lookup`. Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let fields: [(&str, &mut String); 5] = [
            ("CALDAV_URL", &mut self.url),
            ("CALDAV_USERNAME", &mut self.username),
            ("CALDAV_PASSWORD", &mut self.password),
            ("TODOIST_API_TOKEN", &mut self.todoist_token),
            ("TODOIST_API_URL", &mut self.todoist_url),
        ];
        for (key, field) in fields {
            if let Some(value) = lookup(key).filter(|v| !v.is_empty()) {
                *field = value;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.is_empty() {
            anyhow::bail!("No CalDAV url configured (set `url` or CALDAV_URL)");
        }
        if self.todoist_token.is_empty() {
            anyhow::bail!("No Todoist token configured (set `todoist_token` or TODOIST_API_TOKEN)");
        }
        Ok(())
    }

    pub fn level_filter(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::Info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::TestContext;
    use std::collections::HashMap;

    #[test]
    fn test_missing_file_gives_defaults() {
        let ctx = TestContext::new();
        let config = Config::load(&ctx).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.todoist_url, DEFAULT_TODOIST_URL);
    }

    #[test]
    fn test_load_from_toml() {
        let ctx = TestContext::new();
        let path = ctx.get_config_file_path().unwrap();
        fs::write(
            &path,
            r#"
url = "https://dav.example.com/user/"
username = "alice"
password = "secret"
todoist_token = "abc"
log_level = "debug"
"#,
        )
        .unwrap();

        let config = Config::load(&ctx).unwrap();
        assert_eq!(config.url, "https://dav.example.com/user/");
        assert_eq!(config.username, "alice");
        assert_eq!(config.todoist_token, "abc");
        assert_eq!(config.todoist_url, DEFAULT_TODOIST_URL);
        assert!(!config.allow_insecure_certs);
        assert_eq!(config.level_filter(), LevelFilter::Debug);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let ctx = TestContext::new();
        let path = ctx.get_config_file_path().unwrap();
        fs::write(&path, "url = [").unwrap();
        let err = Config::load(&ctx).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_env_overrides_win_over_file() {
        let mut config = Config {
            url: "https://file.example.com/".to_string(),
            todoist_token: "from-file".to_string(),
            ..Config::default()
        };
        let env: HashMap<&str, &str> = [
            ("TODOIST_API_TOKEN", "from-env"),
            ("CALDAV_PASSWORD", "pw"),
            ("CALDAV_URL", ""),
        ]
        .into_iter()
        .collect();

        config.apply_overrides(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.todoist_token, "from-env");
        assert_eq!(config.password, "pw");
        // Empty values do not clobber the file.
        assert_eq!(config.url, "https://file.example.com/");
    }

    #[test]
    fn test_validate_requires_url_and_token() {
        let mut config = Config::default();
        assert!(config.validate().is_err());
        config.url = "https://dav.example.com/".to_string();
        assert!(config.validate().is_err());
        config.todoist_token = "t".to_string();
        assert!(config.validate().is_ok());
    }
}
