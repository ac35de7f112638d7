use crate::error::{AppError, Result};
use hls_adfilter::AdFilterConfig;
use playback_loader::LoaderConfig;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub ad_filter: AdFilterConfig,
    pub loader: LoaderSettings,
}

/// HTTP settings for fetching remote playlists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderSettings {
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub user_agent: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub max_retries: u32,
    pub filter_ads: bool,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        let defaults = LoaderConfig::default();
        Self {
            timeout_secs: defaults.timeout.as_secs(),
            connect_timeout_secs: defaults.connect_timeout.as_secs(),
            user_agent: None,
            headers: BTreeMap::new(),
            max_retries: defaults.retry.playlist_retries,
            filter_ads: defaults.filter_ads,
        }
    }
}

impl AppConfig {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("player").join("config.toml"))
    }

    /// Loads `path`, or the default location when none is given. A missing
    /// default file yields the defaults; a missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) if path.is_file() => path,
                _ => {
                    debug!("No configuration file, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        let content = std::fs::read_to_string(&path).map_err(|e| {
            AppError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        let config = toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("invalid {}: {e}", path.display())))?;
        debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    pub fn loader_config(&self) -> Result<LoaderConfig> {
        let mut headers = HeaderMap::new();
        for (name, value) in &self.loader.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| AppError::Config(format!("invalid header name `{name}`: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| AppError::Config(format!("invalid value for `{name}`: {e}")))?;
            headers.insert(name, value);
        }

        let mut config = LoaderConfig {
            timeout: Duration::from_secs(self.loader.timeout_secs),
            connect_timeout: Duration::from_secs(self.loader.connect_timeout_secs),
            filter_ads: self.loader.filter_ads,
            ad_filter: self.ad_filter.clone(),
            ..LoaderConfig::default()
        }
        .with_headers(headers);
        config.retry.playlist_retries = self.loader.max_retries;
        if let Some(user_agent) = &self.loader.user_agent {
            config.user_agent = user_agent.clone();
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[ad_filter]\nforeign_max_secs = 45.0\n\n[loader]\nmax_retries = 1\n\n[loader.headers]\nreferer = \"https://watch.example.com/\""
        )
        .unwrap();

        let config = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.ad_filter.foreign_max_secs, 45.0);
        assert_eq!(config.ad_filter.preroll_max_secs, 35.0);
        assert_eq!(config.loader.max_retries, 1);
        assert!(config.loader.filter_ads);

        let loader = config.loader_config().unwrap();
        assert_eq!(loader.retry.playlist_retries, 1);
        assert_eq!(loader.headers.get("referer").unwrap(), "https://watch.example.com/");
        assert_eq!(loader.ad_filter.foreign_max_secs, 45.0);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppConfig::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn invalid_header_is_reported() {
        let mut config = AppConfig::default();
        config
            .loader
            .headers
            .insert("bad header".to_string(), "x".to_string());
        assert!(matches!(config.loader_config(), Err(AppError::Config(_))));
    }
}
