//! Configuration file discovery and layering.
//!
//! Precedence, highest first: explicit overrides (flags and environment),
//! the JSON configuration file, built-in defaults.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::defaults::{
    CONFIG_DIR, CONFIG_FILE, CONFIG_PATH_ENV, DEFAULT_API_URL, DEFAULT_UPLOAD_URL,
};
use crate::error::{ConfigError, ConfigResult};
use crate::model::{BaseUrls, Settings, SettingsOverrides};

/// On-disk configuration layout.
///
/// ```json
/// {"base_url": {"api": "https://api.contentful.com", "upload": "https://upload.contentful.com"}}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Host overrides.
    #[serde(default)]
    pub base_url: FileBaseUrls,
}

/// `base_url` section of the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileBaseUrls {
    /// API host.
    #[serde(default)]
    pub api: Option<String>,
    /// Upload host.
    #[serde(default)]
    pub upload: Option<String>,
}

impl ConfigFile {
    /// Read the file at `path`. A missing file yields `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file exists but cannot be read and
    /// [`ConfigError::Parse`] when it is not valid JSON.
    pub fn read(path: &Path) -> ConfigResult<Option<Self>> {
        match fs::read_to_string(path) {
            Ok(text) => Self::parse(path, &text).map(Some),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Read the file at `path`, treating a missing file as an error.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] or [`ConfigError::Parse`].
    pub fn read_required(path: &Path) -> ConfigResult<Self> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &text)
    }

    fn parse(path: &Path, text: &str) -> ConfigResult<Self> {
        serde_json::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Locate the configuration file using `lookup` to read environment variables.
///
/// Order: `$CONTENTCTL_CONFIG_PATH`, then `$XDG_CONFIG_HOME/contentctl/config.json`,
/// then `$HOME/.config/contentctl/config.json`. Returns `None` when none of
/// the variables are set.
pub fn resolve_config_path(lookup: impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
    let var = |key: &str| lookup(key).filter(|value| !value.is_empty());
    if let Some(path) = var(CONFIG_PATH_ENV) {
        return Some(PathBuf::from(path));
    }
    let base = var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| var("HOME").map(|home| PathBuf::from(home).join(".config")))?;
    Some(base.join(CONFIG_DIR).join(CONFIG_FILE))
}

/// Layer `overrides` over `file` over the built-in defaults.
///
/// # Errors
///
/// Returns a [`ConfigError`] when a resulting base URL is invalid.
pub fn resolve_settings(
    file: Option<&ConfigFile>,
    overrides: SettingsOverrides,
) -> ConfigResult<Settings> {
    let from_file = file.map(|file| &file.base_url);
    let api = overrides
        .api_url
        .as_deref()
        .or_else(|| from_file.and_then(|urls| urls.api.as_deref()))
        .unwrap_or(DEFAULT_API_URL);
    let upload = overrides
        .upload_url
        .as_deref()
        .or_else(|| from_file.and_then(|urls| urls.upload.as_deref()))
        .unwrap_or(DEFAULT_UPLOAD_URL);

    Ok(Settings {
        base_urls: BaseUrls::parse(api, upload)?,
        credentials: overrides.credentials,
    })
}

/// Load settings for this process.
///
/// An `explicit` path must exist; the discovered default location may be
/// absent, in which case only overrides and defaults apply.
///
/// # Errors
///
/// Returns a [`ConfigError`] for unreadable or malformed files and invalid URLs.
pub fn load_settings(
    explicit: Option<&Path>,
    overrides: SettingsOverrides,
) -> ConfigResult<Settings> {
    let file = match explicit {
        Some(path) => Some(ConfigFile::read_required(path)?),
        None => match resolve_config_path(|key| std::env::var(key).ok()) {
            Some(path) => {
                debug!(path = %path.display(), "looking for configuration file");
                ConfigFile::read(&path)?
            }
            None => None,
        },
    };
    resolve_settings(file.as_ref(), overrides)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Credentials;
    use std::collections::HashMap;
    use std::error::Error;
    use tempfile::TempDir;

    fn env<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        let map: HashMap<&str, &str> = pairs.iter().copied().collect();
        move |key| map.get(key).map(|value| (*value).to_string())
    }

    #[test]
    fn config_path_prefers_explicit_variable() {
        let path = resolve_config_path(env(&[
            ("CONTENTCTL_CONFIG_PATH", "/etc/contentctl.json"),
            ("XDG_CONFIG_HOME", "/xdg"),
            ("HOME", "/home/me"),
        ]));
        assert_eq!(path, Some(PathBuf::from("/etc/contentctl.json")));
    }

    #[test]
    fn config_path_falls_back_to_xdg_then_home() {
        let path = resolve_config_path(env(&[("XDG_CONFIG_HOME", "/xdg"), ("HOME", "/home/me")]));
        assert_eq!(path, Some(PathBuf::from("/xdg/contentctl/config.json")));

        let path = resolve_config_path(env(&[("XDG_CONFIG_HOME", ""), ("HOME", "/home/me")]));
        assert_eq!(
            path,
            Some(PathBuf::from("/home/me/.config/contentctl/config.json"))
        );

        assert_eq!(resolve_config_path(env(&[])), None);
    }

    #[test]
    fn missing_file_reads_as_none() -> Result<(), Box<dyn Error>> {
        let dir = TempDir::new()?;
        assert_eq!(ConfigFile::read(&dir.path().join("absent.json"))?, None);
        assert!(ConfigFile::read_required(&dir.path().join("absent.json")).is_err());
        Ok(())
    }

    #[test]
    fn malformed_file_is_a_parse_error() -> Result<(), Box<dyn Error>> {
        let dir = TempDir::new()?;
        let path = dir.path().join("config.json");
        fs::write(&path, "[base_url]\napi = nope\n")?;
        let err = ConfigFile::read(&path).expect_err("not JSON");
        assert!(matches!(err, ConfigError::Parse { .. }));
        Ok(())
    }

    #[test]
    fn file_values_override_defaults_and_flags_override_file() -> Result<(), Box<dyn Error>> {
        let dir = TempDir::new()?;
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"base_url": {"api": "https://fakeapi", "upload": "https://fakeupload"}}"#,
        )?;
        let file = ConfigFile::read(&path)?;

        let settings = resolve_settings(file.as_ref(), SettingsOverrides::default())?;
        assert_eq!(settings.base_urls.api.as_str(), "https://fakeapi/");
        assert_eq!(settings.base_urls.upload.as_str(), "https://fakeupload/");

        let settings = resolve_settings(
            file.as_ref(),
            SettingsOverrides {
                api_url: Some("http://127.0.0.1:9000".to_string()),
                upload_url: None,
                credentials: Credentials::bearer("token"),
            },
        )?;
        assert_eq!(settings.base_urls.api.as_str(), "http://127.0.0.1:9000/");
        assert_eq!(settings.base_urls.upload.as_str(), "https://fakeupload/");
        assert_eq!(settings.credentials.oauth_token.as_deref(), Some("token"));
        Ok(())
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() -> Result<(), Box<dyn Error>> {
        let file: ConfigFile = serde_json::from_str(r#"{"base_url": {"api": "https://fakeapi"}}"#)?;
        let settings = resolve_settings(Some(&file), SettingsOverrides::default())?;
        assert_eq!(settings.base_urls.upload.as_str(), "https://upload.contentful.com/");
        Ok(())
    }

    #[test]
    fn explicit_path_is_loaded() -> Result<(), Box<dyn Error>> {
        let dir = TempDir::new()?;
        let path = dir.path().join("custom.json");
        fs::write(&path, r#"{"base_url": {"upload": "https://fakeupload"}}"#)?;
        let settings = load_settings(Some(&path), SettingsOverrides::default())?;
        assert_eq!(settings.base_urls.api.as_str(), "https://api.contentful.com/");
        assert_eq!(settings.base_urls.upload.as_str(), "https://fakeupload/");
        Ok(())
    }
}
