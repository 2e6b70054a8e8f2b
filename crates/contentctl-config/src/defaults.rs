//! Built-in endpoints and configuration file locations.

/// Content management API host.
pub const DEFAULT_API_URL: &str = "https://api.contentful.com";
/// Upload host used for binary payloads.
pub const DEFAULT_UPLOAD_URL: &str = "https://upload.contentful.com";

/// Environment variable naming an explicit configuration file.
pub(crate) const CONFIG_PATH_ENV: &str = "CONTENTCTL_CONFIG_PATH";
/// Directory under the XDG config home holding `config.json`.
pub(crate) const CONFIG_DIR: &str = "contentctl";
pub(crate) const CONFIG_FILE: &str = "config.json";
