#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    unreachable_pub,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

//! Runtime settings for the content management client.
//!
//! Layout: `defaults.rs` (built-in endpoints and file locations), `model.rs`
//! (typed settings), `loader.rs` (config file discovery and layering).

mod defaults;
pub mod error;
pub mod loader;
pub mod model;

pub use defaults::{DEFAULT_API_URL, DEFAULT_UPLOAD_URL};
pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigFile, FileBaseUrls, load_settings, resolve_config_path, resolve_settings};
pub use model::{BaseUrls, Credentials, Settings, SettingsOverrides};
