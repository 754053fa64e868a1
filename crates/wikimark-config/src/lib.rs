pub mod config;
pub mod error;
pub mod sources;
pub mod templates;

pub use config::{Config, PluginsConfig};
pub use error::ConfigError;
pub use sources::{FileTokenSource, FileWhitelistSource};
