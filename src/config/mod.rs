#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::{CliConfig, Command};
pub use toml_config::DispatchConfig;

/// Development dataset shipped with the repository.
pub const DEFAULT_DATA_DIR: &str = "./support";
