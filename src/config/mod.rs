// src/config/mod.rs

//! Configuration loading and validation for screenrun.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Turn the raw model into a validated `ConfigFile` (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_config, load_from_path};
pub use model::{
    ConfigFile, PathsConfig, RawConfigFile, RawPathsSection, RawRemoteSection, RemoteSettings,
};
pub use validate::parse_duration;
