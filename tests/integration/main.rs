// tests/integration/main.rs

#[path = "../common/mod.rs"]
mod common;

mod config_loading;
mod plugin_store;
mod remote_channel;
mod service;
