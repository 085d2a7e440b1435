//! Command-line arguments and configuration

#[cfg(not(target_arch = "wasm32"))]
pub mod arg;
pub mod config;
