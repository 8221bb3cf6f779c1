//! Core types shared across Plugix.

pub mod config;

pub use config::{CatalogConfig, Config, ConfigError, FeaturesConfig, McpConfig};
