//! Shared configuration for the JobGrid client crates.

pub mod config;

pub use config::{Config, ConfigError, ServiceConfig};
