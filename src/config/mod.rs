//! Application Configuration Module
//!
//! Typed configuration loaded from TOML, covering the server, data files,
//! model artifact, LLM provider, validation bounds and chart presentation.
//!
//! ## Loading Order
//!
//! 1. `QUAKE_CONFIG` environment variable (path to TOML file)
//! 2. `quake_grade.toml` in the current working directory
//! 3. Built-in defaults
//!
//! The loaded config is owned by the application context and handed to
//! components explicitly; there is no global accessor.

mod app_config;
pub mod defaults;
pub mod validation;

pub use app_config::*;
