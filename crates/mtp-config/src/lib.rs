//! MTP link configuration management
//!
//! This crate provides configuration loading and parsing for the signalling link:
//! - TOML configuration file parsing
//! - Stack configuration structures
//! - Shared runtime state

pub mod stack_config;
pub mod toml_config;

pub use stack_config::*;
pub use toml_config::*;
