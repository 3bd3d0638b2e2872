//! Configuration module for threadsift
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, with built-in defaults matching the hosted sources' tolerances.
//!
//! # Example
//!
//! ```no_run
//! use threadsift::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Base delay: {}ms", config.fetch.base_delay_ms);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlConfig, FetchConfig, SourceConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};

// Re-export validation entry point
pub use validation::validate;
