//! Configuration module for Strongs-Graph
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! The `[recipe]` table holds the immutable settings of one crawl run.
//!
//! # Example
//!
//! ```no_run
//! use strongs_graph::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("strongs.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.recipe.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{AliasMode, Config, LinkType, OutputConfig, Recipe, SourceConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate_recipe;
