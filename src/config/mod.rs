//! Configuration module for Meetup-Events
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use meetup_events::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("meetup.toml")).unwrap();
//! println!("Sorting events {:?}", config.output.sort);
//! ```

mod parser;
mod types;
mod validation;

pub use types::{
    Config, GroupConfig, HttpConfig, OutputConfig, DEFAULT_ACCEPT_LANGUAGE, DEFAULT_GROUP_URL,
    DEFAULT_REFERER, DEFAULT_USER_AGENT,
};

pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
