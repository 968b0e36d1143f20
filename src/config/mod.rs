//! Configuration module.
//!
//! Provides the library [`Config`], the clap-derived CLI [`Opt`], and
//! application-wide constants.

pub mod constants;
pub mod types;

pub use constants::*;
pub use types::{Config, LogFormat, LogLevel, Opt};
