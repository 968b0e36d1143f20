//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument
//! parsing and configuration.

use clap::{Parser, ValueEnum};

use crate::config::constants::DEFAULT_USER_AGENT;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to
/// most verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// Controls how log messages are formatted:
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Library configuration (no CLI dependencies).
///
/// This is the core configuration struct used by the library. It can be
/// constructed programmatically without any CLI dependencies.
///
/// # Examples
///
/// ```no_run
/// use cspscan::Config;
///
/// let config = Config {
///     url: "https://example.com/".to_string(),
///     level: Some(2),
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// URL or local HTML file path to derive a policy for
    pub url: String,

    /// Root used to resolve relative references.
    ///
    /// Defaults to the directory containing the input when the input is a
    /// local file path.
    pub root: Option<String>,

    /// Seed policy text, used only when no existing (or no surviving)
    /// policy is found on the document
    pub include: Option<String>,

    /// Discard meta/header-delivered policy declarations before synthesis
    pub ignore_existing: bool,

    /// Validate the existing policy instead of emitting a derived one
    pub validate: bool,

    /// Reflow emitted policies into bounded-width, indented text
    pub pretty: bool,

    /// Target CSP level (1, 2 or 3).
    ///
    /// `None` lets the analysis pick a level covering the broadest browser
    /// support. Level 2 and up computes full resource paths for a fixed set
    /// of directives; level 3 suppresses the unstable-keyword advisory.
    pub level: Option<u8>,

    /// HTTP User-Agent header value, forwarded opaquely to the crawler
    pub user_agent: String,

    /// Per-request timeout in seconds
    pub timeout_seconds: u64,

    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: String::new(),
            root: None,
            include: None,
            ignore_existing: false,
            validate: false,
            pretty: false,
            level: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_seconds: 10,
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
        }
    }
}

/// Command-line options.
///
/// This struct is automatically generated by `clap` from the field
/// attributes. All options have sensible defaults and can be overridden via
/// command-line flags.
///
/// # Examples
///
/// ```bash
/// # Derive a policy for a page
/// cspscan https://example.com/
///
/// # Validate the policy that is already on the page
/// cspscan https://example.com/ --validate
///
/// # Start from a hand-written seed instead of default-src 'none'
/// cspscan index.html --include "script-src 'self'; object-src 'none'"
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "cspscan",
    about = "Derives and validates a Content-Security-Policy for a web page."
)]
pub struct Opt {
    /// URL or path to an HTML file
    #[arg(value_parser)]
    pub url: String,

    /// Root used to resolve relative references (defaults to the directory
    /// containing a local input file)
    #[arg(long)]
    pub root: Option<String>,

    /// Seed policy used when no existing policy is found
    #[arg(long)]
    pub include: Option<String>,

    /// Discard existing meta/header policies before deriving
    #[arg(long)]
    pub ignore_existing: bool,

    /// Report missing directive coverage instead of emitting a policy
    #[arg(long)]
    pub validate: bool,

    /// Reflow the emitted policy into indented, width-bounded text
    #[arg(long)]
    pub pretty: bool,

    /// Target CSP level (1, 2 or 3); defaults to broadest browser support
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=3))]
    pub level: Option<u8>,

    /// HTTP User-Agent header value
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 10)]
    pub timeout_seconds: u64,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

impl From<Opt> for Config {
    fn from(opt: Opt) -> Self {
        Config {
            url: opt.url,
            root: opt.root,
            include: opt.include,
            ignore_existing: opt.ignore_existing,
            validate: opt.validate,
            pretty: opt.pretty,
            level: opt.level,
            user_agent: opt.user_agent,
            timeout_seconds: opt.timeout_seconds,
            log_level: opt.log_level,
            log_format: opt.log_format,
        }
    }
}
