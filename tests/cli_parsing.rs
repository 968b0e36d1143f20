//! Tests for CLI argument parsing.

use clap::Parser;
use cspscan::{Config, LogFormat, LogLevel, Opt};

#[test]
fn test_cli_minimal_invocation() {
    let opt = Opt::try_parse_from(["cspscan", "https://example.com/"]).expect("should parse");

    assert_eq!(opt.url, "https://example.com/");
    assert!(!opt.validate);
    assert!(!opt.pretty);
    assert!(!opt.ignore_existing);
    assert!(opt.include.is_none());
    assert!(opt.level.is_none());
    assert_eq!(opt.timeout_seconds, 10);
    // LogLevel doesn't implement PartialEq, so compare via conversion
    assert_eq!(
        log::LevelFilter::from(opt.log_level.clone()),
        log::LevelFilter::from(LogLevel::Info)
    );
    match opt.log_format {
        LogFormat::Plain => {}
        _ => panic!("Should be Plain format"),
    }
}

#[test]
fn test_cli_all_flags() {
    let opt = Opt::try_parse_from([
        "cspscan",
        "index.html",
        "--root",
        "site/",
        "--include",
        "script-src 'self'",
        "--ignore-existing",
        "--validate",
        "--pretty",
        "--level",
        "2",
        "--timeout-seconds",
        "30",
        "--log-level",
        "debug",
        "--log-format",
        "json",
    ])
    .expect("should parse");

    assert_eq!(opt.url, "index.html");
    assert_eq!(opt.root.as_deref(), Some("site/"));
    assert_eq!(opt.include.as_deref(), Some("script-src 'self'"));
    assert!(opt.ignore_existing);
    assert!(opt.validate);
    assert!(opt.pretty);
    assert_eq!(opt.level, Some(2));
    assert_eq!(opt.timeout_seconds, 30);
    assert_eq!(
        log::LevelFilter::from(opt.log_level.clone()),
        log::LevelFilter::from(LogLevel::Debug)
    );
    match opt.log_format {
        LogFormat::Json => {}
        _ => panic!("Should be Json format"),
    }
}

#[test]
fn test_cli_missing_url_error() {
    let result = Opt::try_parse_from(["cspscan"]);
    assert!(result.is_err(), "Should fail without a URL argument");
}

#[test]
fn test_cli_level_out_of_range_error() {
    let result = Opt::try_parse_from(["cspscan", "https://example.com/", "--level", "4"]);
    assert!(result.is_err(), "Level above 3 should be rejected");

    let result = Opt::try_parse_from(["cspscan", "https://example.com/", "--level", "0"]);
    assert!(result.is_err(), "Level 0 should be rejected");
}

#[test]
fn test_cli_opt_converts_to_config() {
    let opt = Opt::try_parse_from(["cspscan", "https://example.com/", "--validate"])
        .expect("should parse");
    let config = Config::from(opt);

    assert_eq!(config.url, "https://example.com/");
    assert!(config.validate);
}

#[test]
fn test_cli_user_agent_override() {
    let opt = Opt::try_parse_from([
        "cspscan",
        "https://example.com/",
        "--user-agent",
        "csp-probe/1.0",
    ])
    .expect("should parse");

    assert_eq!(opt.user_agent, "csp-probe/1.0");
}
