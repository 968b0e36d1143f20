//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `cspscan` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::process;

use cspscan::{init_logger_with, render_policy, run, Config, Opt};

#[tokio::main]
async fn main() -> Result<()> {
    let opt = Opt::parse();

    let log_level = opt.log_level.clone();
    let log_format = opt.log_format.clone();
    init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")?;

    let config = Config::from(opt);
    let validate = config.validate;
    let pretty = config.pretty;

    match run(&config).await {
        Ok(report) => {
            if report.url != report.original_url {
                println!("Redirected to {}", report.url);
            }
            for warn in &report.warns {
                eprintln!("{} {}", "warn:".yellow(), warn);
            }
            for error in &report.errors {
                eprintln!("{} {}", "error:".red(), error);
            }

            if report.errors.is_empty() {
                if validate {
                    println!(
                        "The Content-Security-Policy on {} allows every crawled resource",
                        report.url
                    );
                } else {
                    println!(
                        "Content-Security-Policy: {}",
                        render_policy(&report.content_security_policy, pretty)
                    );
                    if let Some(report_only) = &report.content_security_policy_report_only {
                        println!(
                            "Content-Security-Policy-Report-Only: {}",
                            render_policy(report_only, pretty)
                        );
                    }
                }
                Ok(())
            } else {
                process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("cspscan error: {:#}", e);
            process::exit(1);
        }
    }
}
