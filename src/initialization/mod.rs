//! Initialization of shared resources (logger, HTTP clients).

pub mod client;
pub mod logger;

pub use client::{init_client, init_redirect_client};
pub use logger::init_logger_with;
