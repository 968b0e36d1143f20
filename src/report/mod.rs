//! Reporting: message sink, formatters and validation rendering.

pub mod format;
pub mod messages;
pub mod validate;

pub use format::{kebab, reformat_csp};
pub use messages::{Message, MessageSink, Severity};
pub use validate::{MissingDirective, ValidationReport};
