//! Structured message sink.
//!
//! The pipeline reports findings through an explicit sink instead of a
//! process-wide console, so callers (and tests) can inspect the collected
//! records on the returned report. Collaborator-level failures accumulate
//! here without interrupting the run.

use strum_macros::EnumIter;

/// Severity of a collected message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Severity {
    /// Fatal-for-the-result findings (validation failures, fetch errors)
    Error,
    /// Advisories and degraded-crawl notices
    Warn,
    /// Notable events (redirects followed, ...)
    Info,
}

impl Severity {
    /// Human-readable label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warn => "warn",
            Severity::Info => "info",
        }
    }
}

/// One collected record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Record severity
    pub severity: Severity,
    /// Record text
    pub text: String,
}

/// Ordered collector of error/warn/info records for one invocation.
#[derive(Debug, Default)]
pub struct MessageSink {
    messages: Vec<Message>,
}

impl MessageSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        MessageSink::default()
    }

    /// Records an error.
    pub fn error(&mut self, text: impl Into<String>) {
        self.push(Severity::Error, text);
    }

    /// Records a warning.
    pub fn warn(&mut self, text: impl Into<String>) {
        self.push(Severity::Warn, text);
    }

    /// Records an informational message.
    pub fn info(&mut self, text: impl Into<String>) {
        self.push(Severity::Info, text);
    }

    fn push(&mut self, severity: Severity, text: impl Into<String>) {
        self.messages.push(Message {
            severity,
            text: text.into(),
        });
    }

    /// All records, in collection order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Texts of all records with the given severity, in collection order.
    pub fn texts(&self, severity: Severity) -> Vec<String> {
        self.messages
            .iter()
            .filter(|m| m.severity == severity)
            .map(|m| m.text.clone())
            .collect()
    }

    /// Whether any error-severity record was collected.
    pub fn has_errors(&self) -> bool {
        self.messages.iter().any(|m| m.severity == Severity::Error)
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_sink_preserves_order_within_severity() {
        let mut sink = MessageSink::new();
        sink.error("first");
        sink.warn("advisory");
        sink.error("second");

        assert_eq!(sink.texts(Severity::Error), vec!["first", "second"]);
        assert_eq!(sink.texts(Severity::Warn), vec!["advisory"]);
        assert!(sink.has_errors());
    }

    #[test]
    fn test_empty_sink_has_no_errors() {
        let sink = MessageSink::new();
        assert!(!sink.has_errors());
        assert!(sink.messages().is_empty());
    }

    #[test]
    fn test_all_severities_have_labels() {
        for severity in Severity::iter() {
            assert!(!severity.as_str().is_empty());
        }
    }
}
