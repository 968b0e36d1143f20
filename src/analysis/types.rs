//! Analysis result types.
//!
//! All collections are order-preserving (`Vec`, not maps) so that reports
//! rendered from an analysis are diffable across runs.

use crate::graph::{DocumentId, PolicyName};

/// Human-readable identity of a resource that needs whitelisting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRef {
    /// Resource URL, or a description for inline content
    pub url_or_description: String,
}

/// One required-but-missing source expression and the resources needing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdditionEntry {
    /// The source expression (origin, keyword, hash, ...)
    pub source: String,
    /// Offending resources, in discovery order
    pub resources: Vec<ResourceRef>,
}

/// Missing source expressions for one directive.
///
/// The directive is identified by its internal camelCase name (for example
/// `scriptSrc`); consumers kebab it before showing it to a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveAdditions {
    /// camelCase directive identifier
    pub directive: String,
    /// Entries in first-seen order
    pub entries: Vec<AdditionEntry>,
}

/// Analysis outcome for one policy declaration.
#[derive(Debug, Clone)]
pub struct PolicyAnalysis {
    /// Document owning the declaration
    pub document: DocumentId,
    /// Ordinal of the declaration on that document
    pub declaration_index: usize,
    /// Which CSP header the declaration belongs to
    pub name: PolicyName,
    /// Policy text after any update (the seed text when `update` is off)
    pub text: String,
    /// Required-but-missing source expressions, in stable order
    pub additions: Vec<DirectiveAdditions>,
}

/// Result of analyzing a graph: one entry per analyzed declaration, in
/// document-then-declaration order.
#[derive(Debug, Clone, Default)]
pub struct AnalysisResult {
    /// Per-declaration outcomes
    pub policies: Vec<PolicyAnalysis>,
}

impl AnalysisResult {
    /// The outcome for the seed declaration, if any.
    ///
    /// The seed is the first enforcing `Content-Security-Policy`
    /// declaration; report-only declarations are never the seed, even when
    /// they sit at ordinal 0.
    pub fn seed(&self) -> Option<&PolicyAnalysis> {
        self.policies
            .iter()
            .find(|p| p.name == PolicyName::ContentSecurityPolicy)
    }
}
