//! Document graph type definitions.

use url::Url;

/// Index of a document in the graph arena.
pub type DocumentId = usize;

/// Kind of a fetched resource, derived from content-type or file extension.
///
/// A closed enum, matched exhaustively; the crawler never dispatches on
/// type strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// An HTML page
    Html,
    /// A stylesheet
    Css,
    /// A script
    JavaScript,
    /// An image
    Image,
    /// Anything else (JSON, fonts, unknown binaries, ...)
    Other,
}

/// Where a policy declaration came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyOrigin {
    /// `<meta http-equiv>` tag in the document
    Meta,
    /// `Content-Security-Policy(-Report-Only)` HTTP response header
    Header,
    /// Baseline synthesized by this tool
    Synthesized,
}

/// Which CSP header a declaration belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyName {
    /// The enforcing policy
    ContentSecurityPolicy,
    /// The report-only policy
    ContentSecurityPolicyReportOnly,
}

impl PolicyName {
    /// Wire name of the header / meta `http-equiv` attribute.
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyName::ContentSecurityPolicy => crate::config::HEADER_CONTENT_SECURITY_POLICY,
            PolicyName::ContentSecurityPolicyReportOnly => {
                crate::config::HEADER_CONTENT_SECURITY_POLICY_REPORT_ONLY
            }
        }
    }
}

/// One CSP instance attached to a document.
///
/// Declarations are exclusively owned by their document; position in the
/// owning `Vec` is the ordinal, and the first-attached declaration of a
/// name is the primary one consumed by analysis.
#[derive(Debug, Clone)]
pub struct PolicyDeclaration {
    /// Delivery mechanism the declaration came from
    pub origin: PolicyOrigin,
    /// Enforcing or report-only
    pub name: PolicyName,
    /// Raw directive text
    pub text: String,
}

/// A web resource discovered during the crawl.
#[derive(Debug)]
pub struct Document {
    /// Arena index of this document
    pub id: DocumentId,
    /// Resource kind
    pub kind: DocumentKind,
    /// Resolved URL
    pub url: Url,
    /// Currently considered the entry point of the crawl.
    /// Mutated by the redirect resolver.
    pub is_initial: bool,
    /// Whether the fetch succeeded
    pub is_loaded: bool,
    /// `Content-Security-Policy` response header, if any
    pub existing_header_policy: Option<String>,
    /// `Content-Security-Policy-Report-Only` response header, if any
    pub existing_header_policy_report_only: Option<String>,
    /// Attached policy declarations, in ordinal order
    pub declarations: Vec<PolicyDeclaration>,
}

impl Document {
    /// Human-readable identity of the document, used in reports.
    pub fn url_or_description(&self) -> String {
        self.url.to_string()
    }
}

/// A recorded HTTP redirect edge.
///
/// `sequence_id` imposes a strict total order among redirects observed
/// across the whole crawl; the redirect resolver relies on processing them
/// in that order.
#[derive(Debug, Clone, Copy)]
pub struct Redirect {
    /// Redirecting document
    pub from: DocumentId,
    /// Redirect target
    pub to: DocumentId,
    /// Position in the global request order
    pub sequence_id: u64,
}

/// Kind of a relation between a document and a resource.
///
/// A closed enum, matched exhaustively. Navigational and speculative kinds
/// are excluded from graph expansion but kept as edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    /// `<script src>`
    Script,
    /// Inline `<script>` content
    InlineScript,
    /// Inline `on*` event-handler attribute content
    EventHandler,
    /// `<link rel="stylesheet">`
    Stylesheet,
    /// Inline `<style>` content
    InlineStyle,
    /// `<img src>` or `<link rel="icon">`
    Image,
    /// `<iframe src>` / `<frame src>`
    Frame,
    /// `<object data>`
    Object,
    /// `<audio src>` / `<video src>` / `<source src>`
    Media,
    /// Web app manifest link
    Manifest,
    /// `<a href>` (navigational, never expanded)
    Anchor,
    /// preconnect/prefetch/preload/prerender/search hints (never expanded)
    ResourceHint,
    /// Source-map reference (never expanded)
    SourceMap,
}

impl RelationKind {
    /// Whether populate may fetch the relation target.
    ///
    /// Anchors, resource hints and source maps are navigational/speculative.
    /// Frame content is navigational too: the frame URL still feeds
    /// `frame-src`, but the framed page is not crawled.
    pub fn expands(&self) -> bool {
        !matches!(
            self,
            RelationKind::Anchor
                | RelationKind::ResourceHint
                | RelationKind::SourceMap
                | RelationKind::Frame
        )
    }
}

/// Target of a relation: another document, or inline content carried on the
/// source document itself.
#[derive(Debug, Clone)]
pub enum RelationTarget {
    /// A separate resource in the arena
    Document(DocumentId),
    /// Inline content with a human-readable description
    Inline {
        /// Exact inline text (hash input)
        text: String,
        /// e.g. "inline script at https://example.com/"
        description: String,
    },
}

/// A directed edge from a document to a resource it uses.
#[derive(Debug, Clone)]
pub struct Relation {
    /// Source document
    pub from: DocumentId,
    /// Edge kind
    pub kind: RelationKind,
    /// Edge target
    pub target: RelationTarget,
}
