//! Existing-policy extraction.
//!
//! Harvests the policies already present on the initial documents (meta
//! tags materialized by the crawler and CSP response headers captured on
//! the document) into a uniform ordered list for reporting, and attaches
//! header-delivered policies as declarations so they take priority over
//! meta tags in later processing.

use crate::error_handling::CrawlError;
use crate::graph::{DocumentKind, Graph, PolicyDeclaration, PolicyName, PolicyOrigin};

/// One pre-existing policy as found on the document, for reporting only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginalPolicy {
    /// `"meta"` or `"header"`
    pub delivery: &'static str,
    /// Header / http-equiv name
    pub name: String,
    /// Raw policy text
    pub value: String,
}

/// Fails the run when the crawl produced no loaded HTML document among the
/// initial set; the error enumerates what was found instead.
pub fn ensure_html_found(graph: &Graph) -> Result<(), CrawlError> {
    let initial = graph.find_documents(|d| d.is_initial);
    let has_html = initial
        .iter()
        .any(|&id| graph.document(id).kind == DocumentKind::Html && graph.document(id).is_loaded);
    if has_html {
        return Ok(());
    }
    Err(CrawlError::NoHtmlAssets(
        initial
            .iter()
            .map(|&id| graph.document(id).url_or_description())
            .collect(),
    ))
}

/// Collects pre-existing policies from every initial, loaded HTML document.
///
/// Meta-delivered declarations are reported in document order. Unless
/// `ignore_existing` is set, header-delivered policies become synthetic
/// declarations attached at ordinal 0 (headers outrank meta tags) and are
/// reported after the meta entries, mirroring how they were found. The
/// returned list is never mutated afterwards.
pub fn extract_existing(graph: &mut Graph, ignore_existing: bool) -> Vec<OriginalPolicy> {
    let mut original_policies = Vec::new();

    for doc in graph.initial_html_documents() {
        for declaration in &graph.document(doc).declarations {
            if declaration.origin == PolicyOrigin::Meta {
                original_policies.push(OriginalPolicy {
                    delivery: "meta",
                    name: declaration.name.as_str().to_string(),
                    value: declaration.text.clone(),
                });
            }
        }

        if ignore_existing {
            continue;
        }

        if let Some(text) = graph.document(doc).existing_header_policy.clone() {
            graph.add_policy_declaration(
                doc,
                PolicyDeclaration {
                    origin: PolicyOrigin::Header,
                    name: PolicyName::ContentSecurityPolicy,
                    text: text.clone(),
                },
                true,
            );
            original_policies.push(OriginalPolicy {
                delivery: "header",
                name: PolicyName::ContentSecurityPolicy.as_str().to_string(),
                value: text,
            });
        }
        if let Some(text) = graph
            .document(doc)
            .existing_header_policy_report_only
            .clone()
        {
            graph.add_policy_declaration(
                doc,
                PolicyDeclaration {
                    origin: PolicyOrigin::Header,
                    name: PolicyName::ContentSecurityPolicyReportOnly,
                    text: text.clone(),
                },
                true,
            );
            original_policies.push(OriginalPolicy {
                delivery: "header",
                name: PolicyName::ContentSecurityPolicyReportOnly
                    .as_str()
                    .to_string(),
                value: text,
            });
        }
    }

    original_policies
}
