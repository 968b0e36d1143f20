//! Baseline policy synthesis.
//!
//! Guarantees every initial HTML document carries at least one enforced
//! Content-Security-Policy declaration before analysis runs. When the page
//! ships none (or pre-existing ones were discarded), a synthetic baseline
//! is attached so the subsequent analysis has a policy to grow.

use crate::config::constants::DEFAULT_BASELINE_POLICY;
use crate::graph::{Graph, PolicyDeclaration, PolicyName, PolicyOrigin};

/// Ensures each initial HTML document has an enforced policy declaration.
///
/// With `ignore_existing` set, all pre-existing declarations (enforced and
/// report-only alike) are detached first. Documents left without an
/// enforced declaration get `include` (or the locked-down default
/// `default-src 'none'`) synthesized at ordinal 0. Report-only policies
/// are never synthesized: a page without one simply has none to complete.
pub fn synthesize_baseline(graph: &mut Graph, include: Option<&str>, ignore_existing: bool) {
    let baseline = include.unwrap_or(DEFAULT_BASELINE_POLICY);

    for doc in graph.initial_html_documents() {
        if ignore_existing {
            graph.detach_declarations(doc, PolicyName::ContentSecurityPolicy);
            graph.detach_declarations(doc, PolicyName::ContentSecurityPolicyReportOnly);
        }

        let has_enforced = graph
            .document(doc)
            .declarations
            .iter()
            .any(|d| d.name == PolicyName::ContentSecurityPolicy);
        if has_enforced {
            continue;
        }

        graph.add_policy_declaration(
            doc,
            PolicyDeclaration {
                origin: PolicyOrigin::Synthesized,
                name: PolicyName::ContentSecurityPolicy,
                text: baseline.to_string(),
            },
            true,
        );
    }
}

#[cfg(test)]
mod tests {
    use url::Url;

    use crate::graph::DocumentKind;

    use super::*;

    fn initial_html(graph: &mut Graph, url: &str) -> usize {
        let doc = graph.add_document(Url::parse(url).unwrap(), DocumentKind::Html);
        let document = graph.document_mut(doc);
        document.is_initial = true;
        document.is_loaded = true;
        doc
    }

    #[test]
    fn test_default_baseline_synthesized_when_no_policy() {
        let mut graph = Graph::new();
        let doc = initial_html(&mut graph, "https://example.com/");

        synthesize_baseline(&mut graph, None, false);

        let declarations = &graph.document(doc).declarations;
        assert_eq!(declarations.len(), 1);
        assert_eq!(declarations[0].origin, PolicyOrigin::Synthesized);
        assert_eq!(declarations[0].text, "default-src 'none'");
    }

    #[test]
    fn test_include_overrides_default_baseline() {
        let mut graph = Graph::new();
        let doc = initial_html(&mut graph, "https://example.com/");

        synthesize_baseline(&mut graph, Some("script-src 'self'; object-src 'none'"), false);

        assert_eq!(
            graph.document(doc).declarations[0].text,
            "script-src 'self'; object-src 'none'"
        );
    }

    #[test]
    fn test_existing_enforced_policy_left_alone() {
        let mut graph = Graph::new();
        let doc = initial_html(&mut graph, "https://example.com/");
        graph.add_policy_declaration(
            doc,
            PolicyDeclaration {
                origin: PolicyOrigin::Header,
                name: PolicyName::ContentSecurityPolicy,
                text: "default-src 'self'".to_string(),
            },
            false,
        );

        synthesize_baseline(&mut graph, None, false);

        let declarations = &graph.document(doc).declarations;
        assert_eq!(declarations.len(), 1);
        assert_eq!(declarations[0].origin, PolicyOrigin::Header);
    }

    #[test]
    fn test_report_only_alone_still_gets_enforced_baseline() {
        let mut graph = Graph::new();
        let doc = initial_html(&mut graph, "https://example.com/");
        graph.add_policy_declaration(
            doc,
            PolicyDeclaration {
                origin: PolicyOrigin::Header,
                name: PolicyName::ContentSecurityPolicyReportOnly,
                text: "script-src 'none'".to_string(),
            },
            false,
        );

        synthesize_baseline(&mut graph, None, false);

        let declarations = &graph.document(doc).declarations;
        assert_eq!(declarations.len(), 2);
        // Baseline lands first; the report-only declaration stays untouched.
        assert_eq!(declarations[0].name, PolicyName::ContentSecurityPolicy);
        assert_eq!(declarations[0].origin, PolicyOrigin::Synthesized);
        assert_eq!(declarations[1].name, PolicyName::ContentSecurityPolicyReportOnly);
    }

    #[test]
    fn test_ignore_existing_replaces_prior_policies() {
        let mut graph = Graph::new();
        let doc = initial_html(&mut graph, "https://example.com/");
        graph.add_policy_declaration(
            doc,
            PolicyDeclaration {
                origin: PolicyOrigin::Meta,
                name: PolicyName::ContentSecurityPolicy,
                text: "default-src *".to_string(),
            },
            false,
        );
        graph.add_policy_declaration(
            doc,
            PolicyDeclaration {
                origin: PolicyOrigin::Header,
                name: PolicyName::ContentSecurityPolicyReportOnly,
                text: "img-src 'none'".to_string(),
            },
            false,
        );

        synthesize_baseline(&mut graph, None, true);

        let declarations = &graph.document(doc).declarations;
        assert_eq!(declarations.len(), 1);
        assert_eq!(declarations[0].origin, PolicyOrigin::Synthesized);
        assert_eq!(declarations[0].text, "default-src 'none'");
    }
}
