//! cspscan - derive or validate a Content-Security-Policy for a web page.
//!
//! Crawls a page (or a local HTML file), discovers every resource it loads,
//! and computes the source expressions a CSP must contain for the page to
//! keep working. Pre-existing policies delivered via meta tags or response
//! headers are picked up and completed rather than replaced; `--validate`
//! reports what an existing policy is missing instead of emitting one.
//!
//! # Example
//!
//! ```no_run
//! use cspscan::{run, Config};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config {
//!     url: "https://example.com/".to_string(),
//!     ..Default::default()
//! };
//! let report = run(&config).await?;
//! println!("{}", report.content_security_policy);
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod config;
pub mod crawl;
pub mod csp;
pub mod error_handling;
pub mod graph;
pub mod initialization;
pub mod policy;
pub mod report;

use anyhow::Result;

use crate::analysis::{analyze, AnalysisOptions};
use crate::config::{PRETTY_INDENT, PRETTY_MAX_WIDTH, UNSTABLE_CSP3_KEYWORD};
use crate::csp::Policy;
use crate::error_handling::CrawlError;
use crate::graph::{Graph, PolicyName, PolicyOrigin};
use crate::policy::{ensure_html_found, extract_existing, resolve_initial, synthesize_baseline};
use crate::report::{MessageSink, Severity, ValidationReport};

pub use crate::config::{Config, LogFormat, LogLevel, Opt};
pub use crate::initialization::{init_client, init_logger_with, init_redirect_client};
pub use crate::policy::OriginalPolicy;
pub use crate::report::reformat_csp;

/// One policy declaration as it stands at the end of the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyOutcome {
    /// `"meta"`, `"header"` or `"synthesized"`
    pub origin: &'static str,
    /// Header / http-equiv name
    pub name: String,
    /// Final policy text (updated with additions unless validating)
    pub text: String,
}

/// Result of one invocation.
#[derive(Debug, Clone, Default)]
pub struct CspReport {
    /// Final URL of the page, after following redirects
    pub url: String,
    /// URL as requested, before any redirect
    pub original_url: String,
    /// Derived enforcing policy; multiple initial documents are joined
    /// with `", "`
    pub content_security_policy: String,
    /// Pre-existing report-only policy text, if any
    pub content_security_policy_report_only: Option<String>,
    /// Policies found on the page before any synthesis or update
    pub original_policies: Vec<OriginalPolicy>,
    /// Every declaration as it stands at the end of the run
    pub policies: Vec<PolicyOutcome>,
    /// Collected error records (validation failures)
    pub errors: Vec<String>,
    /// Collected warning records (advisories, degraded-crawl notices)
    pub warns: Vec<String>,
}

/// Derives (or validates) the Content-Security-Policy for the configured
/// page.
///
/// # Errors
///
/// Returns an error when no URL was given, the HTTP clients cannot be
/// built, the entry document cannot be fetched, or the crawl yields no
/// HTML document. Everything else degrades into `errors`/`warns` on the
/// returned report.
pub async fn run(config: &Config) -> Result<CspReport> {
    if config.url.trim().is_empty() {
        return Err(CrawlError::NoUrl.into());
    }

    let entry_client = init_redirect_client(config)?;
    let client = init_client(config)?;

    let mut graph = Graph::new();
    let mut sink = MessageSink::new();

    crawl::crawl(&mut graph, config, &entry_client, &client, &mut sink).await?;

    let original_url = graph
        .find_documents(|d| d.is_initial)
        .first()
        .map(|&id| graph.document(id).url_or_description())
        .unwrap_or_default();

    resolve_initial(&mut graph);
    ensure_html_found(&graph)?;

    let original_policies = extract_existing(&mut graph, config.ignore_existing);
    synthesize_baseline(&mut graph, config.include.as_deref(), config.ignore_existing);

    let original_used_keyword = seed_policy_texts(&graph)
        .iter()
        .any(|text| Policy::parse(text).contains_keyword(UNSTABLE_CSP3_KEYWORD));

    let analysis = analyze(
        &mut graph,
        AnalysisOptions {
            level: config.level,
            update: !config.validate,
        },
    );

    let content_security_policy = seed_policy_texts(&graph).join(", ");
    let content_security_policy_report_only = report_only_policy_text(&graph);

    let validation = match analysis.seed() {
        Some(seed) => {
            ValidationReport::from_additions(&seed.additions, &seed.text, original_used_keyword)
        }
        None => ValidationReport::default(),
    };

    if config.validate {
        // A page without a pre-existing policy cannot pass validation,
        // even when the synthesized baseline covers every resource.
        if original_policies.is_empty() {
            sink.error("No Content-Security-Policy found on the page");
        } else if !validation.is_complete() {
            sink.error(format!(
                "The Content-Security-Policy does not allow the following resources:\n{}",
                validation.render(config.pretty)
            ));
        }
    }

    if validation.uses_unstable_keyword && config.level.unwrap_or(1) < 3 {
        sink.warn(format!(
            "The policy contains {UNSTABLE_CSP3_KEYWORD}, which is not supported by all \
             browsers yet. Pass --level 3 to accept it without this warning."
        ));
    }

    let url = graph
        .initial_html_documents()
        .first()
        .map(|&id| graph.document(id).url_or_description())
        .unwrap_or_else(|| original_url.clone());

    let policies = graph
        .initial_html_documents()
        .iter()
        .flat_map(|&id| graph.document(id).declarations.iter())
        .map(|d| PolicyOutcome {
            origin: match d.origin {
                PolicyOrigin::Meta => "meta",
                PolicyOrigin::Header => "header",
                PolicyOrigin::Synthesized => "synthesized",
            },
            name: d.name.as_str().to_string(),
            text: d.text.clone(),
        })
        .collect();

    Ok(CspReport {
        url,
        original_url,
        content_security_policy,
        content_security_policy_report_only,
        original_policies,
        policies,
        errors: sink.texts(Severity::Error),
        warns: sink.texts(Severity::Warn),
    })
}

/// Renders a policy for terminal output, reflowing it when `pretty`.
pub fn render_policy(text: &str, pretty: bool) -> String {
    if pretty {
        reformat_csp(text, PRETTY_MAX_WIDTH, PRETTY_INDENT)
    } else {
        text.to_string()
    }
}

/// Final text of the seed (first enforcing) declaration of every initial
/// HTML document, in document order.
fn seed_policy_texts(graph: &Graph) -> Vec<String> {
    graph
        .initial_html_documents()
        .iter()
        .filter_map(|&id| {
            graph
                .document(id)
                .declarations
                .iter()
                .find(|d| d.name == PolicyName::ContentSecurityPolicy)
                .map(|d| d.text.clone())
        })
        .collect()
}

/// Joined report-only policy text across initial HTML documents, if any
/// declaration exists.
fn report_only_policy_text(graph: &Graph) -> Option<String> {
    let texts: Vec<String> = graph
        .initial_html_documents()
        .iter()
        .flat_map(|&id| {
            graph
                .document(id)
                .declarations
                .iter()
                .filter(|d| d.name == PolicyName::ContentSecurityPolicyReportOnly)
                .map(|d| d.text.clone())
        })
        .collect();
    if texts.is_empty() {
        None
    } else {
        Some(texts.join(", "))
    }
}
