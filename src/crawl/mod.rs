//! Crawl orchestration.
//!
//! Fetches the entry document (recording its redirect chain as graph
//! edges), discovers relations in it, then populates the graph by fetching
//! the expandable relation targets concurrently. Subresource failures are
//! reported through the message sink and degrade the result instead of
//! aborting the run.

pub mod discover;
pub mod fetch;

use std::collections::HashSet;

use anyhow::Result;
use futures::stream::{FuturesUnordered, StreamExt};
use url::Url;

use crate::config::Config;
use crate::graph::{DocumentId, DocumentKind, Graph, RelationTarget};
use crate::report::MessageSink;

pub use fetch::{resolve_input, FetchedResource};

/// Crawls from the configured input and fills the graph.
///
/// `entry_client` must have redirect following disabled; `client` follows
/// redirects on its own and is used for subresources.
///
/// # Errors
///
/// Returns an error when the input cannot be resolved or the entry document
/// cannot be fetched. Subresource failures go to the sink instead.
pub async fn crawl(
    graph: &mut Graph,
    config: &Config,
    entry_client: &reqwest::Client,
    client: &reqwest::Client,
    sink: &mut MessageSink,
) -> Result<()> {
    let (entry_url, root_url) = fetch::resolve_input(&config.url, config.root.as_deref())?;
    graph.root = root_url;

    let resource = fetch::fetch_entry(entry_client, &entry_url).await?;
    let entry_doc = record_chain(graph, &resource);
    apply_fetched(graph, entry_doc, resource);

    populate(graph, client, sink).await;
    Ok(())
}

/// Records the entry request chain: one document per requested URL, a
/// redirect edge between each consecutive pair, and the first document
/// marked as the crawl entry point. Returns the final document.
fn record_chain(graph: &mut Graph, resource: &FetchedResource) -> DocumentId {
    // The chain always holds at least the requested URL.
    let mut doc = graph.add_document(resource.chain[0].clone(), DocumentKind::Other);
    graph.document_mut(doc).is_initial = true;
    for url in &resource.chain[1..] {
        let next = graph.add_document(url.clone(), DocumentKind::Other);
        graph.add_redirect(doc, next);
        doc = next;
    }
    doc
}

/// Stores a fetch result on its document and runs discovery on the body.
fn apply_fetched(graph: &mut Graph, doc: DocumentId, resource: FetchedResource) {
    {
        let document = graph.document_mut(doc);
        document.kind = resource.kind;
        document.is_loaded = true;
        document.existing_header_policy = resource.csp_header;
        document.existing_header_policy_report_only = resource.csp_report_only_header;
    }
    match resource.kind {
        DocumentKind::Html => discover::discover_html(graph, doc, &resource.body),
        DocumentKind::JavaScript => discover::discover_javascript(graph, doc, &resource.body),
        _ => {}
    }
}

/// Fetches every expandable relation target that has not been loaded yet.
///
/// Fetches run concurrently; results are applied to the graph one at a
/// time, in completion order. A single pass suffices: discovery inside
/// fetched subresources only yields non-expanding relations.
async fn populate(graph: &mut Graph, client: &reqwest::Client, sink: &mut MessageSink) {
    let mut attempted: HashSet<DocumentId> = HashSet::new();
    let mut pending: Vec<(DocumentId, Url)> = Vec::new();
    for relation in graph.relations() {
        if !relation.kind.expands() {
            continue;
        }
        let RelationTarget::Document(target) = relation.target else {
            continue;
        };
        if graph.document(target).is_loaded || !attempted.insert(target) {
            continue;
        }
        if !matches!(graph.document(target).url.scheme(), "http" | "https" | "file") {
            continue;
        }
        pending.push((target, graph.document(target).url.clone()));
    }

    let mut fetches: FuturesUnordered<_> = pending
        .into_iter()
        .map(|(doc, url)| {
            let client = client.clone();
            async move {
                let result = fetch::fetch_subresource(&client, &url).await;
                (doc, url, result)
            }
        })
        .collect();

    while let Some((doc, url, result)) = fetches.next().await {
        match result {
            Ok(resource) => {
                let final_url = resource.final_url().clone();
                if final_url != url {
                    // The redirected-to origin is what the browser ends up
                    // loading, so the policy must allow it.
                    log::debug!("{url} redirected to {final_url}");
                    graph.document_mut(doc).url = final_url;
                }
                apply_fetched(graph, doc, resource);
            }
            Err(e) => {
                sink.warn(format!("Failed to load {url}: {e:#}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::DocumentKind;

    fn fetched(urls: &[&str], kind: DocumentKind) -> FetchedResource {
        FetchedResource {
            chain: urls.iter().map(|u| Url::parse(u).unwrap()).collect(),
            kind,
            body: String::new(),
            csp_header: None,
            csp_report_only_header: None,
        }
    }

    #[test]
    fn test_record_chain_single_request() {
        let mut graph = Graph::new();
        let resource = fetched(&["https://example.com/"], DocumentKind::Html);
        let doc = record_chain(&mut graph, &resource);

        assert!(graph.document(doc).is_initial);
        assert!(graph.redirects().is_empty());
    }

    #[test]
    fn test_record_chain_marks_first_hop_initial() {
        let mut graph = Graph::new();
        let resource = fetched(
            &[
                "http://example.com/",
                "https://example.com/",
                "https://www.example.com/",
            ],
            DocumentKind::Html,
        );
        let doc = record_chain(&mut graph, &resource);

        assert_eq!(graph.redirects().len(), 2);
        assert_eq!(
            graph.document(doc).url.as_str(),
            "https://www.example.com/"
        );
        assert!(!graph.document(doc).is_initial);
        let first = graph.redirects()[0].from;
        assert!(graph.document(first).is_initial);
        assert_eq!(graph.document(first).url.as_str(), "http://example.com/");
    }

    #[test]
    fn test_apply_fetched_stores_headers_and_discovers() {
        let mut graph = Graph::new();
        let resource = fetched(&["https://example.com/"], DocumentKind::Html);
        let doc = record_chain(&mut graph, &resource);

        apply_fetched(
            &mut graph,
            doc,
            FetchedResource {
                chain: vec![Url::parse("https://example.com/").unwrap()],
                kind: DocumentKind::Html,
                body: r#"<script src="/app.js"></script>"#.to_string(),
                csp_header: Some("default-src 'self'".to_string()),
                csp_report_only_header: None,
            },
        );

        let document = graph.document(doc);
        assert!(document.is_loaded);
        assert_eq!(document.kind, DocumentKind::Html);
        assert_eq!(
            document.existing_header_policy.as_deref(),
            Some("default-src 'self'")
        );
        assert_eq!(graph.relations_from(doc).len(), 1);
    }
}
