//! Redirect chain resolution on the crawled graph.
//!
//! The crawler records redirects as edges in discovery order, which is not
//! necessarily request order. Promoting "initial document" status must
//! happen in request order so multi-hop chains collapse onto the final
//! destination in a single pass.

use crate::graph::Graph;

/// Transfers `is_initial` along every recorded redirect chain.
///
/// Redirects are sorted by sequence id ascending before the pass, so a
/// redirect whose source only became initial because of an earlier redirect
/// is still resolved correctly. Mutates documents in place; a graph without
/// redirects is a no-op.
pub fn resolve_initial(graph: &mut Graph) {
    let mut redirects = graph.redirects().to_vec();
    redirects.sort_by_key(|r| r.sequence_id);

    for redirect in redirects {
        if graph.document(redirect.from).is_initial {
            graph.document_mut(redirect.to).is_initial = true;
            graph.document_mut(redirect.from).is_initial = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use url::Url;

    use super::*;
    use crate::graph::DocumentKind;

    fn chain_graph() -> (Graph, usize, usize, usize) {
        let mut graph = Graph::new();
        let a = graph.add_document(
            Url::parse("https://example.com/a").unwrap(),
            DocumentKind::Html,
        );
        let b = graph.add_document(
            Url::parse("https://example.com/b").unwrap(),
            DocumentKind::Html,
        );
        let c = graph.add_document(
            Url::parse("https://example.com/c").unwrap(),
            DocumentKind::Html,
        );
        graph.document_mut(a).is_initial = true;
        (graph, a, b, c)
    }

    #[test]
    fn test_multi_hop_chain_collapses_onto_final_document() {
        let (mut graph, a, b, c) = chain_graph();
        graph.add_redirect(a, b);
        graph.add_redirect(b, c);

        resolve_initial(&mut graph);

        assert!(!graph.document(a).is_initial);
        assert!(!graph.document(b).is_initial);
        assert!(graph.document(c).is_initial);
    }

    #[test]
    fn test_discovery_order_does_not_matter() {
        // The b→c hop is discovered before a→b, but its sequence id says
        // it happened second. Sorting by sequence id must still carry the
        // flag all the way to c in one pass.
        let (mut graph, a, b, c) = chain_graph();
        graph.record_redirect(b, c, 1);
        graph.record_redirect(a, b, 0);

        resolve_initial(&mut graph);

        assert!(!graph.document(a).is_initial);
        assert!(!graph.document(b).is_initial);
        assert!(graph.document(c).is_initial);
    }

    #[test]
    fn test_no_redirects_is_a_noop() {
        let (mut graph, a, b, c) = chain_graph();
        resolve_initial(&mut graph);
        assert!(graph.document(a).is_initial);
        assert!(!graph.document(b).is_initial);
        assert!(!graph.document(c).is_initial);
    }

    #[test]
    fn test_redirect_from_non_initial_document_is_ignored() {
        let (mut graph, a, b, c) = chain_graph();
        graph.add_redirect(b, c);
        resolve_initial(&mut graph);
        assert!(graph.document(a).is_initial);
        assert!(!graph.document(c).is_initial);
    }
}
