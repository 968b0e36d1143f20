//! Relation discovery in fetched content.
//!
//! Walks a parsed HTML document and records every policy-relevant outgoing
//! reference as a graph relation: external resources become documents of
//! their own, inline content is carried on the edge. Meta-delivered CSP
//! instances are materialized as declarations here too, in document order,
//! so header attachment can later take priority over them.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::config::constants::{
    HEADER_CONTENT_SECURITY_POLICY, HEADER_CONTENT_SECURITY_POLICY_REPORT_ONLY,
};
use crate::graph::{
    DocumentId, DocumentKind, Graph, PolicyDeclaration, PolicyName, PolicyOrigin, Relation,
    RelationKind, RelationTarget,
};

fn selector(selector_str: &str) -> Selector {
    Selector::parse(selector_str).unwrap_or_else(|e| {
        panic!(
            "Failed to parse CSS selector '{}': {}. This is a programming error.",
            selector_str, e
        )
    })
}

static META_HTTP_EQUIV_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| selector("meta[http-equiv]"));
static SCRIPT_SELECTOR: LazyLock<Selector> = LazyLock::new(|| selector("script"));
static LINK_SELECTOR: LazyLock<Selector> = LazyLock::new(|| selector("link[rel][href]"));
static STYLE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| selector("style"));
static IMG_SELECTOR: LazyLock<Selector> = LazyLock::new(|| selector("img[src]"));
static FRAME_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| selector("iframe[src], frame[src]"));
static OBJECT_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| selector("object[data], embed[src]"));
static MEDIA_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| selector("audio[src], video[src], source[src]"));
static ANCHOR_SELECTOR: LazyLock<Selector> = LazyLock::new(|| selector("a[href]"));
static ANY_ELEMENT_SELECTOR: LazyLock<Selector> = LazyLock::new(|| selector("*"));

static SOURCE_MAP_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"//[#@][ \t]*sourceMappingURL=(\S+)").unwrap_or_else(|e| {
        panic!("Failed to compile source map pattern: {}. This is a programming error.", e)
    })
});

/// Script `type` values whose content executes as JavaScript. Anything else
/// (JSON payloads, templates) never reaches the script engine and must not
/// influence `script-src`.
fn is_javascript_type(type_attr: Option<&str>) -> bool {
    match type_attr {
        None => true,
        Some(t) => matches!(
            t.trim().to_ascii_lowercase().as_str(),
            "" | "text/javascript" | "application/javascript" | "module"
        ),
    }
}

/// Discovers relations and meta policies in an HTML document body.
///
/// External references are resolved against the document URL; unresolvable
/// ones are logged and skipped. New target documents are created unloaded;
/// the populate pass decides which of them to fetch.
pub fn discover_html(graph: &mut Graph, doc: DocumentId, body: &str) {
    let base = graph.document(doc).url.clone();
    let html = Html::parse_document(body);

    discover_meta_policies(graph, doc, &html);

    for element in html.select(&SCRIPT_SELECTOR) {
        if !is_javascript_type(element.value().attr("type")) {
            continue;
        }
        if let Some(src) = element.value().attr("src") {
            add_external(graph, doc, RelationKind::Script, &base, src, DocumentKind::JavaScript);
        } else {
            let text: String = element.text().collect();
            if !text.trim().is_empty() {
                add_inline(graph, doc, RelationKind::InlineScript, text, &base, "inline script");
            }
        }
    }

    for element in html.select(&LINK_SELECTOR) {
        discover_link(graph, doc, &base, element);
    }

    for element in html.select(&STYLE_SELECTOR) {
        let text: String = element.text().collect();
        if !text.trim().is_empty() {
            add_inline(graph, doc, RelationKind::InlineStyle, text, &base, "inline stylesheet");
        }
    }

    for element in html.select(&IMG_SELECTOR) {
        if let Some(src) = element.value().attr("src") {
            add_external(graph, doc, RelationKind::Image, &base, src, DocumentKind::Image);
        }
    }

    for element in html.select(&FRAME_SELECTOR) {
        if let Some(src) = element.value().attr("src") {
            add_external(graph, doc, RelationKind::Frame, &base, src, DocumentKind::Html);
        }
    }

    for element in html.select(&OBJECT_SELECTOR) {
        let reference = element
            .value()
            .attr("data")
            .or_else(|| element.value().attr("src"));
        if let Some(reference) = reference {
            add_external(graph, doc, RelationKind::Object, &base, reference, DocumentKind::Other);
        }
    }

    for element in html.select(&MEDIA_SELECTOR) {
        if let Some(src) = element.value().attr("src") {
            add_external(graph, doc, RelationKind::Media, &base, src, DocumentKind::Other);
        }
    }

    for element in html.select(&ANCHOR_SELECTOR) {
        if let Some(href) = element.value().attr("href") {
            if let Some(url) = resolve(&base, href) {
                if matches!(url.scheme(), "http" | "https" | "file") {
                    let target = graph.add_document(url, DocumentKind::Html);
                    graph.add_relation(Relation {
                        from: doc,
                        kind: RelationKind::Anchor,
                        target: RelationTarget::Document(target),
                    });
                }
            }
        }
    }

    for element in html.select(&ANY_ELEMENT_SELECTOR) {
        for (name, value) in element.value().attrs() {
            if name.len() > 2 && name.starts_with("on") && !value.trim().is_empty() {
                add_inline(
                    graph,
                    doc,
                    RelationKind::EventHandler,
                    value.to_string(),
                    &base,
                    "inline event handler",
                );
            }
        }
    }
}

/// Discovers references inside fetched JavaScript.
///
/// Only source-map comments are recognized; they matter because browsers
/// may fetch them with CSP applied, but they never expand further.
pub fn discover_javascript(graph: &mut Graph, doc: DocumentId, body: &str) {
    let base = graph.document(doc).url.clone();
    let references: Vec<String> = SOURCE_MAP_PATTERN
        .captures_iter(body)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .collect();
    for reference in references {
        add_external(graph, doc, RelationKind::SourceMap, &base, &reference, DocumentKind::Other);
    }
}

fn discover_meta_policies(graph: &mut Graph, doc: DocumentId, html: &Html) {
    for element in html.select(&META_HTTP_EQUIV_SELECTOR) {
        let Some(http_equiv) = element.value().attr("http-equiv") else {
            continue;
        };
        let name = if http_equiv.eq_ignore_ascii_case(HEADER_CONTENT_SECURITY_POLICY) {
            PolicyName::ContentSecurityPolicy
        } else if http_equiv.eq_ignore_ascii_case(HEADER_CONTENT_SECURITY_POLICY_REPORT_ONLY) {
            PolicyName::ContentSecurityPolicyReportOnly
        } else {
            continue;
        };
        let Some(content) = element.value().attr("content") else {
            continue;
        };
        graph.add_policy_declaration(
            doc,
            PolicyDeclaration {
                origin: PolicyOrigin::Meta,
                name,
                text: content.trim().to_string(),
            },
            false,
        );
    }
}

fn discover_link(graph: &mut Graph, doc: DocumentId, base: &Url, element: ElementRef<'_>) {
    let Some(rel) = element.value().attr("rel") else {
        return;
    };
    let Some(href) = element.value().attr("href") else {
        return;
    };
    for rel_token in rel.split_ascii_whitespace() {
        match rel_token.to_ascii_lowercase().as_str() {
            "stylesheet" => {
                add_external(graph, doc, RelationKind::Stylesheet, base, href, DocumentKind::Css);
            }
            "icon" | "apple-touch-icon" | "mask-icon" => {
                add_external(graph, doc, RelationKind::Image, base, href, DocumentKind::Image);
            }
            "manifest" => {
                add_external(graph, doc, RelationKind::Manifest, base, href, DocumentKind::Other);
            }
            "preconnect" | "dns-prefetch" | "prefetch" | "preload" | "prerender" => {
                add_external(
                    graph,
                    doc,
                    RelationKind::ResourceHint,
                    base,
                    href,
                    DocumentKind::Other,
                );
            }
            _ => {}
        }
    }
}

fn add_external(
    graph: &mut Graph,
    doc: DocumentId,
    kind: RelationKind,
    base: &Url,
    reference: &str,
    target_kind: DocumentKind,
) {
    let Some(url) = resolve(base, reference) else {
        return;
    };
    if url.scheme() == "data" {
        // data: URLs carry their content in the reference itself; they feed
        // no host-based source expression.
        return;
    }
    let target = graph.add_document(url, target_kind);
    graph.add_relation(Relation {
        from: doc,
        kind,
        target: RelationTarget::Document(target),
    });
}

fn add_inline(
    graph: &mut Graph,
    doc: DocumentId,
    kind: RelationKind,
    text: String,
    base: &Url,
    what: &str,
) {
    graph.add_relation(Relation {
        from: doc,
        kind,
        target: RelationTarget::Inline {
            text,
            description: format!("{what} in {base}"),
        },
    });
}

fn resolve(base: &Url, reference: &str) -> Option<Url> {
    match base.join(reference.trim()) {
        Ok(url) => Some(url),
        Err(e) => {
            log::warn!("Cannot resolve '{}' against {}: {}", reference, base, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn html_document(graph: &mut Graph, url: &str) -> DocumentId {
        let doc = graph.add_document(Url::parse(url).unwrap(), DocumentKind::Html);
        let document = graph.document_mut(doc);
        document.is_initial = true;
        document.is_loaded = true;
        doc
    }

    fn kinds(graph: &Graph, doc: DocumentId) -> Vec<RelationKind> {
        graph.relations_from(doc).iter().map(|r| r.kind).collect()
    }

    #[test]
    fn test_external_script_becomes_script_relation() {
        let mut graph = Graph::new();
        let doc = html_document(&mut graph, "https://example.com/");
        discover_html(
            &mut graph,
            doc,
            r#"<html><body><script src="/js/app.js"></script></body></html>"#,
        );

        assert_eq!(kinds(&graph, doc), vec![RelationKind::Script]);
        let relations = graph.relations_from(doc);
        let RelationTarget::Document(target) = relations[0].target else {
            panic!("expected a document target");
        };
        assert_eq!(
            graph.document(target).url.as_str(),
            "https://example.com/js/app.js"
        );
        assert_eq!(graph.document(target).kind, DocumentKind::JavaScript);
    }

    #[test]
    fn test_inline_script_carries_exact_text() {
        let mut graph = Graph::new();
        let doc = html_document(&mut graph, "https://example.com/");
        discover_html(
            &mut graph,
            doc,
            r#"<html><body><script>alert("foo");</script></body></html>"#,
        );

        let relations = graph.relations_from(doc);
        assert_eq!(relations[0].kind, RelationKind::InlineScript);
        let RelationTarget::Inline { text, description } = &relations[0].target else {
            panic!("expected an inline target");
        };
        assert_eq!(text, r#"alert("foo");"#);
        assert_eq!(description, "inline script in https://example.com/");
    }

    #[test]
    fn test_non_executable_script_types_ignored() {
        let mut graph = Graph::new();
        let doc = html_document(&mut graph, "https://example.com/");
        discover_html(
            &mut graph,
            doc,
            r#"<script type="application/ld+json">{"@context":"https://schema.org"}</script>
               <script type="module">import "./m.js";</script>"#,
        );

        assert_eq!(kinds(&graph, doc), vec![RelationKind::InlineScript]);
    }

    #[test]
    fn test_meta_policies_collected_in_document_order() {
        let mut graph = Graph::new();
        let doc = html_document(&mut graph, "https://example.com/");
        discover_html(
            &mut graph,
            doc,
            r#"<head>
                 <meta http-equiv="content-security-policy" content="default-src 'self'">
                 <meta http-equiv="Content-Security-Policy-Report-Only" content="img-src 'none'">
                 <meta http-equiv="refresh" content="30">
               </head>"#,
        );

        let declarations = &graph.document(doc).declarations;
        assert_eq!(declarations.len(), 2);
        assert_eq!(declarations[0].origin, PolicyOrigin::Meta);
        assert_eq!(declarations[0].name, PolicyName::ContentSecurityPolicy);
        assert_eq!(declarations[0].text, "default-src 'self'");
        assert_eq!(
            declarations[1].name,
            PolicyName::ContentSecurityPolicyReportOnly
        );
    }

    #[test]
    fn test_link_rel_variants() {
        let mut graph = Graph::new();
        let doc = html_document(&mut graph, "https://example.com/");
        discover_html(
            &mut graph,
            doc,
            r#"<head>
                 <link rel="stylesheet" href="/main.css">
                 <link rel="shortcut icon" href="/favicon.ico">
                 <link rel="manifest" href="/site.webmanifest">
                 <link rel="preconnect" href="https://fonts.example.com">
               </head>"#,
        );

        assert_eq!(
            kinds(&graph, doc),
            vec![
                RelationKind::Stylesheet,
                RelationKind::Image,
                RelationKind::Manifest,
                RelationKind::ResourceHint,
            ]
        );
    }

    #[test]
    fn test_event_handler_attributes_become_relations() {
        let mut graph = Graph::new();
        let doc = html_document(&mut graph, "https://example.com/");
        discover_html(
            &mut graph,
            doc,
            r#"<body><button onclick="doIt()">Go</button></body>"#,
        );

        let relations = graph.relations_from(doc);
        assert_eq!(relations.len(), 1);
        assert_eq!(relations[0].kind, RelationKind::EventHandler);
        let RelationTarget::Inline { text, .. } = &relations[0].target else {
            panic!("expected an inline target");
        };
        assert_eq!(text, "doIt()");
    }

    #[test]
    fn test_frames_media_and_objects() {
        let mut graph = Graph::new();
        let doc = html_document(&mut graph, "https://example.com/");
        discover_html(
            &mut graph,
            doc,
            r#"<body>
                 <iframe src="https://embed.example.net/widget"></iframe>
                 <video src="/intro.mp4"></video>
                 <object data="/report.pdf"></object>
               </body>"#,
        );

        assert_eq!(
            kinds(&graph, doc),
            vec![
                RelationKind::Frame,
                RelationKind::Object,
                RelationKind::Media,
            ]
        );
    }

    #[test]
    fn test_data_urls_are_skipped() {
        let mut graph = Graph::new();
        let doc = html_document(&mut graph, "https://example.com/");
        discover_html(
            &mut graph,
            doc,
            r#"<img src="data:image/gif;base64,R0lGODlhAQABAAAAACw=">"#,
        );

        assert!(graph.relations_from(doc).is_empty());
    }

    #[test]
    fn test_source_map_reference_in_javascript() {
        let mut graph = Graph::new();
        let doc = graph.add_document(
            Url::parse("https://example.com/app.js").unwrap(),
            DocumentKind::JavaScript,
        );
        discover_javascript(&mut graph, doc, "var x = 1;\n//# sourceMappingURL=app.js.map\n");

        let relations = graph.relations_from(doc);
        assert_eq!(relations.len(), 1);
        assert_eq!(relations[0].kind, RelationKind::SourceMap);
        assert!(!relations[0].kind.expands());
        let RelationTarget::Document(target) = relations[0].target else {
            panic!("expected a document target");
        };
        assert_eq!(
            graph.document(target).url.as_str(),
            "https://example.com/app.js.map"
        );
    }
}
