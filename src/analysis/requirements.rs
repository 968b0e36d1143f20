//! Per-resource directive requirements.
//!
//! Walks the relations of a document and computes, for each resource, the
//! governing directive and the source expression that would whitelist it.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use sha2::{Digest, Sha256};
use url::Url;

use crate::analysis::types::ResourceRef;
use crate::config::{INCLUDE_PATH_DIRECTIVES, UNSTABLE_CSP3_KEYWORD};
use crate::graph::{DocumentId, Graph, RelationKind, RelationTarget};
use crate::report::kebab;

/// One directive/source-expression requirement with its offending resource.
#[derive(Debug, Clone)]
pub struct Requirement {
    /// camelCase directive identifier
    pub directive: &'static str,
    /// Source expression that would satisfy the resource
    pub source: String,
    /// The resource needing it
    pub resource: ResourceRef,
}

/// Maps a relation kind to the directive governing it.
/// Navigational and policy edges govern nothing.
fn governing_directive(kind: RelationKind) -> Option<&'static str> {
    match kind {
        RelationKind::Script | RelationKind::InlineScript | RelationKind::EventHandler => {
            Some("scriptSrc")
        }
        RelationKind::Stylesheet | RelationKind::InlineStyle => Some("styleSrc"),
        RelationKind::Image => Some("imgSrc"),
        RelationKind::Frame => Some("frameSrc"),
        RelationKind::Object => Some("objectSrc"),
        RelationKind::Media => Some("mediaSrc"),
        RelationKind::Manifest => Some("manifestSrc"),
        RelationKind::Anchor | RelationKind::ResourceHint | RelationKind::SourceMap => None,
    }
}

/// `'sha256-<base64>'` source expression over the exact inline text.
pub fn sha256_source_expression(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    format!("'sha256-{}'", BASE64.encode(digest))
}

fn same_origin(a: &Url, b: &Url) -> bool {
    if a.scheme() == "file" && b.scheme() == "file" {
        return true;
    }
    a.origin() == b.origin()
}

fn origin_expression(url: &Url) -> String {
    let origin = url.origin().ascii_serialization();
    // Opaque origins (file:) have no useful serialization
    if origin == "null" {
        "'self'".to_string()
    } else {
        origin
    }
}

fn path_expression(url: &Url) -> String {
    let mut full = url.clone();
    full.set_query(None);
    full.set_fragment(None);
    full.to_string()
}

/// Source expression for an external resource at `url` referenced from a
/// document at `base`.
fn external_expression(base: &Url, url: &Url, directive: &'static str, level: Option<u8>) -> String {
    if same_origin(base, url) {
        return "'self'".to_string();
    }
    let include_path =
        level.unwrap_or(1) >= 2 && INCLUDE_PATH_DIRECTIVES.contains(&kebab(directive).as_str());
    if include_path {
        path_expression(url)
    } else {
        origin_expression(url)
    }
}

/// Computes the requirements imposed by every resource relation of `doc`.
///
/// Relations are visited in discovery order, so the requirement list (and
/// everything derived from it) is stable for a given crawl.
pub fn document_requirements(
    graph: &Graph,
    doc: DocumentId,
    level: Option<u8>,
) -> Vec<Requirement> {
    let base = &graph.document(doc).url;
    let hash_capable = level.unwrap_or(1) >= 2;
    let mut requirements = Vec::new();

    for relation in graph.relations_from(doc) {
        let Some(directive) = governing_directive(relation.kind) else {
            continue;
        };
        match &relation.target {
            RelationTarget::Document(target) => {
                let target_doc = graph.document(*target);
                requirements.push(Requirement {
                    directive,
                    source: external_expression(base, &target_doc.url, directive, level),
                    resource: ResourceRef {
                        url_or_description: target_doc.url_or_description(),
                    },
                });
            }
            RelationTarget::Inline { text, description } => {
                let resource = ResourceRef {
                    url_or_description: description.clone(),
                };
                match relation.kind {
                    RelationKind::EventHandler => {
                        requirements.push(Requirement {
                            directive,
                            source: UNSTABLE_CSP3_KEYWORD.to_string(),
                            resource: resource.clone(),
                        });
                        if hash_capable {
                            requirements.push(Requirement {
                                directive,
                                source: sha256_source_expression(text),
                                resource,
                            });
                        }
                    }
                    _ => {
                        let source = if hash_capable {
                            sha256_source_expression(text)
                        } else {
                            // Broadest-support fallback below level 2
                            "'self'".to_string()
                        };
                        requirements.push(Requirement {
                            directive,
                            source,
                            resource,
                        });
                    }
                }
            }
        }
    }

    requirements
}
