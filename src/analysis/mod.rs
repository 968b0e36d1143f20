//! Directive-inference analysis.
//!
//! Given the crawled graph and the seed policy attached to each initial
//! document, computes which source expressions every directive requires,
//! which of those the policy is missing (`additions`), and, with `update`
//! set, rewrites the seed policy text to include them.

pub mod requirements;
pub mod types;


use crate::csp::Policy;
use crate::graph::{Graph, PolicyName};
use crate::report::kebab;

pub use requirements::{document_requirements, sha256_source_expression};
pub use types::{AdditionEntry, AnalysisResult, DirectiveAdditions, PolicyAnalysis, ResourceRef};

/// Options controlling the analysis.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalysisOptions {
    /// Target CSP level; `None` picks the broadest-support behavior
    pub level: Option<u8>,
    /// Apply computed additions to the seed policy text
    pub update: bool,
}

/// Analyzes every policy declaration on the initial, loaded HTML documents.
///
/// Additions are computed per declaration against that declaration's own
/// text; when `update` is set, the seed (first enforcing) declaration of
/// each document is rewritten to include its additions. Iteration order is
/// document order, then declaration ordinal, then requirement discovery
/// order, so the result is deterministic for a given crawl.
pub fn analyze(graph: &mut Graph, options: AnalysisOptions) -> AnalysisResult {
    let mut result = AnalysisResult::default();

    for doc in graph.initial_html_documents() {
        let requirements = document_requirements(graph, doc, options.level);
        let seed_index = graph
            .document(doc)
            .declarations
            .iter()
            .position(|d| d.name == PolicyName::ContentSecurityPolicy);

        for index in 0..graph.document(doc).declarations.len() {
            let declaration = &graph.document(doc).declarations[index];
            let name = declaration.name;
            let text = declaration.text.clone();
            let mut policy = Policy::parse(&text);
            let additions = collect_additions(&policy, &requirements);

            let final_text = if options.update && Some(index) == seed_index {
                for directive_additions in &additions {
                    let wire_name = kebab(&directive_additions.directive);
                    for entry in &directive_additions.entries {
                        policy.upsert(&wire_name, &entry.source);
                    }
                }
                let updated = policy.to_text();
                graph.document_mut(doc).declarations[index].text = updated.clone();
                updated
            } else {
                text
            };

            result.policies.push(PolicyAnalysis {
                document: doc,
                declaration_index: index,
                name,
                text: final_text,
                additions,
            });
        }
    }

    result
}

/// Groups uncovered requirements into additions, preserving first-seen
/// order of directives and of source expressions within a directive.
fn collect_additions(
    policy: &Policy,
    requirements: &[requirements::Requirement],
) -> Vec<DirectiveAdditions> {
    let mut additions: Vec<DirectiveAdditions> = Vec::new();

    for requirement in requirements {
        if policy.covers(&kebab(requirement.directive), &requirement.source) {
            continue;
        }
        let position = match additions
            .iter()
            .position(|a| a.directive == requirement.directive)
        {
            Some(position) => position,
            None => {
                additions.push(DirectiveAdditions {
                    directive: requirement.directive.to_string(),
                    entries: Vec::new(),
                });
                additions.len() - 1
            }
        };
        let directive_additions = &mut additions[position];
        match directive_additions
            .entries
            .iter_mut()
            .find(|e| e.source == requirement.source)
        {
            Some(entry) => {
                if !entry.resources.contains(&requirement.resource) {
                    entry.resources.push(requirement.resource.clone());
                }
            }
            None => directive_additions.entries.push(AdditionEntry {
                source: requirement.source.clone(),
                resources: vec![requirement.resource.clone()],
            }),
        }
    }

    additions
}
