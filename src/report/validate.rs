//! Validation diff reporting.
//!
//! Turns the analysis's per-directive additions into a deterministic,
//! human-readable validation report: which directives are missing which
//! source expressions, and which resources need them.

use crate::analysis::{AdditionEntry, DirectiveAdditions};
use crate::config::{PRETTY_INDENT, PRETTY_MAX_WIDTH, UNSTABLE_CSP3_KEYWORD};
use crate::csp::Policy;
use crate::report::format::{kebab, reformat_csp};

/// Missing coverage for one directive, kebab-named for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingDirective {
    /// kebab-case directive name
    pub directive: String,
    /// Missing source expressions with their offending resources,
    /// insertion-ordered
    pub entries: Vec<AdditionEntry>,
}

/// Derived, transient outcome of validating one document's policy.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// Flattened missing coverage, in directive-then-expression order
    pub missing: Vec<MissingDirective>,
    /// Whether the unstable CSP3 keyword is involved
    pub uses_unstable_keyword: bool,
}

impl ValidationReport {
    /// Builds a report from the seed policy's additions.
    ///
    /// `final_policy_text` is the policy as it would be emitted; together
    /// with `original_used_keyword` it decides the unstable-keyword flag
    /// for runs where the keyword is introduced by synthesis rather than
    /// listed as missing.
    pub fn from_additions(
        additions: &[DirectiveAdditions],
        final_policy_text: &str,
        original_used_keyword: bool,
    ) -> Self {
        let missing: Vec<MissingDirective> = additions
            .iter()
            .filter(|a| !a.entries.is_empty())
            .map(|a| MissingDirective {
                directive: kebab(&a.directive),
                entries: a.entries.clone(),
            })
            .collect();

        let missing_uses_keyword = missing
            .iter()
            .flat_map(|d| d.entries.iter())
            .any(|e| e.source == UNSTABLE_CSP3_KEYWORD);
        let emitted_uses_keyword =
            Policy::parse(final_policy_text).contains_keyword(UNSTABLE_CSP3_KEYWORD);

        ValidationReport {
            missing,
            uses_unstable_keyword: missing_uses_keyword
                || (emitted_uses_keyword && !original_used_keyword),
        }
    }

    /// Whether the validated policy covers everything the page needs.
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    /// Renders the missing coverage as multi-line text.
    ///
    /// One line per directive with the space-joined missing expressions
    /// (reflowed when `pretty`), followed by one indented line per
    /// offending resource. Deterministic for a given analysis.
    pub fn render(&self, pretty: bool) -> String {
        let mut lines = Vec::new();
        for missing in &self.missing {
            let sources: Vec<&str> = missing.entries.iter().map(|e| e.source.as_str()).collect();
            let directive_line = format!("{} {}", missing.directive, sources.join(" "));
            if pretty {
                lines.push(reformat_csp(
                    &directive_line,
                    PRETTY_MAX_WIDTH,
                    PRETTY_INDENT,
                ));
            } else {
                lines.push(directive_line);
            }
            for entry in &missing.entries {
                for resource in &entry.resources {
                    lines.push(format!("{PRETTY_INDENT}{}", resource.url_or_description));
                }
            }
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::ResourceRef;

    fn additions_fixture() -> Vec<DirectiveAdditions> {
        vec![
            DirectiveAdditions {
                directive: "scriptSrc".to_string(),
                entries: vec![AdditionEntry {
                    source: "'self'".to_string(),
                    resources: vec![ResourceRef {
                        url_or_description: "https://example.com/app.js".to_string(),
                    }],
                }],
            },
            DirectiveAdditions {
                directive: "imgSrc".to_string(),
                entries: vec![AdditionEntry {
                    source: "https://i.example.org".to_string(),
                    resources: vec![
                        ResourceRef {
                            url_or_description: "https://i.example.org/a.png".to_string(),
                        },
                        ResourceRef {
                            url_or_description: "https://i.example.org/b.png".to_string(),
                        },
                    ],
                }],
            },
        ]
    }

    #[test]
    fn test_missing_directives_are_kebab_named_in_order() {
        let report = ValidationReport::from_additions(&additions_fixture(), "", false);
        let names: Vec<&str> = report.missing.iter().map(|m| m.directive.as_str()).collect();
        assert_eq!(names, vec!["script-src", "img-src"]);
        assert!(!report.is_complete());
    }

    #[test]
    fn test_render_lists_expressions_then_resources() {
        let report = ValidationReport::from_additions(&additions_fixture(), "", false);
        assert_eq!(
            report.render(false),
            "script-src 'self'\n\
             \x20 https://example.com/app.js\n\
             img-src https://i.example.org\n\
             \x20 https://i.example.org/a.png\n\
             \x20 https://i.example.org/b.png"
        );
    }

    #[test]
    fn test_empty_additions_is_complete() {
        let report = ValidationReport::from_additions(&[], "default-src 'none'", false);
        assert!(report.is_complete());
        assert!(!report.uses_unstable_keyword);
        assert_eq!(report.render(false), "");
    }

    #[test]
    fn test_unstable_keyword_among_missing_sets_flag() {
        let additions = vec![DirectiveAdditions {
            directive: "scriptSrc".to_string(),
            entries: vec![AdditionEntry {
                source: "'unsafe-hashed-attributes'".to_string(),
                resources: vec![ResourceRef {
                    url_or_description: "inline event handler at https://example.com/".to_string(),
                }],
            }],
        }];
        let report = ValidationReport::from_additions(&additions, "", false);
        assert!(report.uses_unstable_keyword);
    }

    #[test]
    fn test_unstable_keyword_in_emitted_policy_sets_flag() {
        let report = ValidationReport::from_additions(
            &[],
            "script-src 'self' 'unsafe-hashed-attributes'",
            false,
        );
        assert!(report.uses_unstable_keyword);
    }

    #[test]
    fn test_preexisting_keyword_use_suppresses_flag() {
        let report = ValidationReport::from_additions(
            &[],
            "script-src 'self' 'unsafe-hashed-attributes'",
            true,
        );
        assert!(!report.uses_unstable_keyword);
    }
}
