//! CSP policy text model.
//!
//! Parses a raw `;`-separated policy string into an ordered directive list
//! and re-serializes it after updates. Order is preserved everywhere so
//! derived policies and reports are stable across runs.

/// One directive within a policy: a name and its source expressions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// Directive name as written (case preserved)
    pub name: String,
    /// Source expressions in written order
    pub sources: Vec<String>,
}

/// A parsed CSP, as an ordered directive list.
#[derive(Debug, Clone, Default)]
pub struct Policy {
    /// Directives in written order
    pub directives: Vec<Directive>,
}

impl Policy {
    /// Parses a raw policy string.
    ///
    /// Splits on `;`, drops whitespace-only segments (trailing `;` is
    /// harmless), and tokenizes each segment on runs of whitespace: the
    /// first token is the directive name, the rest its source expressions.
    pub fn parse(text: &str) -> Self {
        let mut directives = Vec::new();
        for segment in text.split(';') {
            let mut tokens = segment.split_whitespace();
            let Some(name) = tokens.next() else {
                continue;
            };
            directives.push(Directive {
                name: name.to_string(),
                sources: tokens.map(str::to_string).collect(),
            });
        }
        Policy { directives }
    }

    /// Serializes back to a single-line policy string.
    pub fn to_text(&self) -> String {
        self.directives
            .iter()
            .map(|d| {
                if d.sources.is_empty() {
                    d.name.clone()
                } else {
                    format!("{} {}", d.name, d.sources.join(" "))
                }
            })
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Finds a directive by name (ASCII case-insensitive).
    pub fn get(&self, name: &str) -> Option<&Directive> {
        self.directives
            .iter()
            .find(|d| d.name.eq_ignore_ascii_case(name))
    }

    /// Whether `expr` is already whitelisted for `directive`.
    ///
    /// Checks the named directive by exact token match; when the directive
    /// is absent entirely, falls back to `default-src` per CSP fallback
    /// semantics. An absent directive with no `default-src` covers nothing.
    pub fn covers(&self, directive: &str, expr: &str) -> bool {
        match self.get(directive) {
            Some(d) => d.sources.iter().any(|s| s == expr),
            None => self
                .get("default-src")
                .is_some_and(|d| d.sources.iter().any(|s| s == expr)),
        }
    }

    /// Appends `expr` to `directive`, creating the directive at the end of
    /// the policy when it does not exist yet. Duplicate expressions are not
    /// added twice.
    pub fn upsert(&mut self, directive: &str, expr: &str) {
        if let Some(d) = self
            .directives
            .iter_mut()
            .find(|d| d.name.eq_ignore_ascii_case(directive))
        {
            if !d.sources.iter().any(|s| s == expr) {
                d.sources.push(expr.to_string());
            }
            return;
        }
        self.directives.push(Directive {
            name: directive.to_string(),
            sources: vec![expr.to_string()],
        });
    }

    /// Whether any directive lists the given keyword.
    pub fn contains_keyword(&self, keyword: &str) -> bool {
        self.directives
            .iter()
            .any(|d| d.sources.iter().any(|s| s == keyword))
    }
}
