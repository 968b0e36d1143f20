//! Directive-name and policy-text formatting.
//!
//! Two pure functions: [`kebab`] turns camelCase directive identifiers into
//! their kebab-case wire names, and [`reformat_csp`] reflows a raw policy
//! string into bounded-width, indented text for display.

/// Converts a camelCase directive identifier to its kebab-case wire name.
///
/// Inserts a hyphen before every uppercase ASCII or Latin-1 supplement
/// letter and lowercases it; all other characters pass through untouched.
/// Idempotent on input that is already kebab-case.
///
/// ```
/// assert_eq!(cspscan::report::kebab("scriptSrc"), "script-src");
/// ```
pub fn kebab(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for ch in name.chars() {
        let is_upper =
            ch.is_ascii_uppercase() || (('\u{c0}'..='\u{de}').contains(&ch) && ch.is_uppercase());
        if is_upper {
            out.push('-');
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

fn indent_lines(text: &str, indent: &str) -> String {
    text.split('\n')
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{indent}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Reflows a raw `;`-separated policy string into multi-line, width-bounded,
/// indented text.
///
/// Each directive becomes its own block terminated by `;`. Tokens are packed
/// greedily onto lines with a strict `< max_width` bound; continuation lines
/// get one extra indent unit, and the whole output is indented by one base
/// unit so the consumer controls nesting depth by wrapping it.
///
/// The packing inequality is conservative rather than exact: a line may end
/// exactly at the bound, and a single token longer than `max_width` is never
/// split.
///
/// ```
/// assert_eq!(
///     cspscan::report::reformat_csp("foo bar quux; baz yadda;", 80, "  "),
///     "  foo bar quux;\n  baz yadda;"
/// );
/// ```
pub fn reformat_csp(text: &str, max_width: usize, indent: &str) -> String {
    let mut formatted = String::new();
    let mut first = true;
    for segment in text.split(';') {
        let tokens: Vec<&str> = segment.split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }
        if first {
            first = false;
        } else {
            formatted.push('\n');
        }
        let mut last: isize = -1;
        while last < tokens.len() as isize - 1 {
            let start = (last + 1) as usize;
            let mut cursor = start;
            let mut width = tokens[cursor].len() + indent.len();
            if last != -1 {
                width += indent.len();
                formatted.push('\n');
                formatted.push_str(indent);
            }
            while cursor < tokens.len() && tokens[cursor].len() + width < max_width {
                width += tokens[cursor].len() + 1;
                cursor += 1;
            }
            let end = (cursor + 1).min(tokens.len());
            formatted.push_str(&tokens[start..end].join(" "));
            last = cursor as isize;
        }
        formatted.push(';');
    }
    indent_lines(&formatted, indent)
}
