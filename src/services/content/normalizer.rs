//! Pulls a JSON document out of free-form completion text.
//!
//! Stages run in order and the first candidate that parses wins:
//! the whole text, the first fenced block, a brace-balanced prefix, a
//! nested-object regex match, the outermost `{..}`/`[..]` span, and finally
//! that span after light syntactic repair.

use std::sync::OnceLock;

use regex::Regex;

fn fenced_block() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"```(?:json|JSON)?([\s\S]+?)```").expect("fenced block regex"))
}

// Three levels of nesting is as deep as the regex engine can express without recursion.
fn nested_object() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\{(?:[^{}]|\{(?:[^{}]|\{[^{}]*\})*\})*\}").expect("nested object regex")
    })
}

fn single_quoted() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"'([^']*)'").expect("single quote regex"))
}

fn trailing_comma_object() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r",\s*\}").expect("trailing comma regex"))
}

fn trailing_comma_array() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r",\s*\]").expect("trailing comma regex"))
}

fn bare_key() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([{,])\s*([A-Za-z0-9_]+)\s*:").expect("bare key regex"))
}

fn is_json(candidate: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(candidate).is_ok()
}

/// Returns a string that parses as JSON, or `None` when nothing usable was found.
pub fn normalize(raw: &str) -> Option<String> {
    if is_json(raw) {
        return Some(raw.to_string());
    }

    let text = raw.trim();
    if text.is_empty() {
        return None;
    }

    if text.contains("```") {
        if let Some(inner) = fenced_block().captures(text).and_then(|c| c.get(1)) {
            let inner = inner.as_str().trim();
            if is_json(inner) {
                return Some(inner.to_string());
            }
        }
    }

    if text.starts_with('{') {
        if let Some(prefix) = balanced_prefix(text) {
            if is_json(prefix) {
                return Some(prefix.to_string());
            }
        }
    }

    if let Some(found) = nested_object().find(text) {
        if is_json(found.as_str()) {
            return Some(found.as_str().to_string());
        }
    }

    let span = outermost_span(text)?;
    if is_json(span) {
        return Some(span.to_string());
    }

    let repaired = repair(span);
    if repaired.is_some() {
        tracing::debug!("completion JSON needed repair before parsing");
    }
    repaired
}

/// Walks from the opening brace to the brace that closes it, skipping
/// braces inside string literals.
fn balanced_prefix(text: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, ch) in text.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&text[..=idx]);
                }
            }
            _ => {}
        }
    }

    None
}

/// First `{` or `[` (whichever comes first) through the last matching closer.
fn outermost_span(text: &str) -> Option<&str> {
    let open_brace = text.find('{');
    let open_bracket = text.find('[');

    let (start, closer) = match (open_brace, open_bracket) {
        (Some(b), Some(k)) if k < b => (k, ']'),
        (Some(b), _) => (b, '}'),
        (None, Some(k)) => (k, ']'),
        (None, None) => return None,
    };

    let end = text.rfind(closer)?;
    (end > start).then(|| &text[start..=end])
}

/// Applies the repairs from least to most invasive and stops at the first
/// result that parses. Quote swapping comes last since it also rewrites
/// apostrophes inside double-quoted strings.
fn repair(candidate: &str) -> Option<String> {
    let fixed = trailing_comma_object().replace_all(candidate, "}");
    let fixed = trailing_comma_array().replace_all(&fixed, "]").into_owned();
    if is_json(&fixed) {
        return Some(fixed);
    }

    let fixed = bare_key().replace_all(&fixed, "${1}\"${2}\":").into_owned();
    if is_json(&fixed) {
        return Some(fixed);
    }

    let fixed = single_quoted().replace_all(&fixed, "\"${1}\"");
    let fixed = bare_key().replace_all(&fixed, "${1}\"${2}\":").into_owned();
    is_json(&fixed).then_some(fixed)
}
