//! Plain-text rendering of user-supplied rich text.
//!
//! Question and answer bodies arrive as HTML fragments. They are never emitted
//! as markup: tags are dropped, common entities decoded, whitespace collapsed.

use std::sync::LazyLock;

use regex::Regex;

// Block-level tags become line breaks before the remaining tags are stripped.
static BLOCK_TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<\s*(?:br|/p|/li|/h[1-6]|/pre|/blockquote|/div)\s*/?\s*>")
        .expect("block tag regex is valid")
});

static SCRIPT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<\s*(script|style)[^>]*>.*?<\s*/\s*(script|style)\s*>")
        .expect("script regex is valid")
});

static TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("tag regex is valid"));

static SPACE_RUN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t\r\f\v]+").expect("space regex is valid"));

/// Converts an HTML fragment into display-safe plain text.
pub fn plain_text(markup: &str) -> String {
    let without_scripts = SCRIPT_REGEX.replace_all(markup, "");
    let with_breaks = BLOCK_TAG_REGEX.replace_all(&without_scripts, "\n");
    let stripped = TAG_REGEX.replace_all(&with_breaks, "");
    let decoded = decode_entities(&stripped);

    let lines: Vec<String> = decoded
        .lines()
        .map(|line| SPACE_RUN_REGEX.replace_all(line.trim(), " ").into_owned())
        .collect();

    collapse_blank_lines(&lines)
}

/// Single-line preview of `markup`, cut to at most `max_chars` characters.
pub fn excerpt(markup: &str, max_chars: usize) -> String {
    if max_chars == 0 {
        return String::new();
    }

    let flat = plain_text(markup)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    if flat.chars().count() <= max_chars {
        return flat;
    }

    let cut: String = flat.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}…", cut.trim_end())
}

fn decode_entities(text: &str) -> String {
    // `&amp;` last so "&amp;lt;" decodes to "&lt;" rather than "<".
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&amp;", "&")
}

fn collapse_blank_lines(lines: &[String]) -> String {
    let mut out: Vec<&str> = Vec::with_capacity(lines.len());
    for line in lines {
        if line.is_empty() && out.last().is_none_or(|prev| prev.is_empty()) {
            continue;
        }
        out.push(line);
    }
    while out.last().is_some_and(|l| l.is_empty()) {
        out.pop();
    }
    out.join("\n")
}
