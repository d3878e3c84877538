//! Markup rendering and round-trip extraction.
//!
//! ## Marker syntax
//!
//! Each resolved span becomes one element:
//!
//! ```html
//! <span class="entity entity-people" data-category="people" data-term="Simon Peter">Cephas</span>
//! <span class="entity entity-keywords" data-category="keywords" data-term="bread" data-layer="1">bread</span>
//! ```
//!
//! `data-category` is one of `people`, `places`, `keywords`; `data-term` is
//! the canonical term (aliases resolve to the primary name). Keyword markers
//! carry their layer. [`extract_annotations`] parses exactly this shape back.
//!
//! ## Splicing
//!
//! [`render`] escapes the text and splices markers from the last span to the
//! first, so each splice leaves the offsets of the spans before it valid.
//!
//! ## Documents
//!
//! - [`render_plain_text`]: blank-line separated paragraphs, each annotated
//!   on its own and wrapped in `<p class="...">`.
//! - [`render_verses`]: one annotation pass per verse (terms never span a
//!   verse boundary), each verse prefixed with a number badge.
//!
//! Document renders may start with a version marker comment
//! (`<!-- verse-annotator ruleset=... gazetteer=... -->`) that hosts use to
//! detect stale cached annotations. It is an HTML comment and never shows up
//! in the rendered page.

use crate::escape::{escape_html, unescape_html};
use crate::types::{Category, Layer, Span, Verse};
use maud::{Markup, PreEscaped, html};
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

/// Number of fingerprint hex digits carried in the version marker.
const FINGERPRINT_DIGITS: usize = 16;

static PARAGRAPH_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").expect("paragraph break pattern is valid"));

static MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r#"<span class="entity entity-[a-z]+" data-category="(people|places|keywords)" "#,
        r#"data-term="([^"]*)"(?: data-layer="[123]")?>([^<]*)</span>"#,
    ))
    .expect("marker pattern is valid")
});

static VERSION_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\A\s*<!-- verse-annotator ruleset=(\S+) gazetteer=([0-9a-f]+) -->\n?")
        .expect("version marker pattern is valid")
});

/// Ruleset identity embedded in annotated documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ruleset {
    pub name: String,
    pub gazetteer: String,
}

impl Ruleset {
    /// `fingerprint` is truncated to the digits the marker carries.
    pub fn new(name: &str, fingerprint: &str) -> Self {
        Self {
            name: name.to_string(),
            gazetteer: fingerprint.chars().take(FINGERPRINT_DIGITS).collect(),
        }
    }
}

/// One marker recovered from annotated markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub category: Category,
    pub term: String,
    /// The highlighted text, unescaped.
    pub text: String,
}

/// Output of [`render_plain_text`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedDocument {
    pub html: String,
    /// Byte ranges of each paragraph in the source text, in order.
    pub paragraphs: Vec<Range<usize>>,
}

fn marker(span: &Span) -> Markup {
    let category = span.category.as_str();
    html! {
        span class=(format!("entity entity-{category}"))
            data-category=(category)
            data-term=(span.canonical_term)
            data-layer=[span.layer.map(Layer::number)]
        { (PreEscaped(&span.matched_text)) }
    }
}

/// Escape `text` and wrap every span in its marker.
///
/// `spans` must be non-overlapping with offsets into the escaped text, as
/// produced by the resolver for this same `text`.
pub fn render(text: &str, spans: &[Span]) -> String {
    let mut html = escape_html(text);
    let mut ordered: Vec<&Span> = spans.iter().collect();
    ordered.sort_by(|a, b| b.start.cmp(&a.start));
    for span in ordered {
        html.replace_range(span.range(), &marker(span).into_string());
    }
    html
}

/// Byte ranges of the blank-line separated paragraphs of `text`, trimmed,
/// empty paragraphs skipped.
pub fn split_paragraphs(text: &str) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut push_trimmed = |range: Range<usize>| {
        let block = &text[range.clone()];
        let start = range.start + (block.len() - block.trim_start().len());
        let end = range.end - (block.len() - block.trim_end().len());
        if start < end {
            ranges.push(start..end);
        }
    };

    let mut prev = 0;
    for m in PARAGRAPH_BREAK.find_iter(text) {
        push_trimmed(prev..m.start());
        prev = m.end();
    }
    push_trimmed(prev..text.len());
    ranges
}

/// Annotate free-form text paragraph by paragraph.
///
/// `find_spans` produces resolved spans for one paragraph.
pub fn render_plain_text<F>(text: &str, paragraph_class: &str, find_spans: F) -> AnnotatedDocument
where
    F: Fn(&str) -> Vec<Span>,
{
    let paragraphs = split_paragraphs(text);
    let html = paragraphs
        .iter()
        .map(|range| {
            let block = &text[range.clone()];
            let inner = render(block, &find_spans(block));
            html! { p class=(paragraph_class) { (PreEscaped(inner)) } }.into_string()
        })
        .collect::<Vec<_>>()
        .join("\n");
    AnnotatedDocument { html, paragraphs }
}

/// Annotate each verse independently and prefix it with its number badge.
pub fn render_verses<F>(verses: &[Verse], find_spans: F) -> String
where
    F: Fn(&str) -> Vec<Span>,
{
    verses
        .iter()
        .map(|verse| {
            let inner = render(&verse.text, &find_spans(&verse.text));
            html! {
                span.verse data-verse=(verse.number) {
                    sup.verse-number { (verse.number) }
                    " "
                    (PreEscaped(inner))
                }
            }
            .into_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// =============================================================================
// Version marker
// =============================================================================

/// The marker comment line for `ruleset`, newline-terminated.
pub fn version_marker(ruleset: &Ruleset) -> String {
    format!(
        "<!-- verse-annotator ruleset={} gazetteer={} -->\n",
        ruleset.name, ruleset.gazetteer
    )
}

/// Read the version marker at the start of `html`, if any.
pub fn read_version_marker(html: &str) -> Option<Ruleset> {
    let caps = VERSION_MARKER.captures(html)?;
    Some(Ruleset {
        name: caps[1].to_string(),
        gazetteer: caps[2].to_string(),
    })
}

/// `html` without its leading version marker.
pub fn strip_version_marker(html: &str) -> &str {
    match VERSION_MARKER.find(html) {
        Some(m) => &html[m.end()..],
        None => html,
    }
}

// =============================================================================
// Extraction
// =============================================================================

/// Recover `(category, term, text)` for every marker, in document order.
pub fn extract_annotations(html: &str) -> Vec<Annotation> {
    MARKER
        .captures_iter(html)
        .filter_map(|caps| {
            Some(Annotation {
                category: Category::parse(&caps[1])?,
                term: unescape_html(&caps[2]),
                text: unescape_html(&caps[3]),
            })
        })
        .collect()
}
