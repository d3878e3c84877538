//! The annotation engine hosts call.
//!
//! An [`Annotator`] is built once per gazetteer (compiling every term
//! pattern) and is then read-only: every method takes `&self`, holds no
//! interior mutability, and can be shared across threads.
//!
//! ```text
//! text ──escape──▶ EscapedText ──Matcher──▶ Candidates ──resolve──▶ Vec<Span>
//!                                                                     │
//!                          ┌──────────────────────────────────────────┤
//!                          ▼                                          ▼
//!                   render (markup)                         highlights (ranges)
//! ```

use crate::config::EngineConfig;
use crate::escape::EscapedText;
use crate::gazetteer::Gazetteer;
use crate::matcher::{MatchError, Matcher};
use crate::render::{self, AnnotatedDocument, Ruleset};
use crate::resolve;
use crate::types::{Highlight, Span, Verse};

#[derive(Debug)]
pub struct Annotator {
    gazetteer: Gazetteer,
    matcher: Matcher,
    ruleset: Ruleset,
    embed_version: bool,
    paragraph_class: String,
}

impl Annotator {
    /// Compile `gazetteer` into an engine. Fails only if a term pattern
    /// cannot be compiled.
    pub fn new(gazetteer: Gazetteer, config: &EngineConfig) -> Result<Self, MatchError> {
        let matcher = Matcher::new(&gazetteer, &config.common_short_words)?;
        let ruleset = Ruleset::new(&config.ruleset, &gazetteer.fingerprint());
        Ok(Self {
            gazetteer,
            matcher,
            ruleset,
            embed_version: config.embed_version,
            paragraph_class: config.paragraph_class.clone(),
        })
    }

    pub fn gazetteer(&self) -> &Gazetteer {
        &self.gazetteer
    }

    pub fn ruleset(&self) -> &Ruleset {
        &self.ruleset
    }

    /// Resolved spans for `text`, start-sorted, offsets into the escaped text.
    pub fn find_spans(&self, text: &str) -> Vec<Span> {
        self.spans_in(&EscapedText::new(text))
    }

    fn spans_in(&self, escaped: &EscapedText) -> Vec<Span> {
        let candidates = self.matcher.find_matches(escaped);
        let found = candidates.len();
        let spans = resolve::resolve(candidates.places, candidates.people, candidates.keywords);
        tracing::trace!(found, kept = spans.len(), "resolved spans");
        spans
    }

    /// Inline fragment: escaped text with markers, no version marker.
    pub fn render(&self, text: &str) -> String {
        render::render(text, &self.find_spans(text))
    }

    /// Free-form text, paragraph by paragraph.
    pub fn render_plain_text(&self, text: &str) -> AnnotatedDocument {
        let mut doc = render::render_plain_text(text, &self.paragraph_class, |block| {
            self.find_spans(block)
        });
        if self.embed_version {
            doc.html.insert_str(0, &render::version_marker(&self.ruleset));
        }
        doc
    }

    /// Numbered verses, one annotation pass each.
    pub fn render_verses(&self, verses: &[Verse]) -> String {
        let html = render::render_verses(verses, |text| self.find_spans(text));
        if self.embed_version {
            format!("{}{}", render::version_marker(&self.ruleset), html)
        } else {
            html
        }
    }

    /// Resolved spans mapped onto the raw text, for callers that bind their
    /// own UI instead of consuming markup.
    pub fn highlights(&self, text: &str) -> Vec<Highlight> {
        let escaped = EscapedText::new(text);
        self.spans_in(&escaped)
            .into_iter()
            .map(|span| {
                let start = escaped.to_raw(span.start);
                let end = escaped.to_raw(span.end);
                Highlight {
                    start,
                    end,
                    category: span.category,
                    term: span.canonical_term,
                    text: text[start..end].to_string(),
                }
            })
            .collect()
    }

    /// Whether `html` carries this engine's version marker.
    pub fn is_current(&self, html: &str) -> bool {
        render::read_version_marker(html).as_ref() == Some(&self.ruleset)
    }
}
