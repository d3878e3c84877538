//! Term matching over escaped text.
//!
//! Every gazetteer term is compiled once into a case-insensitive literal
//! pattern (metacharacters escaped with [`regex::escape`], and the term
//! itself HTML-escaped so that `Tom & Jerry` matches `Tom &amp; Jerry`).
//! A failed compile is fatal when the matcher is built; it is never
//! papered over by silently dropping the term.
//!
//! ## Sweeps
//!
//! Matching runs one sweep per category in a fixed order: places, people,
//! keywords. Within a sweep, terms are tried longest first and each term
//! scans the whole text left to right. A candidate is accepted when:
//!
//! - the characters on either side are not word characters (alphanumeric
//!   or `_`), so "Dan" never matches inside "Daniel";
//! - it does not cut through an HTML entity introduced by escaping;
//! - it does not intersect a span already accepted in the same sweep;
//! - for people only, it passes the capitalization rule below.
//!
//! ## Capitalization rule (people)
//!
//! A person match must start with an uppercase character, which keeps
//! "Mark" the evangelist from lighting up every "mark" in prose. Terms that
//! are also common short English words ("On", "Am") are stricter: the match
//! must have exactly the gazetteer's casing.
//!
//! Cross-category overlaps are left to [`crate::resolve`].

use crate::escape::{EscapedText, escape_html};
use crate::gazetteer::Gazetteer;
use crate::resolve::SpanSet;
use crate::types::{Category, Span, Term};
use regex::{Regex, RegexBuilder};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MatchError {
    #[error("failed to compile pattern for {category} term {term:?}: {source}")]
    Pattern {
        term: String,
        category: Category,
        source: regex::Error,
    },
}

/// How strictly a person match's casing is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CaseRule {
    Any,
    UppercaseInitial,
    Exact,
}

#[derive(Debug)]
struct CompiledTerm {
    term: Term,
    /// Term as it appears in escaped text.
    escaped: String,
    pattern: Regex,
    case_rule: CaseRule,
}

impl CompiledTerm {
    fn accepts(&self, matched: &str) -> bool {
        let uppercase_initial = || matched.chars().next().is_some_and(char::is_uppercase);
        match self.case_rule {
            CaseRule::Any => true,
            CaseRule::UppercaseInitial => uppercase_initial(),
            CaseRule::Exact => uppercase_initial() && matched == self.escaped,
        }
    }
}

/// Candidate spans from the three sweeps, before cross-category resolution.
///
/// Each list is internally non-overlapping and in discovery order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Candidates {
    pub places: Vec<Span>,
    pub people: Vec<Span>,
    pub keywords: Vec<Span>,
}

impl Candidates {
    pub fn len(&self) -> usize {
        self.places.len() + self.people.len() + self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Compiled, immutable matcher for one gazetteer.
#[derive(Debug)]
pub struct Matcher {
    places: Vec<CompiledTerm>,
    people: Vec<CompiledTerm>,
    keywords: Vec<CompiledTerm>,
}

impl Matcher {
    /// Compile every term of `gazetteer`.
    ///
    /// `common_short_words` are compared case-insensitively against person
    /// terms to select the exact-case rule.
    pub fn new<S: AsRef<str>>(
        gazetteer: &Gazetteer,
        common_short_words: &[S],
    ) -> Result<Self, MatchError> {
        let short_words: HashSet<String> = common_short_words
            .iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .collect();

        let compile_all = |category: Category| -> Result<Vec<CompiledTerm>, MatchError> {
            gazetteer
                .terms(category)
                .iter()
                .map(|term| compile(term, &short_words))
                .collect()
        };

        let matcher = Self {
            places: compile_all(Category::Place)?,
            people: compile_all(Category::Person)?,
            keywords: compile_all(Category::Keyword)?,
        };
        tracing::debug!(
            places = matcher.places.len(),
            people = matcher.people.len(),
            keywords = matcher.keywords.len(),
            "compiled term patterns"
        );
        Ok(matcher)
    }

    /// Run the three sweeps over `text`.
    pub fn find_matches(&self, text: &EscapedText) -> Candidates {
        if text.is_empty() {
            return Candidates::default();
        }
        Candidates {
            places: sweep(&self.places, text),
            people: sweep(&self.people, text),
            keywords: sweep(&self.keywords, text),
        }
    }
}

fn compile(term: &Term, short_words: &HashSet<String>) -> Result<CompiledTerm, MatchError> {
    let escaped = escape_html(&term.text);
    let pattern = RegexBuilder::new(&regex::escape(&escaped))
        .case_insensitive(true)
        .build()
        .map_err(|source| MatchError::Pattern {
            term: term.text.clone(),
            category: term.category,
            source,
        })?;

    let case_rule = match term.category {
        Category::Person if is_common_short_word(&term.text, short_words) => CaseRule::Exact,
        Category::Person => CaseRule::UppercaseInitial,
        Category::Place | Category::Keyword => CaseRule::Any,
    };

    Ok(CompiledTerm {
        term: term.clone(),
        escaped,
        pattern,
        case_rule,
    })
}

fn is_common_short_word(text: &str, short_words: &HashSet<String>) -> bool {
    text.chars().count() <= 3 && short_words.contains(&text.to_lowercase())
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// True when neither neighbour of `[start, end)` is a word character.
fn on_word_boundary(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
}

fn sweep(terms: &[CompiledTerm], text: &EscapedText) -> Vec<Span> {
    let haystack = text.as_str();
    let mut claimed = SpanSet::new();
    let mut spans = Vec::new();

    for compiled in terms {
        let mut at = 0;
        while let Some(m) = compiled.pattern.find_at(haystack, at) {
            let accepted = on_word_boundary(haystack, m.start(), m.end())
                && !text.splits_entity(m.range())
                && compiled.accepts(m.as_str())
                && claimed.claim(m.range());
            if accepted {
                spans.push(Span {
                    start: m.start(),
                    end: m.end(),
                    category: compiled.term.category,
                    matched_text: m.as_str().to_string(),
                    canonical_term: compiled.term.canonical.clone(),
                    layer: compiled.term.layer,
                });
                at = m.end();
            } else {
                // Retry one character later: a rejected candidate may hide
                // an acceptable one that starts inside it.
                let width = haystack[m.start()..].chars().next().map_or(1, char::len_utf8);
                at = m.start() + width;
            }
            if at >= haystack.len() {
                break;
            }
        }
    }

    spans
}
