//! Shared test utilities for the verse-annotator test suite.
//!
//! Provides a small synthetic gazetteer, lookup helpers that panic with the
//! available options on a miss, and extractors that turn spans into compact
//! comparable values.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let a = annotator(sample_gazetteer());
//! let spans = a.find_spans("Moses crossed the Red Sea");
//! assert_eq!(span_summary(&spans)[0], (Category::Person, "Moses", 0));
//! ```

use std::path::{Path, PathBuf};

use crate::config::EngineConfig;
use crate::engine::Annotator;
use crate::gazetteer::Gazetteer;
use crate::types::{Category, PersonEntry, Span, Term};

// =========================================================================
// Fixture setup
// =========================================================================

/// A gazetteer exercising aliases, nested places and keyword layers.
pub fn sample_gazetteer() -> Gazetteer {
    Gazetteer::build(
        &[
            PersonEntry::new("Moses", &[]),
            PersonEntry::new("David", &["King David"]),
            PersonEntry::new("Simon Peter", &["Cephas", "Peter"]),
            PersonEntry::new("On", &[]),
        ],
        &["Egypt", "Red Sea", "City of David", "Jerusalem"],
        &["bread", "Sabbath", "grace", "sea"],
    )
}

/// Engine over `gazetteer` with default settings.
pub fn annotator(gazetteer: Gazetteer) -> Annotator {
    Annotator::new(gazetteer, &EngineConfig::default()).unwrap()
}

/// Path of the checked-in fixture directory.
pub fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

// =========================================================================
// Lookups: panic with a clear message on miss
// =========================================================================

/// Find a term by its text. Panics if not found.
pub fn find_term<'a>(terms: &'a [Term], text: &str) -> &'a Term {
    terms.iter().find(|t| t.text == text).unwrap_or_else(|| {
        let available = term_texts(terms);
        panic!("term '{text}' not found. Available: {available:?}")
    })
}

// =========================================================================
// Bulk extractors
// =========================================================================

/// All term texts in gazetteer order.
pub fn term_texts(terms: &[Term]) -> Vec<&str> {
    terms.iter().map(|t| t.text.as_str()).collect()
}

/// Matched texts in span order.
pub fn matched_texts(spans: &[Span]) -> Vec<&str> {
    spans.iter().map(|s| s.matched_text.as_str()).collect()
}

/// `(category, matched text, start)` per span.
pub fn span_summary(spans: &[Span]) -> Vec<(Category, &str, usize)> {
    spans
        .iter()
        .map(|s| (s.category, s.matched_text.as_str(), s.start))
        .collect()
}
