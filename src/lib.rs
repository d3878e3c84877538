//! # Verse Annotator
//!
//! Gazetteer-driven entity annotation for scripture and devotional text.
//! Given a list of people (with aliases), places and keywords, the engine
//! finds every occurrence in a passage and wraps it in a marker a reader UI
//! can style and link to study notes.
//!
//! # Architecture: Match, Resolve, Render
//!
//! ```text
//! 1. Build     people/places/keywords  →  Gazetteer   (dedupe, classify, longest-first)
//! 2. Match     escaped text            →  Candidates  (one sweep per category)
//! 3. Resolve   candidates              →  Vec<Span>   (Place > Person > Keyword)
//! 4. Render    text + spans            →  HTML        (markers spliced back to front)
//! ```
//!
//! The gazetteer and the compiled [`engine::Annotator`] are immutable once
//! built. Annotating a passage allocates only per-call state, so one engine is
//! shared freely across threads; the [`batch`] module does exactly that.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`types`] | Categories, layers, terms, spans, highlights |
//! | [`escape`] | HTML escaping and escaped-to-raw offset mapping |
//! | [`gazetteer`] | Term inventory: building from source lists, loading files, fingerprint |
//! | [`layers`] | Keyword layer classification (narrative, cultural, theological) |
//! | [`matcher`] | Per-category sweeps with word boundaries and capitalization rules |
//! | [`resolve`] | Cross-category overlap resolution |
//! | [`render`] | Marker markup, paragraph and verse documents, version marker, extraction |
//! | [`engine`] | The [`Annotator`](engine::Annotator) tying the stages together |
//! | [`config`] | `config.toml` loading, validation, and stock defaults |
//! | [`batch`] | Parallel annotation of files on disk |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Matching Runs On Escaped Text
//!
//! Markers are spliced into the escaped string, so spans are found there too
//! and their offsets need no translation at render time. Terms are escaped
//! the same way before compilation. A match that would cut through an entity
//! such as `&amp;` is rejected. [`engine::Annotator::highlights`] maps offsets
//! back to the raw text for hosts that draw their own highlights.
//!
//! ## Longest First, Category By Category
//!
//! Each category is swept longest term first, claiming the ranges it accepts,
//! so "Red Sea" is claimed before "sea" can be. Across categories places win
//! over people and people over keywords: "City of David" stays a place even
//! though "David" is a person.
//!
//! ## Capitalization
//!
//! A person match must start with an uppercase letter in the text, so "On"
//! the person never fires on the preposition "on". Places and keywords match
//! in any case. A person whose name is also a common short word
//! (configurable) matches only in its exact form.
//!
//! ## Versioned Output
//!
//! Annotated documents start with an HTML comment naming the ruleset and a
//! fingerprint of the gazetteer. Hosts caching annotations compare it with
//! [`engine::Annotator::is_current`] and re-annotate when either changes.

pub mod batch;
pub mod config;
pub mod engine;
pub mod escape;
pub mod gazetteer;
pub mod layers;
pub mod matcher;
pub mod output;
pub mod render;
pub mod resolve;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
