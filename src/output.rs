//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Gazetteer
//!     People: 7 terms
//!     Places: 4 terms
//!     Keywords: 5 terms
//!         Layer 1: 2
//!         Layer 2: 1
//!         Layer 3: 2
//!     Dropped: 0 blank, 1 duplicate, 1 collision
//!
//! Ruleset
//!     annotate-v1 (gazetteer 3f2a9c01d4e5b6a7)
//! ```
//!
//! ## Annotate
//!
//! ```text
//! texts/day1.txt → out/day1.html (3 annotations)
//! texts/day2.txt (current)
//!
//! Annotated 1 file, 1 current, 3 annotations
//! ```
//!
//! ## Extract
//!
//! ```text
//! Ruleset: annotate-v1 (gazetteer 3f2a9c01d4e5b6a7)
//! 001 people Simon Peter (Cephas)
//! 002 places Red Sea
//! 003 keywords bread
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::batch::{BatchEvent, BatchSummary};
use crate::gazetteer::Gazetteer;
use crate::render::{Annotation, Ruleset};
use crate::types::Layer;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// `n` followed by `word`, pluralized with a trailing `s` unless `n == 1`.
fn count(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

// ============================================================================
// Check
// ============================================================================

/// Format the gazetteer inventory and ruleset identity.
pub fn format_check_output(gazetteer: &Gazetteer, ruleset: &Ruleset) -> Vec<String> {
    let mut lines = vec!["Gazetteer".to_string()];
    lines.push(format!("    People: {}", count(gazetteer.people().len(), "term")));
    lines.push(format!("    Places: {}", count(gazetteer.places().len(), "term")));
    lines.push(format!(
        "    Keywords: {}",
        count(gazetteer.keywords().len(), "term")
    ));

    for layer in [Layer::Narrative, Layer::Cultural, Layer::Theological] {
        let n = gazetteer
            .keywords()
            .iter()
            .filter(|t| t.layer == Some(layer))
            .count();
        if n > 0 {
            lines.push(format!("        Layer {}: {}", layer.number(), n));
        }
    }

    let report = gazetteer.report();
    if report.blank + report.duplicates + report.collisions > 0 {
        lines.push(format!(
            "    Dropped: {} blank, {}, {}",
            report.blank,
            count(report.duplicates, "duplicate"),
            count(report.collisions, "collision")
        ));
    }

    lines.push(String::new());
    lines.push("Ruleset".to_string());
    lines.push(format!(
        "    {} (gazetteer {})",
        ruleset.name, ruleset.gazetteer
    ));
    lines
}

/// Print check output to stdout.
pub fn print_check_output(gazetteer: &Gazetteer, ruleset: &Ruleset) {
    for line in format_check_output(gazetteer, ruleset) {
        println!("{}", line);
    }
}

// ============================================================================
// Annotate
// ============================================================================

/// Format a single batch progress event.
pub fn format_batch_event(event: &BatchEvent) -> Vec<String> {
    match event {
        BatchEvent::Annotated {
            source,
            output,
            annotations,
        } => vec![format!(
            "{} \u{2192} {} ({})",
            source.display(),
            output.display(),
            count(*annotations, "annotation")
        )],
        BatchEvent::Skipped { source } => vec![format!("{} (current)", source.display())],
    }
}

/// One-line totals for a batch run.
pub fn format_batch_summary(summary: &BatchSummary) -> String {
    format!(
        "Annotated {}, {} current, {}",
        count(summary.annotated, "file"),
        summary.skipped,
        count(summary.annotations, "annotation")
    )
}

// ============================================================================
// Extract
// ============================================================================

/// Format the version marker and the annotations recovered from markup.
///
/// The highlighted text is shown in parentheses when it differs from the
/// canonical term (an alias or different casing).
pub fn format_extract_output(ruleset: Option<&Ruleset>, annotations: &[Annotation]) -> Vec<String> {
    let mut lines = vec![match ruleset {
        Some(r) => format!("Ruleset: {} (gazetteer {})", r.name, r.gazetteer),
        None => "Ruleset: none".to_string(),
    }];
    for (i, a) in annotations.iter().enumerate() {
        let mut line = format!("{} {} {}", format_index(i + 1), a.category, a.term);
        if a.text != a.term {
            line.push_str(&format!(" ({})", a.text));
        }
        lines.push(line);
    }
    lines
}

/// Print extract output to stdout.
pub fn print_extract_output(ruleset: Option<&Ruleset>, annotations: &[Annotation]) {
    for line in format_extract_output(ruleset, annotations) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
