//! Cross-category overlap resolution.
//!
//! The matcher produces three candidate lists, each internally
//! non-overlapping. Resolution merges them into one position-sorted,
//! pairwise-disjoint list using first-claim-wins in priority order:
//!
//! 1. every place span is kept,
//! 2. a person span is kept unless it intersects a kept place,
//! 3. a keyword span is kept unless it intersects a kept place or person.
//!
//! Within a category the matcher's discovery order decides (longest term
//! first, then left to right). Nothing here depends on hash iteration or
//! threading, so identical input always resolves identically.

use crate::types::Span;
use std::collections::BTreeMap;
use std::ops::Range;

/// Ordered set of pairwise-disjoint half-open byte ranges.
///
/// Because ranges never overlap, sorting by start also sorts by end, so an
/// intersection query only has to look at the last range starting before the
/// probe's end.
#[derive(Debug, Default, Clone)]
pub struct SpanSet {
    ranges: BTreeMap<usize, usize>,
}

impl SpanSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if `range` shares at least one byte with a claimed range.
    pub fn intersects(&self, range: &Range<usize>) -> bool {
        self.ranges
            .range(..range.end)
            .next_back()
            .is_some_and(|(_, &end)| end > range.start)
    }

    /// Claim `range` unless it intersects an existing claim.
    /// Returns whether the claim succeeded.
    pub fn claim(&mut self, range: Range<usize>) -> bool {
        if range.is_empty() || self.intersects(&range) {
            return false;
        }
        self.ranges.insert(range.start, range.end);
        true
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.ranges.len()
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

/// Merge per-category candidates into one non-overlapping, start-sorted list.
pub fn resolve(places: Vec<Span>, people: Vec<Span>, keywords: Vec<Span>) -> Vec<Span> {
    let mut claimed = SpanSet::new();
    let mut kept: Vec<Span> = places
        .into_iter()
        .chain(people)
        .chain(keywords)
        .filter(|span| claimed.claim(span.range()))
        .collect();
    kept.sort_by_key(|span| span.start);
    kept
}
