//! Gazetteer construction and loading.
//!
//! The gazetteer is the immutable term inventory the matcher compiles. It is
//! built once from three source lists and then only read.
//!
//! ## Build steps
//!
//! 1. **Flatten people**: each person's primary name and every alias become
//!    separate terms whose canonical form is the primary name.
//! 2. **Discard blanks**: empty or whitespace-only strings (and people with
//!    no name) are dropped silently.
//! 3. **Deduplicate**: within a category, the first case-insensitive
//!    occurrence of a string wins.
//! 4. **Remove collisions**: a place already claimed by people is dropped; a
//!    keyword already claimed by people or places is dropped.
//! 5. **Classify keywords** into layers ([`crate::layers`]).
//! 6. **Sort** each category by descending character length. The sort is
//!    stable, so equal-length terms keep their registration order.
//!
//! Note the collision step gives people precedence over places, while at
//! match time places are swept first and win overlaps. Both stages are
//! deliberate and applied in that order.
//!
//! ## Source files
//!
//! ```text
//! gazetteer/
//! ├── people.json     # [{"name": "Simon Peter", "aliases": ["Cephas", "Peter"]}, ...]
//! ├── places.txt      # one term per line, '#' comments
//! └── keywords.json   # or a JSON array of strings
//! ```

use crate::config::GazetteerConfig;
use crate::layers;
use crate::types::{Category, PersonEntry, Term};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GazetteerError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("JSON error in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Raw term lists as supplied by the host, before any cleanup.
#[derive(Debug, Clone, Default)]
pub struct GazetteerSources {
    pub people: Vec<PersonEntry>,
    pub places: Vec<String>,
    pub keywords: Vec<String>,
}

/// Counts of what the builder kept and dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub people: usize,
    pub places: usize,
    pub keywords: usize,
    pub blank: usize,
    pub duplicates: usize,
    pub collisions: usize,
}

/// Immutable term inventory, one longest-first list per category.
#[derive(Debug, Clone, Default)]
pub struct Gazetteer {
    people: Vec<Term>,
    places: Vec<Term>,
    keywords: Vec<Term>,
    report: BuildReport,
}

impl Gazetteer {
    /// Build a gazetteer from the three source lists. Never fails.
    pub fn build<P, K>(people: &[PersonEntry], places: &[P], keywords: &[K]) -> Self
    where
        P: AsRef<str>,
        K: AsRef<str>,
    {
        let mut report = BuildReport::default();

        let mut person_keys = HashSet::new();
        let mut people_terms = Vec::new();
        for entry in people {
            let Some(name) = entry.name.as_deref().map(str::trim).filter(|n| !n.is_empty())
            else {
                report.blank += 1;
                continue;
            };
            for text in std::iter::once(name).chain(entry.aliases.iter().map(|a| a.trim())) {
                if text.is_empty() {
                    report.blank += 1;
                } else if person_keys.insert(fold(text)) {
                    people_terms.push(Term {
                        text: text.to_string(),
                        canonical: name.to_string(),
                        category: Category::Person,
                        layer: None,
                    });
                } else {
                    report.duplicates += 1;
                }
            }
        }

        let mut place_keys = HashSet::new();
        let mut place_terms = Vec::new();
        for text in places.iter().map(|p| p.as_ref().trim()) {
            let key = fold(text);
            if text.is_empty() {
                report.blank += 1;
            } else if person_keys.contains(&key) {
                report.collisions += 1;
            } else if place_keys.insert(key) {
                place_terms.push(Term {
                    text: text.to_string(),
                    canonical: text.to_string(),
                    category: Category::Place,
                    layer: None,
                });
            } else {
                report.duplicates += 1;
            }
        }

        let mut keyword_keys = HashSet::new();
        let mut keyword_terms = Vec::new();
        for text in keywords.iter().map(|k| k.as_ref().trim()) {
            let key = fold(text);
            if text.is_empty() {
                report.blank += 1;
            } else if !keyword_keys.insert(key.clone()) {
                report.duplicates += 1;
            } else if person_keys.contains(&key) || place_keys.contains(&key) {
                report.collisions += 1;
            } else {
                keyword_terms.push(Term {
                    text: text.to_string(),
                    canonical: text.to_string(),
                    category: Category::Keyword,
                    layer: Some(layers::classify(text)),
                });
            }
        }

        for terms in [&mut people_terms, &mut place_terms, &mut keyword_terms] {
            terms.sort_by_key(|t| std::cmp::Reverse(t.char_len()));
        }

        report.people = people_terms.len();
        report.places = place_terms.len();
        report.keywords = keyword_terms.len();
        tracing::debug!(?report, "built gazetteer");

        Self {
            people: people_terms,
            places: place_terms,
            keywords: keyword_terms,
            report,
        }
    }

    /// Build from loaded source lists.
    pub fn from_sources(sources: &GazetteerSources) -> Self {
        Self::build(&sources.people, &sources.places, &sources.keywords)
    }

    pub fn people(&self) -> &[Term] {
        &self.people
    }

    pub fn places(&self) -> &[Term] {
        &self.places
    }

    pub fn keywords(&self) -> &[Term] {
        &self.keywords
    }

    /// Terms of one category, longest first.
    pub fn terms(&self, category: Category) -> &[Term] {
        match category {
            Category::Place => &self.places,
            Category::Person => &self.people,
            Category::Keyword => &self.keywords,
        }
    }

    pub fn report(&self) -> &BuildReport {
        &self.report
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty() && self.places.is_empty() && self.keywords.is_empty()
    }

    pub fn len(&self) -> usize {
        self.people.len() + self.places.len() + self.keywords.len()
    }

    /// SHA-256 over every term in sweep order, hex encoded.
    ///
    /// Changes whenever a term, its canonical form, or the ordering changes,
    /// which is what annotation caches key on.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for category in Category::SWEEP_ORDER {
            hasher.update(category.as_str().as_bytes());
            hasher.update(b"\0");
            for term in self.terms(category) {
                hasher.update(term.text.as_bytes());
                hasher.update(b"\0");
                hasher.update(term.canonical.as_bytes());
                hasher.update(b"\n");
            }
        }
        format!("{:x}", hasher.finalize())
    }
}

/// Case-insensitive key for deduplication.
fn fold(text: &str) -> String {
    text.to_lowercase()
}

// =============================================================================
// Source loading
// =============================================================================

/// Load the three source lists named in config.
///
/// Relative paths resolve against `base_dir` (the config file's directory).
/// A list whose path is not configured is empty.
pub fn load_sources(
    config: &GazetteerConfig,
    base_dir: &Path,
) -> Result<GazetteerSources, GazetteerError> {
    let resolve = |p: &Option<String>| p.as_ref().map(|p| base_dir.join(p));
    let people = match resolve(&config.people) {
        Some(path) => load_people(&path)?,
        None => Vec::new(),
    };
    let places = match resolve(&config.places) {
        Some(path) => load_term_list(&path)?,
        None => Vec::new(),
    };
    let keywords = match resolve(&config.keywords) {
        Some(path) => load_term_list(&path)?,
        None => Vec::new(),
    };
    tracing::debug!(
        people = people.len(),
        places = places.len(),
        keywords = keywords.len(),
        "loaded gazetteer sources"
    );
    Ok(GazetteerSources {
        people,
        places,
        keywords,
    })
}

fn read(path: &Path) -> Result<String, GazetteerError> {
    fs::read_to_string(path).map_err(|source| GazetteerError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Load people from a JSON array of `{name, aliases}` records.
pub fn load_people(path: &Path) -> Result<Vec<PersonEntry>, GazetteerError> {
    let content = read(path)?;
    serde_json::from_str(&content).map_err(|source| GazetteerError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a place or keyword list.
///
/// `.json` files hold an array of strings (nulls are skipped); anything else
/// is read as one term per line with `#` comments and blank lines ignored.
pub fn load_term_list(path: &Path) -> Result<Vec<String>, GazetteerError> {
    let content = read(path)?;
    if path.extension().is_some_and(|ext| ext == "json") {
        let entries: Vec<Option<String>> =
            serde_json::from_str(&content).map_err(|source| GazetteerError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        let skipped = entries.iter().filter(|e| e.is_none()).count();
        if skipped > 0 {
            tracing::warn!(path = %path.display(), skipped, "skipped null gazetteer entries");
        }
        Ok(entries.into_iter().flatten().collect())
    } else {
        Ok(parse_term_lines(&content))
    }
}

fn parse_term_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect()
}
