//! Shared types used across the annotation pipeline.
//!
//! Terms come out of the gazetteer builder, spans come out of the matcher and
//! resolver, and highlights/annotations are what hosts consume. Source
//! records (people, verses) deserialize from JSON; highlights serialize to
//! JSON for the `spans` command.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// Entity category of a gazetteer term.
///
/// Declaration order is match-time priority: places beat people beat keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "places")]
    Place,
    #[serde(rename = "people")]
    Person,
    #[serde(rename = "keywords")]
    Keyword,
}

impl Category {
    /// All categories in sweep order.
    pub const SWEEP_ORDER: [Category; 3] = [Category::Place, Category::Person, Category::Keyword];

    /// Discriminator emitted in markup (`people` | `places` | `keywords`).
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Place => "places",
            Category::Person => "people",
            Category::Keyword => "keywords",
        }
    }

    /// Inverse of [`Category::as_str`].
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "places" => Some(Category::Place),
            "people" => Some(Category::Person),
            "keywords" => Some(Category::Keyword),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Semantic layer of a keyword term. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Layer {
    /// Concrete narrative objects, animals, implements.
    Narrative = 1,
    /// Cultural and historical artifacts and practices.
    Cultural = 2,
    /// Theological and abstract nouns.
    Theological = 3,
}

impl Layer {
    pub fn number(self) -> u8 {
        self as u8
    }
}

impl From<Layer> for u8 {
    fn from(layer: Layer) -> u8 {
        layer.number()
    }
}

impl TryFrom<u8> for Layer {
    type Error = String;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        match n {
            1 => Ok(Layer::Narrative),
            2 => Ok(Layer::Cultural),
            3 => Ok(Layer::Theological),
            other => Err(format!("keyword layer must be 1, 2 or 3, got {other}")),
        }
    }
}

/// One recognizable string in the gazetteer.
///
/// Aliases are separate terms whose `canonical` is the person's primary name.
/// For places and keywords `canonical == text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    pub text: String,
    pub canonical: String,
    pub category: Category,
    pub layer: Option<Layer>,
}

impl Term {
    /// Length in characters, the sort key for longest-match-first.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// A person record as supplied by the host: primary name plus aliases.
///
/// `name` is optional so that incomplete source records deserialize; such
/// entries are skipped at build time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PersonEntry {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl PersonEntry {
    pub fn new(name: &str, aliases: &[&str]) -> Self {
        Self {
            name: Some(name.to_string()),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// A numbered verse, the unit of [`render_verses`](crate::render::render_verses).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Verse {
    pub number: u32,
    pub text: String,
}

/// A resolved match of one term against escaped text.
///
/// `start`/`end` are byte offsets into the HTML-escaped text; `matched_text`
/// is the escaped slice `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub category: Category,
    pub matched_text: String,
    pub canonical_term: String,
    pub layer: Option<Layer>,
}

impl Span {
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Half-open interval intersection.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// A resolved span mapped back onto the raw (unescaped) input, for hosts
/// that bind their own UI instead of consuming markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Highlight {
    pub start: usize,
    pub end: usize,
    pub category: Category,
    pub term: String,
    pub text: String,
}
