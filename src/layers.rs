//! Keyword layer classification.
//!
//! Every keyword term is tagged with a semantic layer:
//!
//! | Layer | Meaning | Examples |
//! |-------|---------|----------|
//! | 1 | narrative-concrete | bread, net, donkey, lamp |
//! | 2 | cultural-historical | Sabbath, synagogue, denarius |
//! | 3 | theological-abstract | grace, covenant, atonement |
//!
//! Classification is an exact (case-insensitive) lookup against three fixed
//! word lists, with a substring fallback: a term that contains, or is
//! contained by, a listed layer-1 word is layer 1; otherwise the same check
//! runs against layer 2; everything else is layer 3.
//!
//! The layer is metadata only. The matcher highlights every keyword
//! occurrence regardless of layer.

use crate::types::Layer;

const NARRATIVE: &[&str] = &[
    "anchor", "ark", "arrow", "axe", "basket", "boat", "bow", "bread", "bush", "camel",
    "chariot", "cistern", "cloak", "coin", "cup", "donkey", "dove", "eagle", "fig", "fire",
    "fish", "flock", "gate", "goat", "grain", "harp", "honey", "horse", "jar", "lamb", "lamp",
    "lion", "loaf", "locust", "manna", "millstone", "mustard seed", "net", "oil", "olive",
    "ox", "plough", "plow", "raven", "reed", "rock", "rod", "robe", "rope", "sandal", "seed",
    "serpent", "sheep", "shield", "sling", "spear", "staff", "stone", "sword", "tent",
    "thorn", "tree", "vine", "vineyard", "water", "well", "wheat", "wine", "wineskin",
    "wolf", "yoke",
];

const CULTURAL: &[&str] = &[
    "altar", "ark of the covenant", "centurion", "circumcision", "denarius", "ephod",
    "feast of tabernacles", "firstborn", "high priest", "incense", "jubilee", "levite",
    "nazirite", "passover", "pentecost", "pharisee", "phylactery", "priest", "publican",
    "sabbath", "sackcloth", "sadducee", "sanhedrin", "scribe", "shekel", "synagogue",
    "tabernacle", "talent", "tax collector", "temple", "tithe", "unleavened bread",
];

const THEOLOGICAL: &[&str] = &[
    "atonement", "covenant", "eternal life", "faith", "forgiveness", "glory", "grace",
    "holiness", "hope", "justification", "kingdom of god", "kingdom of heaven", "love",
    "mercy", "propitiation", "reconciliation", "redemption", "repentance", "resurrection",
    "righteousness", "salvation", "sanctification", "sin", "wisdom", "worship",
];

/// Classify a keyword term into its semantic layer. Total: never fails.
pub fn classify(term: &str) -> Layer {
    let needle = term.trim().to_lowercase();

    for (list, layer) in [
        (NARRATIVE, Layer::Narrative),
        (CULTURAL, Layer::Cultural),
        (THEOLOGICAL, Layer::Theological),
    ] {
        if list.contains(&needle.as_str()) {
            return layer;
        }
    }

    if needle.is_empty() {
        return Layer::Theological;
    }
    let related = |word: &&str| needle.contains(*word) || word.contains(needle.as_str());
    if NARRATIVE.iter().any(related) {
        Layer::Narrative
    } else if CULTURAL.iter().any(related) {
        Layer::Cultural
    } else {
        Layer::Theological
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_matches_each_layer() {
        assert_eq!(classify("bread"), Layer::Narrative);
        assert_eq!(classify("Sabbath"), Layer::Cultural);
        assert_eq!(classify("grace"), Layer::Theological);
    }

    #[test]
    fn exact_match_is_case_insensitive() {
        assert_eq!(classify("TEMPLE"), Layer::Cultural);
        assert_eq!(classify("Kingdom of God"), Layer::Theological);
    }

    #[test]
    fn exact_match_beats_substring_fallback() {
        // "unleavened bread" contains the layer-1 word "bread" but is listed in layer 2.
        assert_eq!(classify("unleavened bread"), Layer::Cultural);
        // "ark of the covenant" contains "ark" (layer 1) but is listed in layer 2.
        assert_eq!(classify("Ark of the Covenant"), Layer::Cultural);
    }

    #[test]
    fn term_containing_layer_one_word() {
        assert_eq!(classify("fishing nets"), Layer::Narrative);
        assert_eq!(classify("barley loaves"), Layer::Theological);
    }

    #[test]
    fn term_contained_by_layer_one_word() {
        // "mustard" only appears inside "mustard seed".
        assert_eq!(classify("mustard"), Layer::Narrative);
    }

    #[test]
    fn substring_fallback_to_layer_two() {
        assert_eq!(classify("temple courts"), Layer::Cultural);
        assert_eq!(classify("chief priests"), Layer::Cultural);
    }

    #[test]
    fn unknown_terms_default_to_layer_three() {
        assert_eq!(classify("sovereignty"), Layer::Theological);
        assert_eq!(classify(""), Layer::Theological);
        assert_eq!(classify("   "), Layer::Theological);
    }
}
