//! End-to-end properties of the public annotation API.
//!
//! Each test builds a small gazetteer inline, runs the engine, and checks one
//! observable guarantee: escaping, disjoint spans, category priority,
//! capitalization, longest match, alias resolution, extraction order.

use verse_annotator::config::EngineConfig;
use verse_annotator::engine::Annotator;
use verse_annotator::gazetteer::Gazetteer;
use verse_annotator::render::extract_annotations;
use verse_annotator::types::{Category, PersonEntry, Span};

const NONE: &[&str] = &[];

fn engine(people: &[PersonEntry], places: &[&str], keywords: &[&str]) -> Annotator {
    Annotator::new(
        Gazetteer::build(people, places, keywords),
        &EngineConfig::default(),
    )
    .unwrap()
}

fn rich_engine() -> Annotator {
    engine(
        &[
            PersonEntry::new("Moses", &[]),
            PersonEntry::new("David", &["King David"]),
            PersonEntry::new("Simon Peter", &["Cephas", "Peter"]),
            PersonEntry::new("Jesus", &["Son of Man"]),
            PersonEntry::new("On", &[]),
        ],
        &["Egypt", "Red Sea", "City of David", "Galilee", "Sea of Galilee"],
        &["bread", "sea", "man", "king", "city", "Sabbath"],
    )
}

fn summary(spans: &[Span]) -> Vec<(Category, &str)> {
    spans
        .iter()
        .map(|s| (s.category, s.matched_text.as_str()))
        .collect()
}

#[test]
fn empty_gazetteer_only_escapes() {
    let a = engine(&[], NONE, NONE);
    let text = r#"<script>alert("Moses & 'Aaron'")</script>"#;
    assert_eq!(
        a.render(text),
        "&lt;script&gt;alert(&quot;Moses &amp; &#39;Aaron&#39;&quot;)&lt;/script&gt;"
    );
    assert!(a.find_spans(text).is_empty());
}

#[test]
fn spans_are_pairwise_disjoint() {
    let a = rich_engine();
    let text = "King David went up to the City of David; the Son of Man sailed \
                the Sea of Galilee, and Cephas, Peter, broke bread by the sea \
                on the Sabbath. The king of the city & the man said \"Egypt\".";
    let spans = a.find_spans(text);
    assert!(!spans.is_empty());
    for (i, x) in spans.iter().enumerate() {
        for y in &spans[i + 1..] {
            assert!(!x.overlaps(y), "{x:?} overlaps {y:?}");
        }
    }
    assert!(spans.windows(2).all(|w| w[0].start < w[1].start));
}

#[test]
fn places_beat_people_beat_keywords() {
    let a = rich_engine();
    let spans = a.find_spans("They reached the City of David with the Son of Man.");
    assert_eq!(
        summary(&spans),
        vec![
            (Category::Place, "City of David"),
            (Category::Person, "Son of Man"),
        ]
    );
}

#[test]
fn lowercase_short_name_is_not_a_person() {
    let a = rich_engine();
    assert!(a.find_spans("let us put it on the table").is_empty());
}

#[test]
fn capitalized_short_name_is_stable() {
    let a = rich_engine();
    let first = a.find_spans("On the third day");
    let second = a.find_spans("On the third day");
    assert_eq!(first, second);
    assert_eq!(summary(&first), vec![(Category::Person, "On")]);
}

#[test]
fn lowercase_person_name_is_skipped() {
    let a = rich_engine();
    assert!(a.find_spans("the moses basket").is_empty());
}

#[test]
fn longest_term_wins_within_category() {
    let a = rich_engine();
    let spans = a.find_spans("They fished the Sea of Galilee.");
    assert_eq!(summary(&spans), vec![(Category::Place, "Sea of Galilee")]);
}

#[test]
fn word_boundaries_are_respected() {
    let a = rich_engine();
    assert!(a.find_spans("breadth seashore Egyptian mankind").is_empty());
    let spans = a.find_spans("(bread), sea-bread");
    assert_eq!(
        summary(&spans),
        vec![
            (Category::Keyword, "bread"),
            (Category::Keyword, "sea"),
            (Category::Keyword, "bread"),
        ]
    );
}

#[test]
fn keyword_case_is_preserved_in_output() {
    let a = rich_engine();
    let spans = a.find_spans("BREAD of life");
    assert_eq!(spans[0].matched_text, "BREAD");
    assert_eq!(spans[0].canonical_term, "bread");
}

#[test]
fn aliases_resolve_to_primary_name() {
    let a = rich_engine();
    let annotations = extract_annotations(&a.render("Cephas and Peter and Simon Peter"));
    let terms: Vec<&str> = annotations.iter().map(|x| x.term.as_str()).collect();
    assert_eq!(terms, vec!["Simon Peter", "Simon Peter", "Simon Peter"]);
    let texts: Vec<&str> = annotations.iter().map(|x| x.text.as_str()).collect();
    assert_eq!(texts, vec!["Cephas", "Peter", "Simon Peter"]);
}

#[test]
fn extraction_matches_spans_in_order() {
    let a = rich_engine();
    let text = "Moses & King David ate bread near the Red Sea in Egypt";
    let spans = a.find_spans(text);
    let annotations = extract_annotations(&a.render(text));
    let from_spans: Vec<(Category, &str)> = spans
        .iter()
        .map(|s| (s.category, s.canonical_term.as_str()))
        .collect();
    let from_markup: Vec<(Category, &str)> = annotations
        .iter()
        .map(|x| (x.category, x.term.as_str()))
        .collect();
    assert_eq!(from_spans, from_markup);
    assert_eq!(
        from_markup,
        vec![
            (Category::Person, "Moses"),
            (Category::Person, "David"),
            (Category::Keyword, "bread"),
            (Category::Place, "Red Sea"),
            (Category::Place, "Egypt"),
        ]
    );
}

#[test]
fn moses_scenario() {
    let a = engine(
        &[PersonEntry::new("Moses", &[])],
        &["Red Sea", "Egypt"],
        NONE,
    );
    let text = "Moses led the people to the Red Sea near Egypt.";
    let spans = a.find_spans(text);
    let found: Vec<(Category, &str, usize)> = spans
        .iter()
        .map(|s| (s.category, s.matched_text.as_str(), s.start))
        .collect();
    assert_eq!(
        found,
        vec![
            (Category::Person, "Moses", 0),
            (Category::Place, "Red Sea", 28),
            (Category::Place, "Egypt", 41),
        ]
    );
}

#[test]
fn markup_never_leaks_raw_angle_brackets() {
    let a = rich_engine();
    let html = a.render("<b>Moses</b> & <i>Egypt</i>");
    let brackets = html
        .replace(|c: char| c != '<' && c != '>', "")
        .len();
    // Only marker tags contribute brackets: two spans, open + close each.
    assert_eq!(brackets, 8);
    assert_eq!(extract_annotations(&html).len(), 2);
}

#[test]
fn highlights_index_the_raw_text() {
    let a = rich_engine();
    let text = "\"Cephas\" & 'Moses' crossed the Red Sea";
    for h in a.highlights(text) {
        assert_eq!(&text[h.start..h.end], h.text);
    }
}
