//! HTML escaping with an offset map back to the raw text.
//!
//! Matching runs over the escaped text, so span offsets are escaped-text
//! offsets. [`EscapedText`] remembers where every entity landed so that
//! offsets can be mapped back to the raw input and so that the matcher can
//! reject candidates that would cut through an entity (the keyword "amp"
//! must never match inside `&amp;`).

use std::ops::Range;

/// Entity for a character that needs escaping, if any.
fn entity_for(c: char) -> Option<&'static str> {
    match c {
        '&' => Some("&amp;"),
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        '"' => Some("&quot;"),
        '\'' => Some("&#39;"),
        _ => None,
    }
}

/// Escape `&`, `<`, `>`, `"` and `'`.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match entity_for(c) {
            Some(entity) => out.push_str(entity),
            None => out.push(c),
        }
    }
    out
}

/// Reverse [`escape_html`]. Only the five entities it produces are decoded;
/// anything else passes through untouched.
pub fn unescape_html(escaped: &str) -> String {
    const ENTITIES: [(&str, char); 5] = [
        ("&amp;", '&'),
        ("&lt;", '<'),
        ("&gt;", '>'),
        ("&quot;", '"'),
        ("&#39;", '\''),
    ];

    let mut out = String::with_capacity(escaped.len());
    let mut rest = escaped;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        match ENTITIES.iter().find(|(entity, _)| rest.starts_with(entity)) {
            Some((entity, c)) => {
                out.push(*c);
                rest = &rest[entity.len()..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[derive(Debug, Clone, Copy)]
struct Entity {
    start: usize,
    end: usize,
    /// Bytes added by this entity and every entity before it.
    shift: usize,
}

/// Escaped text plus the positions of the entities escaping introduced.
#[derive(Debug, Clone)]
pub struct EscapedText {
    html: String,
    entities: Vec<Entity>,
}

impl EscapedText {
    pub fn new(raw: &str) -> Self {
        let mut html = String::with_capacity(raw.len());
        let mut entities = Vec::new();
        let mut shift = 0;
        for c in raw.chars() {
            match entity_for(c) {
                Some(entity) => {
                    let start = html.len();
                    html.push_str(entity);
                    shift += entity.len() - c.len_utf8();
                    entities.push(Entity {
                        start,
                        end: html.len(),
                        shift,
                    });
                }
                None => html.push(c),
            }
        }
        Self { html, entities }
    }

    pub fn as_str(&self) -> &str {
        &self.html
    }

    pub fn is_empty(&self) -> bool {
        self.html.is_empty()
    }

    /// Map an escaped offset back to the raw text.
    ///
    /// Offsets strictly inside an entity map to the raw offset of the
    /// escaped character; spans never end there because of
    /// [`splits_entity`](Self::splits_entity).
    pub fn to_raw(&self, offset: usize) -> usize {
        let idx = self.entities.partition_point(|e| e.end <= offset);
        let shift = idx.checked_sub(1).map_or(0, |i| self.entities[i].shift);
        match self.entities.get(idx) {
            Some(e) if e.start < offset => e.start - shift,
            _ => offset - shift,
        }
    }

    /// True when `range` starts or ends strictly inside an entity.
    pub fn splits_entity(&self, range: Range<usize>) -> bool {
        let first = self.entities.partition_point(|e| e.end <= range.start);
        self.entities[first..]
            .iter()
            .take_while(|e| e.start < range.end)
            .any(|e| {
                let inside = |pos: usize| e.start < pos && pos < e.end;
                inside(range.start) || inside(range.end)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_all_five_characters() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/a&gt;"
        );
    }

    #[test]
    fn plain_text_is_unchanged() {
        assert_eq!(escape_html("In the beginning"), "In the beginning");
        assert_eq!(escape_html(""), "");
    }

    #[test]
    fn unescape_reverses_escape() {
        let raw = r#"a<b>&"c"'d' &amp; literal"#;
        assert_eq!(unescape_html(&escape_html(raw)), raw);
    }

    #[test]
    fn unescape_leaves_unknown_entities() {
        assert_eq!(unescape_html("&nbsp;&amp;&"), "&nbsp;&&");
    }

    #[test]
    fn escaped_text_matches_escape_html() {
        let raw = "Moses & Aaron said \"go\"";
        assert_eq!(EscapedText::new(raw).as_str(), escape_html(raw));
    }

    #[test]
    fn to_raw_accounts_for_entities() {
        // raw:     a&b<c
        // escaped: a&amp;b&lt;c
        let text = EscapedText::new("a&b<c");
        assert_eq!(text.to_raw(0), 0);
        assert_eq!(text.to_raw(1), 1);
        assert_eq!(text.to_raw(6), 2); // 'b'
        assert_eq!(text.to_raw(7), 3); // '&lt;'
        assert_eq!(text.to_raw(11), 4); // 'c'
        assert_eq!(text.to_raw(12), 5); // end
    }

    #[test]
    fn to_raw_with_multibyte_text() {
        let raw = "é & ö";
        let text = EscapedText::new(raw);
        let o = text.as_str().find('ö').unwrap();
        assert_eq!(text.to_raw(o), raw.find('ö').unwrap());
    }

    #[test]
    fn splits_entity_detects_cuts() {
        // escaped: x&amp;y
        let text = EscapedText::new("x&y");
        assert!(text.splits_entity(2..5)); // "amp"
        assert!(text.splits_entity(0..3));
        assert!(!text.splits_entity(0..1));
        assert!(!text.splits_entity(1..6)); // whole entity
        assert!(!text.splits_entity(0..7));
        assert!(!text.splits_entity(6..7));
    }
}
