// Reading-order sequencer
//
// Single definition of "document order": page ascending, then top descending
// (coordinates have a bottom-left origin), then left ascending. Every stage that
// walks fragments in order goes through this module.

use crate::types::{Document, TextFragment};
use std::cmp::Ordering;

/// Half-open page range `[start, end)`; `end = None` is open-ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub start: u32,
    pub end: Option<u32>,
}

impl PageRange {
    pub fn new(start: u32, end: Option<u32>) -> Self {
        Self { start, end }
    }

    pub fn all() -> Self {
        Self::new(0, None)
    }

    pub fn contains(&self, page_no: u32) -> bool {
        page_no >= self.start && self.end.map_or(true, |end| page_no < end)
    }
}

/// Composite reading-order key. `total_cmp` keeps the order total even for NaN.
pub fn compare_reading_order(a: &TextFragment, b: &TextFragment) -> Ordering {
    a.page_no
        .cmp(&b.page_no)
        .then_with(|| b.top.total_cmp(&a.top))
        .then_with(|| a.left.total_cmp(&b.left))
}

/// Stable sort, so fragments with identical keys keep their insertion order.
pub fn sort_in_reading_order(fragments: &mut [&TextFragment]) {
    fragments.sort_by(|a, b| compare_reading_order(a, b));
}

/// Fragments whose page falls inside `range`, in reading order.
pub fn fragments_in_range(document: &Document, range: PageRange) -> Vec<&TextFragment> {
    let mut selected: Vec<&TextFragment> = document
        .fragments
        .iter()
        .filter(|f| range.contains(f.page_no))
        .collect();
    sort_in_reading_order(&mut selected);
    selected
}

/// Text of pages `0..=last_page` in reading order, joined by single spaces.
pub fn first_pages_text(document: &Document, last_page: u32) -> String {
    fragments_in_range(document, PageRange::new(0, Some(last_page.saturating_add(1))))
        .iter()
        .map(|f| f.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FragmentLabel;

    fn frag(r: &str, page: u32, top: f64, left: f64) -> TextFragment {
        TextFragment::new(r, r, FragmentLabel::Text, page, top, left)
    }

    fn refs(fragments: &[&TextFragment]) -> Vec<String> {
        fragments.iter().map(|f| f.self_ref.clone()).collect()
    }

    #[test]
    fn orders_by_page_then_top_then_left() {
        let doc = Document::new(vec![
            frag("p2", 2, 700.0, 50.0),
            frag("p1-low", 1, 100.0, 50.0),
            frag("p1-high-right", 1, 700.0, 300.0),
            frag("p1-high-left", 1, 700.0, 50.0),
        ]);

        let ordered = fragments_in_range(&doc, PageRange::all());
        assert_eq!(
            refs(&ordered),
            vec!["p1-high-left", "p1-high-right", "p1-low", "p2"]
        );
    }

    #[test]
    fn higher_fragment_wins_over_left_position() {
        // Further right but higher on the page: read first.
        let doc = Document::new(vec![
            frag("left-lower", 3, 400.0, 10.0),
            frag("right-higher", 3, 401.0, 400.0),
        ]);
        let ordered = fragments_in_range(&doc, PageRange::all());
        assert_eq!(refs(&ordered), vec!["right-higher", "left-lower"]);
    }

    #[test]
    fn identical_keys_keep_insertion_order() {
        let doc = Document::new(vec![
            frag("a", 1, 500.0, 72.0),
            frag("b", 1, 500.0, 72.0),
            frag("c", 1, 500.0, 72.0),
        ]);
        let ordered = fragments_in_range(&doc, PageRange::all());
        assert_eq!(refs(&ordered), vec!["a", "b", "c"]);
    }

    #[test]
    fn range_is_half_open() {
        let doc = Document::new(vec![
            frag("p1", 1, 0.0, 0.0),
            frag("p2", 2, 0.0, 0.0),
            frag("p3", 3, 0.0, 0.0),
            frag("p4", 4, 0.0, 0.0),
        ]);
        let ordered = fragments_in_range(&doc, PageRange::new(2, Some(4)));
        assert_eq!(refs(&ordered), vec!["p2", "p3"]);

        let open = fragments_in_range(&doc, PageRange::new(3, None));
        assert_eq!(refs(&open), vec!["p3", "p4"]);
    }

    #[test]
    fn first_pages_text_joins_in_reading_order() {
        let doc = Document::new(vec![
            TextFragment::new("b", "second", FragmentLabel::Text, 1, 100.0, 0.0),
            TextFragment::new("a", "first", FragmentLabel::Text, 1, 200.0, 0.0),
            TextFragment::new("c", "third", FragmentLabel::Text, 2, 900.0, 0.0),
            TextFragment::new("d", "beyond", FragmentLabel::Text, 3, 900.0, 0.0),
        ]);
        assert_eq!(first_pages_text(&doc, 2), "first second third");
    }
}
