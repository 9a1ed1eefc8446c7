use super::reading_order::{fragments_in_range, PageRange};
use crate::canonical::CanonicalTable;
use crate::types::*;

// SectionBuilder - turns per-item match results into page-bounded sections.
//
// A matched item runs from its header page up to the page before the next
// matched item (MISSING items are skipped when looking for that boundary).
// The end is clamped to the start page, so an item sharing a page with its
// successor, or physically placed after it, still owns its own header page.
pub struct SectionBuilder<'a> {
    document: &'a Document,
    table: &'a CanonicalTable,
}

impl<'a> SectionBuilder<'a> {
    pub fn new(document: &'a Document, table: &'a CanonicalTable) -> Self {
        Self { document, table }
    }

    /// `results` must hold one entry per canonical item, in item-number order.
    pub fn build(&self, results: &[MatchResult]) -> SectionMap {
        let sections: Vec<Section> = results
            .iter()
            .enumerate()
            .map(|(index, result)| self.build_section(result, next_matched_page(results, index)))
            .collect();

        tracing::debug!(
            sections = sections.len(),
            assigned_fragments = sections.iter().map(|s| s.content.len()).sum::<usize>(),
            "section building finished"
        );
        SectionMap { sections }
    }

    fn build_section(&self, result: &MatchResult, next_page: Option<u32>) -> Section {
        let title = self
            .table
            .get(result.item_number)
            .map(|item| item.full_caption())
            .unwrap_or_else(|| format!("ITEM {}", result.item_number));

        let start_page = match (result.is_matched(), result.page_no) {
            (true, Some(page)) => page,
            _ => {
                return Section {
                    item_number: result.item_number,
                    title,
                    header_text: None,
                    page_no: None,
                    end_page: None,
                    match_type: MatchType::Missing,
                    confidence: None,
                    content: Vec::new(),
                }
            }
        };

        let end_page = next_page.map(|next| next.saturating_sub(1).max(start_page));
        let range = PageRange::new(start_page, end_page.map(|end| end + 1));

        let content = fragments_in_range(self.document, range)
            .into_iter()
            .enumerate()
            .map(|(sequence, fragment)| SectionContent {
                self_ref: fragment.self_ref.clone(),
                text: fragment.text.clone(),
                page_no: fragment.page_no,
                sequence,
                top: fragment.top,
                left: fragment.left,
            })
            .collect();

        Section {
            item_number: result.item_number,
            title,
            header_text: result.header_text.clone(),
            page_no: Some(start_page),
            end_page,
            match_type: result.match_type,
            confidence: result.confidence,
            content,
        }
    }
}

/// Page of the first matched result after `index`.
fn next_matched_page(results: &[MatchResult], index: usize) -> Option<u32> {
    results[index + 1..]
        .iter()
        .filter(|r| r.is_matched())
        .find_map(|r| r.page_no)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matched(n: ItemNumber, page: u32) -> MatchResult {
        MatchResult {
            item_number: n,
            header_text: Some(format!("ITEM {n}")),
            page_no: Some(page),
            match_type: MatchType::Exact,
            confidence: Some(100.0),
            scheme: Some("item".to_string()),
            fragment_ref: None,
        }
    }

    fn table(n: u32) -> CanonicalTable {
        CanonicalTable::new(
            (1..=n)
                .map(|i| crate::canonical::CanonicalItem::new(i, format!("TITLE {i}")))
                .collect(),
        )
        .unwrap()
    }

    fn page_doc(pages: u32) -> Document {
        Document::new(
            (1..=pages)
                .flat_map(|p| {
                    vec![
                        TextFragment::new(format!("p{p}-low"), "low", FragmentLabel::Text, p, 100.0, 72.0),
                        TextFragment::new(format!("p{p}-high"), "high", FragmentLabel::Text, p, 700.0, 72.0),
                    ]
                })
                .collect(),
        )
    }

    #[test]
    fn end_page_skips_missing_items() {
        let doc = page_doc(12);
        let table = table(4);
        let results = vec![
            matched(1, 1),
            MatchResult::missing(2),
            matched(3, 6),
            matched(4, 10),
        ];

        let map = SectionBuilder::new(&doc, &table).build(&results);
        assert_eq!(map.len(), 4);

        let first = map.get(1).unwrap();
        assert_eq!((first.page_no, first.end_page), (Some(1), Some(5)));
        assert_eq!(first.content.len(), 10);

        let missing = map.get(2).unwrap();
        assert_eq!(missing.match_type, MatchType::Missing);
        assert!(missing.page_no.is_none() && missing.end_page.is_none());
        assert!(missing.content.is_empty());

        let last = map.get(4).unwrap();
        assert_eq!((last.page_no, last.end_page), (Some(10), None));
        assert_eq!(last.content.len(), 6);
        assert_eq!(last.title, "ITEM 4: TITLE 4");
    }

    #[test]
    fn content_is_in_reading_order_with_sequence() {
        let doc = page_doc(3);
        let table = table(2);
        let map = SectionBuilder::new(&doc, &table).build(&[matched(1, 1), matched(2, 3)]);

        let refs: Vec<_> = map.get(1).unwrap().content.iter().map(|c| c.self_ref.as_str()).collect();
        assert_eq!(refs, vec!["p1-high", "p1-low", "p2-high", "p2-low"]);
        let sequences: Vec<_> = map.get(1).unwrap().content.iter().map(|c| c.sequence).collect();
        assert_eq!(sequences, vec![0, 1, 2, 3]);
    }

    #[test]
    fn shared_and_backward_pages_are_clamped() {
        let doc = page_doc(10);
        let table = table(3);
        // Item 2 shares item 1's page; item 3 sits physically before item 2.
        let results = vec![matched(1, 4), matched(2, 4), matched(3, 2)];
        let map = SectionBuilder::new(&doc, &table).build(&results);

        let first = map.get(1).unwrap();
        assert_eq!(first.end_page, Some(4));
        assert_eq!(first.content.len(), 2);

        let second = map.get(2).unwrap();
        assert_eq!(second.end_page, Some(4));

        let third = map.get(3).unwrap();
        assert_eq!((third.page_no, third.end_page), (Some(2), None));
    }

    #[test]
    fn all_missing_yields_empty_sections() {
        let doc = page_doc(3);
        let table = table(3);
        let results: Vec<_> = (1..=3).map(MatchResult::missing).collect();
        let map = SectionBuilder::new(&doc, &table).build(&results);

        assert_eq!(map.len(), 3);
        assert_eq!(map.count(MatchType::Missing), 3);
        assert!(map.iter().all(|s| s.content.is_empty()));
    }
}
