use super::similarity::SimilarityScorer;
use crate::canonical::{CanonicalItem, CanonicalTable};
use crate::config::SelectionMode;
use crate::types::*;

// CanonicalMatcher - maps every canonical item onto at most one header candidate.
// Exact numbering hits win; fuzzy title similarity is the fallback.
pub struct CanonicalMatcher<'a> {
    table: &'a CanonicalTable,
    scorer: &'a dyn SimilarityScorer,
    selection: SelectionMode,
}

impl<'a> CanonicalMatcher<'a> {
    pub fn new(
        table: &'a CanonicalTable,
        scorer: &'a dyn SimilarityScorer,
        selection: SelectionMode,
    ) -> Self {
        Self {
            table,
            scorer,
            selection,
        }
    }

    /// One result per canonical item, in item-number order.
    ///
    /// `candidates` must already be in reading order; "first" below always
    /// means first in that order.
    pub fn match_all(&self, candidates: &[HeaderCandidate]) -> Vec<MatchResult> {
        let results: Vec<MatchResult> = self
            .table
            .items()
            .iter()
            .map(|item| self.match_item(item, candidates))
            .collect();

        tracing::debug!(
            exact = results.iter().filter(|r| r.match_type == MatchType::Exact).count(),
            fuzzy = results.iter().filter(|r| r.match_type == MatchType::Fuzzy).count(),
            missing = results.iter().filter(|r| !r.is_matched()).count(),
            scorer = self.scorer.name(),
            "canonical matching finished"
        );
        results
    }

    pub fn match_item(&self, item: &CanonicalItem, candidates: &[HeaderCandidate]) -> MatchResult {
        if let Some(result) = self.exact_match(item, candidates) {
            return result;
        }
        if let Some(result) = self.fuzzy_match(item, candidates) {
            return result;
        }
        tracing::debug!(item = item.item_number, "no header found");
        MatchResult::missing(item.item_number)
    }

    fn exact_match(&self, item: &CanonicalItem, candidates: &[HeaderCandidate]) -> Option<MatchResult> {
        candidates.iter().find_map(|candidate| {
            candidate.hint_for(item.item_number).map(|hint| MatchResult {
                item_number: item.item_number,
                header_text: Some(candidate.text().to_string()),
                page_no: Some(candidate.page_no()),
                match_type: MatchType::Exact,
                confidence: Some(100.0),
                scheme: Some(hint.scheme.clone()),
                fragment_ref: Some(candidate.fragment.self_ref.clone()),
            })
        })
    }

    fn fuzzy_match(&self, item: &CanonicalItem, candidates: &[HeaderCandidate]) -> Option<MatchResult> {
        let mut accepted = candidates
            .iter()
            .map(|candidate| (candidate, self.scorer.score(candidate.text(), item)))
            .filter(|(_, score)| self.scorer.accepts(*score));

        let (candidate, score) = match self.selection {
            SelectionMode::FirstMatch => accepted.next()?,
            // Strictly greater keeps the earliest candidate on ties.
            SelectionMode::BestMatch => accepted.fold(None, |best, (c, s)| match best {
                Some((_, best_score)) if s <= best_score => best,
                _ => Some((c, s)),
            })?,
        };

        tracing::debug!(
            item = item.item_number,
            page = candidate.page_no(),
            score,
            header = candidate.text(),
            "fuzzy match"
        );
        Some(MatchResult {
            item_number: item.item_number,
            header_text: Some(candidate.text().to_string()),
            page_no: Some(candidate.page_no()),
            match_type: MatchType::Fuzzy,
            confidence: Some(score),
            scheme: None,
            fragment_ref: Some(candidate.fragment.self_ref.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BlendWeights;
    use crate::rules::similarity::BlendedScorer;

    fn candidate(r: &str, text: &str, page: u32, hints: &[(&str, u32)]) -> HeaderCandidate {
        HeaderCandidate {
            fragment: TextFragment::new(r, text, FragmentLabel::SectionHeader, page, 700.0, 72.0),
            hints: hints
                .iter()
                .map(|(scheme, value)| NumberHint {
                    scheme: scheme.to_string(),
                    value: *value,
                })
                .collect(),
        }
    }

    fn scorer() -> BlendedScorer {
        BlendedScorer::new(BlendWeights::default(), 75.0)
    }

    #[test]
    fn first_exact_hit_in_document_order_wins() {
        let table = CanonicalTable::fdd();
        let scorer = scorer();
        let matcher = CanonicalMatcher::new(&table, &scorer, SelectionMode::FirstMatch);
        let candidates = vec![
            candidate("a", "ITEM 3 LITIGATION", 10, &[("item", 3)]),
            candidate("b", "ITEM 3 LITIGATION (CONTINUED)", 40, &[("item", 3)]),
        ];

        let result = matcher.match_item(table.get(3).unwrap(), &candidates);
        assert_eq!(result.match_type, MatchType::Exact);
        assert_eq!(result.page_no, Some(10));
        assert_eq!(result.fragment_ref.as_deref(), Some("a"));
        assert_eq!(result.confidence, Some(100.0));
    }

    #[test]
    fn exact_uses_any_scheme_hint() {
        let table = CanonicalTable::fdd();
        let scorer = scorer();
        let matcher = CanonicalMatcher::new(&table, &scorer, SelectionMode::FirstMatch);
        let candidates = vec![candidate(
            "a",
            "2. ITEM 7 ESTIMATED INITIAL INVESTMENT",
            12,
            &[("item", 7), ("leading_number", 2)],
        )];

        let seven = matcher.match_item(table.get(7).unwrap(), &candidates);
        assert_eq!(seven.scheme.as_deref(), Some("item"));
        let two = matcher.match_item(table.get(2).unwrap(), &candidates);
        assert_eq!(two.match_type, MatchType::Exact);
        assert_eq!(two.scheme.as_deref(), Some("leading_number"));
    }

    #[test]
    fn word_form_header_falls_back_to_fuzzy() {
        let table = CanonicalTable::fdd();
        let scorer = scorer();
        let matcher = CanonicalMatcher::new(&table, &scorer, SelectionMode::FirstMatch);
        let candidates = vec![candidate("a", "Item Five — Initial Fees", 14, &[])];

        let result = matcher.match_item(table.get(5).unwrap(), &candidates);
        assert_eq!(result.match_type, MatchType::Fuzzy);
        assert_eq!(result.page_no, Some(14));
        assert!(result.confidence.unwrap() > 75.0);
        assert!(result.scheme.is_none());
    }

    #[test]
    fn exact_is_preferred_over_earlier_fuzzy() {
        let table = CanonicalTable::fdd();
        let scorer = scorer();
        let matcher = CanonicalMatcher::new(&table, &scorer, SelectionMode::FirstMatch);
        let candidates = vec![
            candidate("a", "Initial Fees", 3, &[]),
            candidate("b", "ITEM 5 INITIAL FEES", 14, &[("item", 5)]),
        ];

        let result = matcher.match_item(table.get(5).unwrap(), &candidates);
        assert_eq!(result.match_type, MatchType::Exact);
        assert_eq!(result.page_no, Some(14));
    }

    #[test]
    fn best_match_prefers_the_higher_score() {
        let table = CanonicalTable::fdd();
        let scorer = scorer();
        let candidates = vec![
            candidate("a", "Initial Fees", 3, &[]),
            candidate("b", "Item 5: Initial Fees", 14, &[]),
        ];
        let item = table.get(5).unwrap();

        let first = CanonicalMatcher::new(&table, &scorer, SelectionMode::FirstMatch)
            .match_item(item, &candidates);
        let best = CanonicalMatcher::new(&table, &scorer, SelectionMode::BestMatch)
            .match_item(item, &candidates);

        assert_eq!(first.fragment_ref.as_deref(), Some("a"));
        assert_eq!(best.fragment_ref.as_deref(), Some("b"));
        assert!(best.confidence.unwrap() > first.confidence.unwrap());
    }

    #[test]
    fn no_candidates_means_every_item_missing() {
        let table = CanonicalTable::fdd();
        let scorer = scorer();
        let matcher = CanonicalMatcher::new(&table, &scorer, SelectionMode::FirstMatch);

        let results = matcher.match_all(&[]);
        assert_eq!(results.len(), 23);
        assert!(results.iter().all(|r| r == &MatchResult::missing(r.item_number)));
    }
}
