use crate::canonical::CanonicalTable;
use crate::config::AnalysisConfig;
use crate::error::{FddError, Result};
use crate::rules::{
    first_pages_text, scorer_from_config, CanonicalMatcher, HeaderDetector, SectionBuilder,
    SimilarityScorer, ValidationRule,
};
use crate::types::*;
use std::time::{Duration, Instant};

/// Wall-clock time of each analysis step, in execution order.
/// Diagnostic only; never part of the analysis output.
#[derive(Debug, Clone, Default)]
pub struct StepTimings {
    pub steps: Vec<(String, Duration)>,
}

impl StepTimings {
    pub fn total(&self) -> Duration {
        self.steps.iter().map(|(_, d)| *d).sum()
    }

    pub fn get(&self, step_name: &str) -> Option<Duration> {
        self.steps
            .iter()
            .find(|(name, _)| name == step_name)
            .map(|(_, d)| *d)
    }
}

/// Simple profiler that collects timings for analysis steps
pub struct StepProfiler {
    enabled: bool,
    timings: StepTimings,
}

impl StepProfiler {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            timings: StepTimings::default(),
        }
    }

    pub fn time_step<F, R>(&mut self, step_name: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        if !self.enabled {
            return f();
        }

        let start = Instant::now();
        let result = f();
        let elapsed = start.elapsed();

        tracing::debug!(step = step_name, elapsed_ms = elapsed.as_millis() as u64, "step finished");
        self.timings.steps.push((step_name.to_string(), elapsed));

        result
    }

    pub fn finish(self) -> StepTimings {
        self.timings
    }
}

/// Runs reading order → header detection → matching → section building → validation
/// over one Document. Holds only immutable setup, so one analyzer can serve many
/// documents, including from several threads.
pub struct SectionAnalyzer {
    config: AnalysisConfig,
    table: CanonicalTable,
    detector: HeaderDetector,
    scorer: Box<dyn SimilarityScorer>,
}

impl SectionAnalyzer {
    /// Validate the configuration and compile the numbering schemes.
    pub fn new(config: AnalysisConfig, table: CanonicalTable) -> Result<Self> {
        config.validate()?;
        if let Some(unknown) = config
            .validation
            .critical_items
            .iter()
            .find(|n| !table.contains(**n))
        {
            return Err(FddError::config(format!(
                "critical item {unknown} is not in the canonical table"
            )));
        }

        let detector = HeaderDetector::new(&config.numbering)?;
        let scorer = scorer_from_config(&config.matching);
        tracing::debug!(
            schemes = detector.extractors().len(),
            items = table.len(),
            scorer = scorer.name(),
            threshold = scorer.threshold(),
            "section analyzer ready"
        );

        Ok(Self {
            config,
            table,
            detector,
            scorer,
        })
    }

    /// Default configuration and the 23-item FDD table.
    pub fn with_defaults() -> Result<Self> {
        Self::new(AnalysisConfig::default(), CanonicalTable::fdd())
    }

    /// Swap in a custom scoring strategy.
    pub fn with_scorer(mut self, scorer: Box<dyn SimilarityScorer>) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn table(&self) -> &CanonicalTable {
        &self.table
    }

    pub fn detect_headers(&self, document: &Document) -> Vec<HeaderCandidate> {
        self.detector.detect(document)
    }

    pub fn match_items(&self, candidates: &[HeaderCandidate]) -> Vec<MatchResult> {
        CanonicalMatcher::new(&self.table, self.scorer.as_ref(), self.config.matching.selection)
            .match_all(candidates)
    }

    pub fn build_sections(&self, document: &Document, results: &[MatchResult]) -> SectionMap {
        SectionBuilder::new(document, &self.table).build(results)
    }

    pub fn validate(&self, sections: &SectionMap) -> ValidationReport {
        ValidationRule::new(&self.config.validation).validate(sections)
    }

    pub fn analyze(&self, document: &Document) -> DocumentAnalysis {
        self.analyze_with_profiler(document, &mut StepProfiler::new(false))
    }

    /// Same output as `analyze`, plus per-step durations.
    pub fn analyze_timed(&self, document: &Document) -> (DocumentAnalysis, StepTimings) {
        let mut profiler = StepProfiler::new(true);
        let analysis = self.analyze_with_profiler(document, &mut profiler);
        (analysis, profiler.finish())
    }

    fn analyze_with_profiler(&self, document: &Document, profiler: &mut StepProfiler) -> DocumentAnalysis {
        let candidates = profiler.time_step("Header detection", || self.detect_headers(document));
        if candidates.is_empty() {
            tracing::warn!(
                fragments = document.len(),
                "no section headers found, every item will be MISSING"
            );
        }

        let results = profiler.time_step("Canonical matching", || self.match_items(&candidates));
        let sections = profiler.time_step("Section building", || self.build_sections(document, &results));
        let validation = profiler.time_step("Validation", || self.validate(&sections));

        tracing::info!(
            exact = validation.summary.exact,
            fuzzy = validation.summary.fuzzy,
            missing = validation.summary.missing,
            issues = validation.issues.len(),
            "section analysis complete"
        );
        DocumentAnalysis {
            sections,
            validation,
        }
    }

    /// Text of the configured number of leading pages, in reading order.
    pub fn first_pages_text(&self, document: &Document) -> String {
        first_pages_text(document, self.config.reading_order.preview_pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::CanonicalItem;

    #[test]
    fn rejects_critical_items_outside_the_table() {
        let table = CanonicalTable::new(vec![CanonicalItem::new(1, "ONLY")]).unwrap();
        let err = SectionAnalyzer::new(AnalysisConfig::default(), table).err().unwrap();
        assert!(matches!(err, FddError::InvalidConfig { .. }));
    }

    #[test]
    fn empty_document_is_all_missing() {
        let analyzer = SectionAnalyzer::with_defaults().unwrap();
        let analysis = analyzer.analyze(&Document::default());
        assert_eq!(analysis.sections.len(), 23);
        assert_eq!(analysis.validation.summary.missing, 23);
        assert_eq!(analysis.validation.summary.high, 10);
    }

    #[test]
    fn timed_analysis_records_every_step() {
        let analyzer = SectionAnalyzer::with_defaults().unwrap();
        let doc = Document::new(vec![TextFragment::new(
            "#/texts/0",
            "ITEM 1 THE FRANCHISOR",
            FragmentLabel::SectionHeader,
            1,
            700.0,
            72.0,
        )]);

        let (timed, timings) = analyzer.analyze_timed(&doc);
        assert_eq!(timed, analyzer.analyze(&doc));
        assert_eq!(timings.steps.len(), 4);
        assert!(timings.get("Validation").is_some());
    }

    #[test]
    fn custom_scorer_is_used() {
        struct Never;
        impl SimilarityScorer for Never {
            fn score(&self, _: &str, _: &CanonicalItem) -> f64 {
                0.0
            }
            fn threshold(&self) -> f64 {
                50.0
            }
            fn name(&self) -> &str {
                "never"
            }
        }

        let analyzer = SectionAnalyzer::with_defaults().unwrap().with_scorer(Box::new(Never));
        let doc = Document::new(vec![TextFragment::new(
            "#/texts/0",
            "Initial Fees",
            FragmentLabel::SectionHeader,
            3,
            700.0,
            72.0,
        )]);
        let analysis = analyzer.analyze(&doc);
        assert_eq!(analysis.sections.get(5).unwrap().match_type, MatchType::Missing);
    }
}
