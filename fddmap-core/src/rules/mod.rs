// Analysis stages, leaves first. Data flows strictly down this list:
// - reading_order.rs: the single definition of document order
// - header_detection.rs: section-header candidates and numbering hints
// - similarity.rs: swappable fuzzy scoring strategies
// - matching.rs: canonical item -> header assignment
// - section_builder.rs: page-bounded sections and their content
// - validation.rs: ordering, coverage and format checks

pub mod header_detection;
pub mod matching;
pub mod reading_order;
pub mod section_builder;
pub mod similarity;
pub mod validation;

pub use header_detection::{HeaderDetector, NumberExtractor};
pub use matching::CanonicalMatcher;
pub use reading_order::{compare_reading_order, first_pages_text, fragments_in_range, PageRange};
pub use section_builder::SectionBuilder;
pub use similarity::{scorer_from_config, BlendedScorer, MaxRatioScorer, SimilarityScorer};
pub use validation::ValidationRule;
