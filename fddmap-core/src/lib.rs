// fddmap Core Library
//
// Recovers the 23-item section structure of a franchise disclosure document
// from a flat list of positioned text fragments.

pub mod canonical;
pub mod config;
pub mod error;
pub mod preprocessors;
pub mod processor;
pub mod rules;
pub mod storage;
pub mod types;

// Re-export main types and functions for easy use
pub use canonical::{CanonicalItem, CanonicalTable};
pub use config::AnalysisConfig;
pub use error::{FddError, Result};
pub use preprocessors::{DoclingPreprocessor, LoadReport, Preprocessor};
pub use processor::{SectionAnalyzer, StepTimings};
pub use rules::first_pages_text;
pub use storage::{calculate_config_hash, calculate_document_hash, OutputWriter};
pub use types::*;
