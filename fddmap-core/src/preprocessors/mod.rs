//! Document Preprocessors
//!
//! Converts layout-parser exports into the flat [`Document`](crate::types::Document)
//! the section analysis consumes.
//!
//! ```text
//! Parser export (Docling JSON)
//!     ↓
//! [Format-specific Preprocessor]
//!     ↓
//! Document (positioned text fragments + groups)
//!     ↓
//! [SectionAnalyzer]
//! ```
//!
//! ## Available Preprocessors
//!
//! - `DoclingPreprocessor` - Docling JSON exports

pub mod docling;
pub mod traits;

pub use docling::{DoclingPreprocessor, LoadReport};
pub use traits::Preprocessor;
