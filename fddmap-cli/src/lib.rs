// All analysis functionality is in fddmap-core
// This CLI acts as a thin wrapper around the core library

// CLI-specific modules
pub mod report;

// Re-export core types for convenience
pub use fddmap_core::*;
