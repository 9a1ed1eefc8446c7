use crate::error::{FddError, Result};
use crate::types::*;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// SHA-256 of the raw input document bytes.
pub fn calculate_document_hash(document_bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(document_bytes);
    format!("{:x}", hasher.finalize())
}

/// Calculate hash for configuration data (stamped on every output)
pub fn calculate_config_hash<T: Serialize>(config: &T) -> Result<String> {
    let config_json = serde_json::to_string(config)?;

    let mut hasher = Sha256::new();
    hasher.update(config_json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

static YEAR_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"_(\d{4})").unwrap());

/// Company name and filing year from a file name like `acme_2023_fdd.json`.
///
/// The company is the stem up to the first `_`; the year is the first `_YYYY`.
pub fn parse_file_stem(file_name: &str) -> (Option<String>, Option<i32>) {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name);

    let company = stem
        .split('_')
        .next()
        .filter(|c| !c.is_empty())
        .map(str::to_string);
    let year = YEAR_REGEX
        .captures(stem)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok());

    (company, year)
}

impl ProcessedDocument {
    /// Wrap an analysis with provenance. `processed_at` is the only
    /// non-deterministic field.
    pub fn from_analysis<C: Serialize>(
        file_name: &str,
        document_bytes: &[u8],
        config: &C,
        analysis: DocumentAnalysis,
        processed_at: DateTime<Utc>,
    ) -> Result<Self> {
        let (company_name, year) = parse_file_stem(file_name);
        Ok(Self {
            schema_version: SCHEMA_VERSION.to_string(),
            file_name: file_name.to_string(),
            company_name,
            year,
            document_hash: calculate_document_hash(document_bytes),
            config_hash: calculate_config_hash(config)?,
            processed_at,
            sections: analysis.sections,
            validation: analysis.validation,
        })
    }
}

/// Writes analysis results as pretty JSON under one output directory.
pub struct OutputWriter {
    output_dir: PathBuf,
}

impl OutputWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self> {
        let output_dir = output_dir.into();
        let grouped = output_dir.join("grouped_sections");
        fs::create_dir_all(&grouped).map_err(|e| FddError::io(&grouped, e))?;
        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// `grouped_sections/<company>_sections_<timestamp>.json`
    pub fn write_processed(&self, document: &ProcessedDocument) -> Result<PathBuf> {
        let company = document.company_name.as_deref().unwrap_or("unknown");
        let path = self.output_dir.join("grouped_sections").join(format!(
            "{company}_sections_{}.json",
            timestamp(&document.processed_at)
        ));
        write_json(&path, document)?;
        Ok(path)
    }

    /// `section_analysis_<timestamp>.json`, one entry per processed document.
    pub fn write_analysis(&self, documents: &[ProcessedDocument], at: DateTime<Utc>) -> Result<PathBuf> {
        let path = self
            .output_dir
            .join(format!("section_analysis_{}.json", timestamp(&at)));
        write_json(&path, &documents)?;
        Ok(path)
    }
}

fn timestamp(at: &DateTime<Utc>) -> String {
    at.format("%Y%m%d_%H%M%S").to_string()
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json_str = serde_json::to_string_pretty(value)?;
    fs::write(path, json_str).map_err(|e| FddError::io(path, e))?;
    tracing::debug!(path = %path.display(), "wrote output");
    Ok(())
}
