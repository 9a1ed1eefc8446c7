use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type ItemNumber = u32;

/// The schema version stamped on every processed-document output.
/// Bump this when the output shape changes.
pub const SCHEMA_VERSION: &str = "0.1.0";

// ===== INPUT MODEL =====
// A Document is the flat fragment list produced by the layout parser.
// Nothing in the analysis mutates it.

/// Layout label attached to a fragment by the upstream parser.
/// Only `SectionHeader` matters for header detection; the rest is carried through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FragmentLabel {
    SectionHeader,
    Title,
    #[serde(alias = "body", alias = "paragraph")]
    Text,
    ListItem,
    PageHeader,
    PageFooter,
    Caption,
    Footnote,
    Table,
    #[default]
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFragment {
    /// Stable identifier, e.g. "#/texts/42"
    #[serde(rename = "ref")]
    pub self_ref: String,
    pub text: String,
    pub label: FragmentLabel,
    /// Heading level reported by the parser, when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
    #[serde(default)]
    pub page_no: u32,
    /// Bottom-left origin: larger `top` is closer to the top edge of the page
    #[serde(default)]
    pub top: f64,
    #[serde(default)]
    pub left: f64,
}

impl TextFragment {
    pub fn new(
        self_ref: impl Into<String>,
        text: impl Into<String>,
        label: FragmentLabel,
        page_no: u32,
        top: f64,
        left: f64,
    ) -> Self {
        Self {
            self_ref: self_ref.into(),
            text: text.into(),
            label,
            level: None,
            page_no,
            top,
            left,
        }
    }

    pub fn is_section_header(&self) -> bool {
        self.label == FragmentLabel::SectionHeader
    }
}

/// Parser-level grouping of fragments (lists, key-value areas, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FragmentGroup {
    #[serde(rename = "ref")]
    pub self_ref: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Refs of member fragments, in group order
    #[serde(default)]
    pub children: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub fragments: Vec<TextFragment>,
    #[serde(default)]
    pub groups: Vec<FragmentGroup>,
}

impl Document {
    pub fn new(fragments: Vec<TextFragment>) -> Self {
        Self {
            fragments,
            groups: Vec::new(),
        }
    }

    pub fn with_groups(mut self, groups: Vec<FragmentGroup>) -> Self {
        self.groups = groups;
        self
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Header-labelled fragments in insertion order (not reading order).
    pub fn section_headers(&self) -> impl Iterator<Item = &TextFragment> {
        self.fragments.iter().filter(|f| f.is_section_header())
    }

    /// Resolve a group's child refs to fragment texts, skipping unknown refs and empty texts.
    pub fn group_texts(&self, group: &FragmentGroup) -> Vec<&str> {
        let by_ref: HashMap<&str, &TextFragment> = self
            .fragments
            .iter()
            .map(|f| (f.self_ref.as_str(), f))
            .collect();

        group
            .children
            .iter()
            .filter_map(|child| by_ref.get(child.as_str()))
            .map(|f| f.text.as_str())
            .filter(|t| !t.is_empty())
            .collect()
    }

    /// Highest page number seen, 0 for an empty document.
    pub fn page_count(&self) -> u32 {
        self.fragments.iter().map(|f| f.page_no).max().unwrap_or(0)
    }
}

// ===== HEADER DETECTION =====

/// A number extracted from a header line by one numbering scheme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberHint {
    pub scheme: String,
    pub value: ItemNumber,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderCandidate {
    pub fragment: TextFragment,
    /// One entry per scheme that matched, in scheme order. Conflicts are kept as-is.
    pub hints: Vec<NumberHint>,
}

impl HeaderCandidate {
    pub fn text(&self) -> &str {
        &self.fragment.text
    }

    pub fn page_no(&self) -> u32 {
        self.fragment.page_no
    }

    /// First hint (in scheme order) carrying `item_number`.
    pub fn hint_for(&self, item_number: ItemNumber) -> Option<&NumberHint> {
        self.hints.iter().find(|h| h.value == item_number)
    }

    /// More than one distinct number was extracted.
    pub fn is_ambiguous(&self) -> bool {
        self.hints
            .iter()
            .any(|h| h.value != self.hints[0].value)
    }
}

// ===== MATCHING =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchType {
    Exact,
    Fuzzy,
    Missing,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub item_number: ItemNumber,
    pub header_text: Option<String>,
    pub page_no: Option<u32>,
    pub match_type: MatchType,
    /// 100 for EXACT, the blended score for FUZZY, absent for MISSING
    pub confidence: Option<f64>,
    /// Numbering scheme that produced an EXACT hit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fragment_ref: Option<String>,
}

impl MatchResult {
    pub fn missing(item_number: ItemNumber) -> Self {
        Self {
            item_number,
            header_text: None,
            page_no: None,
            match_type: MatchType::Missing,
            confidence: None,
            scheme: None,
            fragment_ref: None,
        }
    }

    pub fn is_matched(&self) -> bool {
        self.match_type != MatchType::Missing
    }
}

// ===== SECTIONS =====

/// One fragment of section content, numbered in reading order within its section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionContent {
    #[serde(rename = "ref")]
    pub self_ref: String,
    pub text: String,
    pub page_no: u32,
    pub sequence: usize,
    pub top: f64,
    pub left: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub item_number: ItemNumber,
    /// Canonical caption of the item
    pub title: String,
    pub header_text: Option<String>,
    /// Page of the matched header, i.e. the first page of the section
    pub page_no: Option<u32>,
    /// Last page of the section (inclusive); None when open-ended or MISSING
    pub end_page: Option<u32>,
    pub match_type: MatchType,
    pub confidence: Option<f64>,
    pub content: Vec<SectionContent>,
}

impl Section {
    pub fn start_page(&self) -> Option<u32> {
        self.page_no
    }

    pub fn is_matched(&self) -> bool {
        self.match_type != MatchType::Missing
    }
}

/// Exactly one Section per canonical item, in item-number order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionMap {
    pub sections: Vec<Section>,
}

impl SectionMap {
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Section> {
        self.sections.iter()
    }

    pub fn get(&self, item_number: ItemNumber) -> Option<&Section> {
        self.sections.iter().find(|s| s.item_number == item_number)
    }

    pub fn count(&self, match_type: MatchType) -> usize {
        self.sections
            .iter()
            .filter(|s| s.match_type == match_type)
            .count()
    }

    pub fn missing_items(&self) -> Vec<ItemNumber> {
        self.sections
            .iter()
            .filter(|s| !s.is_matched())
            .map(|s| s.item_number)
            .collect()
    }
}

// ===== VALIDATION =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    NonSequentialPage,
    LargePageGap,
    CriticalItemMissing,
    ItemMissing,
    HeaderNumberMismatch,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub item_number: ItemNumber,
    pub page: Option<u32>,
    pub severity: Severity,
    pub kind: IssueKind,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub exact: usize,
    pub fuzzy: usize,
    pub missing: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
    pub summary: ValidationSummary,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(move |i| i.severity == severity)
    }

    pub fn for_item(&self, item_number: ItemNumber) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(move |i| i.item_number == item_number)
    }
}

// ===== OUTPUT =====

/// Result of one analysis run. Deterministic for a given Document and configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentAnalysis {
    pub sections: SectionMap,
    pub validation: ValidationReport,
}

/// Serialization-ready envelope with provenance. The only place a timestamp appears.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedDocument {
    pub schema_version: String,
    pub file_name: String,
    pub company_name: Option<String>,
    pub year: Option<i32>,
    pub document_hash: String,
    pub config_hash: String,
    pub processed_at: DateTime<Utc>,
    pub sections: SectionMap,
    pub validation: ValidationReport,
}
