use crate::error::{FddError, Result};
use crate::types::ItemNumber;
use serde::{Deserialize, Serialize};

// Default value functions for serde
fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Numbering schemes tried against every header line
    #[serde(default)]
    pub numbering: NumberingConfig,
    /// Exact/fuzzy matching of headers onto canonical items
    #[serde(default)]
    pub matching: MatchingConfig,
    /// Section-map sanity checks
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub reading_order: ReadingOrderConfig,
}

// ===== NUMBERING =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NumeralKind {
    #[default]
    Arabic,
    Roman,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumberingScheme {
    /// Reported on every hint this scheme produces
    pub name: String,
    /// Regex with the number in capture group 1
    pub pattern: String,
    #[serde(default)]
    pub numeral: NumeralKind,
}

impl NumberingScheme {
    pub fn new(name: &str, pattern: &str, numeral: NumeralKind) -> Self {
        Self {
            name: name.to_string(),
            pattern: pattern.to_string(),
            numeral,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumberingConfig {
    #[serde(default = "default_schemes")]
    pub schemes: Vec<NumberingScheme>,
}

fn default_schemes() -> Vec<NumberingScheme> {
    vec![
        NumberingScheme::new("item", r"(?i)\bITEM\s*(\d+)", NumeralKind::Arabic), // ITEM 5, Item5
        NumberingScheme::new("section", r"(?i)\bSECTION\s*(\d+)", NumeralKind::Arabic), // SECTION 5
        NumberingScheme::new("leading_number", r"^\s*(\d+)\.(?:\s|$)", NumeralKind::Arabic), // 5. INITIAL FEES
        NumberingScheme::new("roman_prefix", r"^\s*([IVXLCDM]+)[.):](?:\s|$)", NumeralKind::Roman), // V. INITIAL FEES
        NumberingScheme::new("item_roman", r"(?i:\bITEM)\s+([IVXLCDM]+)\b", NumeralKind::Roman), // ITEM V
    ]
}

impl Default for NumberingConfig {
    fn default() -> Self {
        Self {
            schemes: default_schemes(),
        }
    }
}

// ===== MATCHING =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScoringStrategy {
    /// Weighted blend of caption ratio, partial title similarity and a number bonus
    #[default]
    Blended,
    /// Highest of the plain ratios against caption and title
    MaxRatio,
}

impl ScoringStrategy {
    /// Neither value has been validated against a labelled corpus; override per corpus.
    pub fn default_threshold(&self) -> f64 {
        match self {
            ScoringStrategy::Blended => 75.0,
            ScoringStrategy::MaxRatio => 80.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    /// First candidate in reading order above the threshold wins
    #[default]
    FirstMatch,
    /// Highest-scoring candidate above the threshold wins, earliest on ties
    BestMatch,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlendWeights {
    /// Whole-string similarity against "ITEM <n>: <title>"
    pub full_caption: f64,
    /// Partial / token-reordered similarity against the bare title
    pub partial_title: f64,
    /// Bonus applied when the item number appears anywhere in the header
    pub number_bonus: f64,
}

impl Default for BlendWeights {
    fn default() -> Self {
        Self {
            full_caption: 0.3,
            partial_title: 0.6,
            number_bonus: 0.1,
        }
    }
}

impl BlendWeights {
    pub fn total(&self) -> f64 {
        self.full_caption + self.partial_title + self.number_bonus
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MatchingConfig {
    #[serde(default)]
    pub strategy: ScoringStrategy,
    /// Acceptance threshold on a 0-100 scale; falls back to the strategy default
    #[serde(default)]
    pub threshold: Option<f64>,
    #[serde(default)]
    pub weights: BlendWeights,
    #[serde(default)]
    pub selection: SelectionMode,
}

impl MatchingConfig {
    pub fn effective_threshold(&self) -> f64 {
        self.threshold
            .unwrap_or_else(|| self.strategy.default_threshold())
    }
}

// ===== VALIDATION =====

fn default_forward_gap_margin() -> u32 {
    50 // pages between consecutive matched items before it looks suspicious
}

fn default_critical_items() -> Vec<ItemNumber> {
    vec![1, 2, 3, 4, 5, 6, 7, 21, 22, 23]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Pages an item may start before the previous matched item without being flagged
    #[serde(default)]
    pub backward_margin: u32,
    /// Pages an item may start after the previous matched item without being flagged
    #[serde(default = "default_forward_gap_margin")]
    pub forward_gap_margin: u32,
    /// Items whose absence is a HIGH severity issue
    #[serde(default = "default_critical_items")]
    pub critical_items: Vec<ItemNumber>,
    /// Report non-critical MISSING items as LOW severity issues
    #[serde(default = "default_true")]
    pub report_missing_items: bool,
    /// Flag matched headers that do not carry their item number
    #[serde(default = "default_true")]
    pub check_header_numbers: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            backward_margin: 0,
            forward_gap_margin: default_forward_gap_margin(),
            critical_items: default_critical_items(),
            report_missing_items: true,
            check_header_numbers: true,
        }
    }
}

impl ValidationConfig {
    pub fn is_critical(&self, item_number: ItemNumber) -> bool {
        self.critical_items.contains(&item_number)
    }
}

// ===== READING ORDER =====

fn default_preview_pages() -> u32 {
    20
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingOrderConfig {
    /// Pages included by first-pages text extraction
    #[serde(default = "default_preview_pages")]
    pub preview_pages: u32,
}

impl Default for ReadingOrderConfig {
    fn default() -> Self {
        Self {
            preview_pages: default_preview_pages(),
        }
    }
}

impl AnalysisConfig {
    /// Load config from a YAML file
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| FddError::io(path, e))?;
        let config: AnalysisConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config with fallback to default
    pub fn load_with_fallback(path: Option<&str>) -> Self {
        match path {
            Some(p) => Self::load_from_file(p).unwrap_or_else(|e| {
                tracing::warn!(path = p, error = %e, "failed to load config, using defaults");
                Self::default()
            }),
            None => Self::default(),
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Range checks that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.numbering.schemes.is_empty() {
            return Err(FddError::config("at least one numbering scheme is required"));
        }
        for scheme in &self.numbering.schemes {
            if scheme.name.trim().is_empty() {
                return Err(FddError::config("numbering scheme names must not be empty"));
            }
        }

        let threshold = self.matching.effective_threshold();
        if !(0.0..=100.0).contains(&threshold) {
            return Err(FddError::config(format!(
                "matching threshold {threshold} must be within 0..=100"
            )));
        }

        let weights = &self.matching.weights;
        let parts = [weights.full_caption, weights.partial_title, weights.number_bonus];
        if parts.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(FddError::config("blend weights must be finite and non-negative"));
        }
        if weights.total() <= 0.0 {
            return Err(FddError::config("blend weights must not all be zero"));
        }

        if self.reading_order.preview_pages == 0 {
            return Err(FddError::config("preview_pages must be at least 1"));
        }

        Ok(())
    }
}
