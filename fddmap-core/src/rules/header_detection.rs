use super::reading_order::sort_in_reading_order;
use crate::config::{NumberingConfig, NumberingScheme, NumeralKind};
use crate::error::{FddError, Result};
use crate::types::*;
use regex::Regex;

/// One compiled numbering scheme. Schemes are independent: a header may yield
/// hints from several of them, and nothing here decides which one is right.
#[derive(Debug, Clone)]
pub struct NumberExtractor {
    name: String,
    regex: Regex,
    numeral: NumeralKind,
}

impl NumberExtractor {
    pub fn compile(scheme: &NumberingScheme) -> Result<Self> {
        let regex = Regex::new(&scheme.pattern).map_err(|source| FddError::InvalidPattern {
            name: scheme.name.clone(),
            source,
        })?;
        if regex.captures_len() < 2 {
            return Err(FddError::config(format!(
                "numbering scheme '{}' needs a capture group for the number",
                scheme.name
            )));
        }

        Ok(Self {
            name: scheme.name.clone(),
            regex,
            numeral: scheme.numeral,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number from the first match of this scheme, if it parses.
    pub fn extract(&self, text: &str) -> Option<ItemNumber> {
        let captures = self.regex.captures(text)?;
        let raw = captures.get(1)?.as_str();
        match self.numeral {
            NumeralKind::Arabic => raw.parse::<ItemNumber>().ok(),
            NumeralKind::Roman => parse_roman(raw),
        }
    }
}

pub struct HeaderDetector {
    extractors: Vec<NumberExtractor>,
}

impl HeaderDetector {
    pub fn new(config: &NumberingConfig) -> Result<Self> {
        let extractors = config
            .schemes
            .iter()
            .map(NumberExtractor::compile)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { extractors })
    }

    pub fn extractors(&self) -> &[NumberExtractor] {
        &self.extractors
    }

    /// Hints from every scheme that matches, in scheme order.
    pub fn extract_hints(&self, text: &str) -> Vec<NumberHint> {
        self.extractors
            .iter()
            .filter_map(|extractor| {
                extractor.extract(text).map(|value| NumberHint {
                    scheme: extractor.name().to_string(),
                    value,
                })
            })
            .collect()
    }

    /// Section-header fragments in reading order, annotated with numbering hints.
    pub fn detect(&self, document: &Document) -> Vec<HeaderCandidate> {
        let mut headers: Vec<&TextFragment> = document.section_headers().collect();
        sort_in_reading_order(&mut headers);

        let candidates: Vec<HeaderCandidate> = headers
            .into_iter()
            .map(|fragment| HeaderCandidate {
                hints: self.extract_hints(&fragment.text),
                fragment: fragment.clone(),
            })
            .collect();

        let ambiguous = candidates.iter().filter(|c| c.is_ambiguous()).count();
        tracing::debug!(
            candidates = candidates.len(),
            numbered = candidates.iter().filter(|c| !c.hints.is_empty()).count(),
            ambiguous,
            "header detection finished"
        );
        candidates
    }
}

/// Parse an upper-case roman numeral. Rejects non-canonical spellings ("IIII", "VX").
pub fn parse_roman(numeral: &str) -> Option<ItemNumber> {
    if numeral.is_empty() {
        return None;
    }

    let mut total: u32 = 0;
    let mut previous = 0;
    for ch in numeral.chars().rev() {
        let value = match ch {
            'I' => 1,
            'V' => 5,
            'X' => 10,
            'L' => 50,
            'C' => 100,
            'D' => 500,
            'M' => 1000,
            _ => return None,
        };
        if value < previous {
            total = total.checked_sub(value)?;
        } else {
            total += value;
            previous = value;
        }
    }

    (total > 0 && to_roman(total) == numeral).then_some(total)
}

pub fn to_roman(mut n: u32) -> String {
    const VALUES: [(u32, &str); 13] = [
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];

    let mut result = String::new();
    for (value, numeral) in VALUES {
        while n >= value {
            result.push_str(numeral);
            n -= value;
        }
    }
    result
}
