// Fuzzy scoring of header lines against canonical captions.
//
// All scores are on a 0-100 scale. Comparison is case-insensitive and
// whitespace-normalized; tokens are alphanumeric runs (apostrophes kept so
// "FRANCHISEE'S" stays one token).

use crate::canonical::CanonicalItem;
use crate::config::{BlendWeights, MatchingConfig, ScoringStrategy};
use strsim::normalized_levenshtein;

/// Words ignored when measuring title coverage.
const STOP_WORDS: [&str; 10] = ["A", "AN", "AND", "ANY", "IN", "OF", "ON", "OR", "THE", "TO"];

pub trait SimilarityScorer: Send + Sync {
    /// Similarity of `candidate` to `item`, 0-100.
    fn score(&self, candidate: &str, item: &CanonicalItem) -> f64;
    /// Scores strictly above this are accepted.
    fn threshold(&self) -> f64;
    fn name(&self) -> &str;

    fn accepts(&self, score: f64) -> bool {
        score > self.threshold()
    }
}

/// Weighted blend: caption ratio + partial title similarity + item-number bonus.
#[derive(Debug, Clone)]
pub struct BlendedScorer {
    weights: BlendWeights,
    threshold: f64,
}

impl BlendedScorer {
    pub fn new(weights: BlendWeights, threshold: f64) -> Self {
        Self { weights, threshold }
    }
}

impl SimilarityScorer for BlendedScorer {
    fn score(&self, candidate: &str, item: &CanonicalItem) -> f64 {
        let full = ratio(candidate, &item.full_caption());
        let partial = partial_token_sort_ratio(candidate, &item.title)
            .max(token_coverage(candidate, &item.title));
        let bonus = if candidate.contains(&item.item_number.to_string()) {
            100.0
        } else {
            0.0
        };

        let w = &self.weights;
        (w.full_caption * full + w.partial_title * partial + w.number_bonus * bonus) / w.total()
    }

    fn threshold(&self) -> f64 {
        self.threshold
    }

    fn name(&self) -> &str {
        "blended"
    }
}

/// Highest of caption ratio, title ratio and partial token-sort ratio against the caption.
#[derive(Debug, Clone)]
pub struct MaxRatioScorer {
    threshold: f64,
}

impl MaxRatioScorer {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl SimilarityScorer for MaxRatioScorer {
    fn score(&self, candidate: &str, item: &CanonicalItem) -> f64 {
        let caption = item.full_caption();
        ratio(candidate, &caption)
            .max(ratio(candidate, &item.title))
            .max(partial_token_sort_ratio(candidate, &caption))
    }

    fn threshold(&self) -> f64 {
        self.threshold
    }

    fn name(&self) -> &str {
        "max_ratio"
    }
}

pub fn scorer_from_config(config: &MatchingConfig) -> Box<dyn SimilarityScorer> {
    let threshold = config.effective_threshold();
    match config.strategy {
        ScoringStrategy::Blended => Box::new(BlendedScorer::new(config.weights.clone(), threshold)),
        ScoringStrategy::MaxRatio => Box::new(MaxRatioScorer::new(threshold)),
    }
}

/// Upper-case and collapse runs of whitespace.
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .map(|word| word.to_uppercase())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '\'' || c == '’'))
        .filter(|t| !t.is_empty())
        .map(|t| t.to_uppercase().replace('’', "'"))
        .collect()
}

/// Whole-string similarity.
pub fn ratio(a: &str, b: &str) -> f64 {
    let (a, b) = (normalize(a), normalize(b));
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    normalized_levenshtein(&a, &b) * 100.0
}

/// Best similarity of the shorter string against equally long windows of the longer.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let (a, b) = (normalize(a), normalize(b));
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let (short, long) = if a.chars().count() <= b.chars().count() {
        (a, b)
    } else {
        (b, a)
    };
    let long_chars: Vec<char> = long.chars().collect();
    let width = short.chars().count();

    let mut best = 0.0_f64;
    for start in 0..=(long_chars.len() - width) {
        let window: String = long_chars[start..start + width].iter().collect();
        best = best.max(normalized_levenshtein(&short, &window));
        if best >= 1.0 {
            break;
        }
    }
    best * 100.0
}

/// `partial_ratio` after sorting each side's tokens alphabetically.
pub fn partial_token_sort_ratio(a: &str, b: &str) -> f64 {
    partial_ratio(&sorted_tokens(a), &sorted_tokens(b))
}

/// Average best-match similarity of each significant title token among the candidate's tokens.
pub fn token_coverage(candidate: &str, title: &str) -> f64 {
    let candidate_tokens = tokens(candidate);
    let title_tokens: Vec<String> = tokens(title)
        .into_iter()
        .filter(|t| !STOP_WORDS.contains(&t.as_str()))
        .collect();
    if candidate_tokens.is_empty() || title_tokens.is_empty() {
        return 0.0;
    }

    let total: f64 = title_tokens
        .iter()
        .map(|wanted| {
            candidate_tokens
                .iter()
                .map(|seen| normalized_levenshtein(wanted, seen))
                .fold(0.0, f64::max)
        })
        .sum();
    total / title_tokens.len() as f64 * 100.0
}

fn sorted_tokens(text: &str) -> String {
    let mut parts = tokens(text);
    parts.sort();
    parts.join(" ")
}
