// Canonical item table
//
// The 23 disclosure items every FDD carries, in regulatory order. The table is
// read-only once built; pass it to the analyzer instead of reaching for a global
// so tests can swap in alternate taxonomies.

use crate::error::{FddError, Result};
use crate::types::ItemNumber;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalItem {
    pub item_number: ItemNumber,
    pub title: String,
}

impl CanonicalItem {
    pub fn new(item_number: ItemNumber, title: impl Into<String>) -> Self {
        Self {
            item_number,
            title: title.into(),
        }
    }

    /// "ITEM 5: INITIAL FEES"
    pub fn full_caption(&self) -> String {
        format!("ITEM {}: {}", self.item_number, self.title)
    }
}

const FDD_ITEMS: [(ItemNumber, &str); 23] = [
    (1, "THE FRANCHISOR, AND ANY PARENTS, PREDECESSORS AND AFFILIATES"),
    (2, "BUSINESS EXPERIENCE"),
    (3, "LITIGATION"),
    (4, "BANKRUPTCY"),
    (5, "INITIAL FEES"),
    (6, "OTHER FEES"),
    (7, "ESTIMATED INITIAL INVESTMENT"),
    (8, "RESTRICTIONS ON SOURCES OF PRODUCTS AND SERVICES"),
    (9, "FRANCHISEE'S OBLIGATIONS"),
    (10, "FINANCING"),
    (11, "FRANCHISOR'S ASSISTANCE, ADVERTISING, COMPUTER SYSTEMS AND TRAINING"),
    (12, "TERRITORY"),
    (13, "TRADEMARKS"),
    (14, "PATENTS, COPYRIGHTS AND PROPRIETARY INFORMATION"),
    (15, "OBLIGATION TO PARTICIPATE IN THE ACTUAL OPERATION OF THE FRANCHISE BUSINESS"),
    (16, "RESTRICTIONS ON WHAT THE FRANCHISEE MAY SELL"),
    (17, "RENEWAL, TERMINATION, TRANSFER AND DISPUTE RESOLUTION"),
    (18, "PUBLIC FIGURES"),
    (19, "FINANCIAL PERFORMANCE REPRESENTATIONS"),
    (20, "OUTLETS AND FRANCHISEE INFORMATION"),
    (21, "FINANCIAL STATEMENTS"),
    (22, "CONTRACTS"),
    (23, "RECEIPTS"),
];

/// Ordered, duplicate-free list of canonical items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CanonicalTable {
    items: Vec<CanonicalItem>,
}

impl CanonicalTable {
    /// Build a table, sorting by item number and rejecting duplicates.
    pub fn new(mut items: Vec<CanonicalItem>) -> Result<Self> {
        if items.is_empty() {
            return Err(FddError::config("canonical table must not be empty"));
        }

        let mut seen = HashSet::new();
        for item in &items {
            if !seen.insert(item.item_number) {
                return Err(FddError::config(format!(
                    "duplicate canonical item number {}",
                    item.item_number
                )));
            }
        }

        items.sort_by_key(|item| item.item_number);
        Ok(Self { items })
    }

    /// The standard 23-item FDD table.
    pub fn fdd() -> Self {
        Self {
            items: FDD_ITEMS
                .iter()
                .map(|(number, title)| CanonicalItem::new(*number, *title))
                .collect(),
        }
    }

    /// Load an alternate table from YAML: a list of `{item_number, title}`.
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| FddError::io(path, e))?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let items: Vec<CanonicalItem> = serde_yaml::from_str(content)?;
        Self::new(items)
    }

    pub fn items(&self) -> &[CanonicalItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, item_number: ItemNumber) -> Option<&CanonicalItem> {
        self.items.iter().find(|i| i.item_number == item_number)
    }

    pub fn contains(&self, item_number: ItemNumber) -> bool {
        self.get(item_number).is_some()
    }
}

impl Default for CanonicalTable {
    fn default() -> Self {
        Self::fdd()
    }
}
