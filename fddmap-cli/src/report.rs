// Plain-text rendering of analysis results for the terminal.

use fddmap_core::{LoadReport, MatchType, SectionMap, Severity, ValidationReport};

const HEADER_WIDTH: usize = 60;

/// Cut `text` to at most `max_chars` characters, marking the cut with "...".
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{kept}...")
}

/// Malformed-entry line for the load step.
pub fn load_summary(load: &LoadReport) -> String {
    let marker = if load.defaulted_positions + load.skipped > 0 { " ⚠️" } else { "" };
    format!(
        "   - Malformed entries: {} defaulted position(s), {} skipped{marker}",
        load.defaulted_positions, load.skipped
    )
}

fn match_label(match_type: MatchType) -> &'static str {
    match match_type {
        MatchType::Exact => "EXACT",
        MatchType::Fuzzy => "FUZZY",
        MatchType::Missing => "MISSING",
    }
}

/// One row per item: number, start page, found flag, match type, header text.
pub fn item_table(sections: &SectionMap) -> String {
    let mut out = format!(
        "{:<6} {:<6} {:<6} {:<8} {}\n",
        "Item", "Page", "Found", "Match", "Header"
    );
    out.push_str(&format!("{}\n", "-".repeat(30 + HEADER_WIDTH)));

    for section in sections.iter() {
        let page = section
            .page_no
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".to_string());
        let found = if section.is_matched() { "✓" } else { "✗" };
        let header = section
            .header_text
            .as_deref()
            .map(|h| truncate(h, HEADER_WIDTH))
            .unwrap_or_default();

        out.push_str(&format!(
            "{:<6} {:<6} {:<6} {:<8} {}\n",
            section.item_number,
            page,
            found,
            match_label(section.match_type),
            header
        ));
    }
    out
}

/// Match counts, missing items and every validation issue.
pub fn summary(sections: &SectionMap, report: &ValidationReport) -> String {
    let counts = &report.summary;
    let mut out = String::new();
    out.push_str(&format!("   - Exact matches: {}\n", counts.exact));
    out.push_str(&format!("   - Fuzzy matches: {}\n", counts.fuzzy));
    out.push_str(&format!("   - Missing: {}\n", counts.missing));

    let missing = sections.missing_items();
    if !missing.is_empty() {
        let list: Vec<String> = missing.iter().map(|n| n.to_string()).collect();
        out.push_str(&format!("   - Missing items: {}\n", list.join(", ")));
    }

    out.push_str(&format!(
        "   - Issues: {} ({} high, {} medium, {} low)\n",
        report.issues.len(),
        counts.high,
        counts.medium,
        counts.low
    ));
    for issue in &report.issues {
        let marker = match issue.severity {
            Severity::High => "❌",
            Severity::Medium => "⚠️ ",
            Severity::Low => "ℹ️ ",
        };
        out.push_str(&format!("     {marker} {}\n", issue.description));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use fddmap_core::{IssueKind, Section, ValidationIssue, ValidationSummary};

    fn section(n: u32, page: Option<u32>, header: Option<&str>) -> Section {
        Section {
            item_number: n,
            title: format!("ITEM {n}"),
            header_text: header.map(str::to_string),
            page_no: page,
            end_page: None,
            match_type: if page.is_some() { MatchType::Exact } else { MatchType::Missing },
            confidence: None,
            content: Vec::new(),
        }
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("Franchisee’s Obligations", 10), "Franchi...");
        assert_eq!(truncate("ééééééé", 5).chars().count(), 5);
    }

    #[test]
    fn load_summary_reports_malformed_entries() {
        let clean = LoadReport { fragments: 10, ..LoadReport::default() };
        assert_eq!(
            load_summary(&clean),
            "   - Malformed entries: 0 defaulted position(s), 0 skipped"
        );

        let dirty = LoadReport {
            fragments: 10,
            groups: 0,
            defaulted_positions: 2,
            skipped: 1,
        };
        let line = load_summary(&dirty);
        assert!(line.contains("2 defaulted position(s), 1 skipped"));
        assert!(line.ends_with("⚠️"));
    }

    #[test]
    fn item_table_has_a_row_per_item() {
        let map = SectionMap {
            sections: vec![
                section(1, Some(4), Some("ITEM 1 THE FRANCHISOR")),
                section(2, None, None),
            ],
        };
        let table = item_table(&map);
        let lines: Vec<_> = table.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Item"));
        assert!(lines[2].contains("EXACT") && lines[2].contains("ITEM 1 THE FRANCHISOR"));
        assert!(lines[3].contains("MISSING") && lines[3].contains('✗'));
    }

    #[test]
    fn summary_lists_missing_items_and_issues() {
        let map = SectionMap {
            sections: vec![section(19, None, None), section(21, None, None)],
        };
        let report = ValidationReport {
            issues: vec![ValidationIssue {
                item_number: 21,
                page: None,
                severity: Severity::High,
                kind: IssueKind::CriticalItemMissing,
                description: "Critical item 21 is missing".to_string(),
            }],
            summary: ValidationSummary {
                missing: 2,
                high: 1,
                ..ValidationSummary::default()
            },
        };

        let text = summary(&map, &report);
        assert!(text.contains("Missing items: 19, 21"));
        assert!(text.contains("Issues: 1 (1 high, 0 medium, 0 low)"));
        assert!(text.contains("Critical item 21 is missing"));
    }
}
