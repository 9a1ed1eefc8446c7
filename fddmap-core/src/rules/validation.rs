use crate::config::ValidationConfig;
use crate::types::*;

// ValidationRule - structural sanity checks over a finished section map.
// Never fails: every finding becomes a ValidationIssue.
pub struct ValidationRule<'a> {
    config: &'a ValidationConfig,
}

impl<'a> ValidationRule<'a> {
    pub fn new(config: &'a ValidationConfig) -> Self {
        Self { config }
    }

    pub fn validate(&self, sections: &SectionMap) -> ValidationReport {
        let mut issues = Vec::new();
        let mut previous_page: Option<u32> = None;

        for section in sections.iter() {
            let page = match (section.is_matched(), section.page_no) {
                (true, Some(page)) => page,
                _ => {
                    self.check_missing(section, &mut issues);
                    continue;
                }
            };

            if let Some(previous) = previous_page {
                self.check_page_order(section.item_number, previous, page, &mut issues);
            }
            if self.config.check_header_numbers {
                self.check_header_number(section, page, &mut issues);
            }
            previous_page = Some(page);
        }

        let summary = summarize(sections, &issues);
        tracing::debug!(
            issues = issues.len(),
            high = summary.high,
            medium = summary.medium,
            low = summary.low,
            "validation finished"
        );
        ValidationReport { issues, summary }
    }

    fn check_page_order(
        &self,
        item_number: ItemNumber,
        previous: u32,
        page: u32,
        issues: &mut Vec<ValidationIssue>,
    ) {
        if page < previous && previous - page > self.config.backward_margin {
            issues.push(ValidationIssue {
                item_number,
                page: Some(page),
                severity: Severity::Medium,
                kind: IssueKind::NonSequentialPage,
                description: format!(
                    "Item {item_number} starts on page {page}, before the previous item on page {previous}"
                ),
            });
        } else if page > previous && page - previous > self.config.forward_gap_margin {
            issues.push(ValidationIssue {
                item_number,
                page: Some(page),
                severity: Severity::Low,
                kind: IssueKind::LargePageGap,
                description: format!(
                    "Item {item_number} starts {} pages after the previous item (page {previous})",
                    page - previous
                ),
            });
        }
    }

    fn check_missing(&self, section: &Section, issues: &mut Vec<ValidationIssue>) {
        let item_number = section.item_number;
        if self.config.is_critical(item_number) {
            issues.push(ValidationIssue {
                item_number,
                page: None,
                severity: Severity::High,
                kind: IssueKind::CriticalItemMissing,
                description: format!("Critical item {item_number} is missing"),
            });
        } else if self.config.report_missing_items {
            issues.push(ValidationIssue {
                item_number,
                page: None,
                severity: Severity::Low,
                kind: IssueKind::ItemMissing,
                description: format!("Item {item_number} is missing"),
            });
        }
    }

    fn check_header_number(&self, section: &Section, page: u32, issues: &mut Vec<ValidationIssue>) {
        let header = section.header_text.as_deref().unwrap_or_default();
        if has_number_token(header, section.item_number) {
            return;
        }
        issues.push(ValidationIssue {
            item_number: section.item_number,
            page: Some(page),
            severity: Severity::Low,
            kind: IssueKind::HeaderNumberMismatch,
            description: format!(
                "Header \"{header}\" does not contain item number {}",
                section.item_number
            ),
        });
    }
}

/// The number appears as a standalone numeric token ("ITEM 5:" yes, "ITEM 15" no).
fn has_number_token(text: &str, number: ItemNumber) -> bool {
    text.split(|c: char| !c.is_ascii_digit())
        .filter(|token| !token.is_empty())
        .any(|token| token.parse::<ItemNumber>().ok() == Some(number))
}

fn summarize(sections: &SectionMap, issues: &[ValidationIssue]) -> ValidationSummary {
    let severity_count = |severity| issues.iter().filter(|i| i.severity == severity).count();
    ValidationSummary {
        exact: sections.count(MatchType::Exact),
        fuzzy: sections.count(MatchType::Fuzzy),
        missing: sections.count(MatchType::Missing),
        high: severity_count(Severity::High),
        medium: severity_count(Severity::Medium),
        low: severity_count(Severity::Low),
    }
}
