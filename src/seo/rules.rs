use crate::config::{LengthRule, SeoRules};
use crate::seo::{IssueType, SeoExtract, SeoIssue};

/// Turns an extract into the ordered list of issues for a page
pub trait IssueEvaluator {
    fn evaluate(&self, extract: &SeoExtract) -> Vec<SeoIssue>;
}

/// Evaluator driven by the configured thresholds
#[derive(Debug, Clone)]
pub struct RuleEvaluator {
    rules: SeoRules,
}

impl RuleEvaluator {
    pub fn new(rules: SeoRules) -> Self {
        Self { rules }
    }
}

impl IssueEvaluator for RuleEvaluator {
    fn evaluate(&self, extract: &SeoExtract) -> Vec<SeoIssue> {
        evaluate(extract, &self.rules)
    }
}

/// Evaluates an extract against the rules
///
/// Checks run in a fixed order (title, meta description, H1 count, empty H1)
/// so the output for a given page is stable across runs.
pub fn evaluate(extract: &SeoExtract, rules: &SeoRules) -> Vec<SeoIssue> {
    let mut issues = Vec::new();

    check_length(
        &mut issues,
        extract.title.as_deref(),
        &rules.title,
        LengthChecks {
            missing: IssueType::MissingTitle,
            missing_details: "No title tag found",
            short: IssueType::ShortTitle,
            long: IssueType::LongTitle,
            label: "Title",
        },
    );

    check_length(
        &mut issues,
        extract.meta_description.as_deref(),
        &rules.meta_description,
        LengthChecks {
            missing: IssueType::MissingMetaDescription,
            missing_details: "No meta description found",
            short: IssueType::ShortMetaDescription,
            long: IssueType::LongMetaDescription,
            label: "Meta description",
        },
    );

    let headings = &rules.headings;
    let h1_count = extract.h1s.len();
    if h1_count < headings.min_h1 {
        issues.push(SeoIssue::new(
            IssueType::MissingH1,
            format!("No H1 tag found (recommended: {})", headings.min_h1),
        ));
    } else if h1_count > headings.max_h1 {
        issues.push(SeoIssue::new(
            IssueType::MultipleH1,
            format!(
                "Found {} H1 tags (recommended: {})",
                h1_count, headings.max_h1
            ),
        ));
    }

    if headings.warn_empty {
        let empty = extract.h1s.iter().filter(|h| h.trim().is_empty()).count();
        if empty > 0 {
            issues.push(SeoIssue::new(
                IssueType::EmptyH1,
                format!("Found {} empty H1 tag(s)", empty),
            ));
        }
    }

    issues
}

struct LengthChecks {
    missing: IssueType,
    missing_details: &'static str,
    short: IssueType,
    long: IssueType,
    label: &'static str,
}

fn check_length(
    issues: &mut Vec<SeoIssue>,
    value: Option<&str>,
    rule: &LengthRule,
    checks: LengthChecks,
) {
    let value = match value.filter(|v| !v.is_empty()) {
        Some(v) => v,
        None => {
            if rule.required {
                issues.push(SeoIssue::new(checks.missing, checks.missing_details));
            }
            return;
        }
    };

    let length = value.chars().count();
    let issue_type = if length < rule.min_length {
        checks.short
    } else if length > rule.max_length {
        checks.long
    } else {
        return;
    };

    issues.push(SeoIssue::new(
        issue_type,
        format!(
            "{} is {} characters (recommended: {}-{})",
            checks.label, length, rule.min_length, rule.max_length
        ),
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn good_extract() -> SeoExtract {
        SeoExtract {
            title: Some("A perfectly sized page title for tests".to_string()),
            meta_description: Some("m".repeat(140)),
            h1s: vec!["Welcome".to_string()],
            h2s: vec![],
        }
    }

    fn types(issues: &[SeoIssue]) -> Vec<IssueType> {
        issues.iter().map(|i| i.issue_type).collect()
    }

    #[test]
    fn test_clean_page_has_no_issues() {
        assert!(evaluate(&good_extract(), &SeoRules::default()).is_empty());
    }

    #[test]
    fn test_missing_title_and_meta() {
        let extract = SeoExtract {
            title: None,
            meta_description: Some(String::new()),
            ..good_extract()
        };
        let issues = evaluate(&extract, &SeoRules::default());
        assert_eq!(
            types(&issues),
            vec![IssueType::MissingTitle, IssueType::MissingMetaDescription]
        );
        assert_eq!(issues[0].details, "No title tag found");
    }

    #[test]
    fn test_missing_not_reported_when_optional() {
        let mut rules = SeoRules::default();
        rules.title.required = false;
        let extract = SeoExtract {
            title: None,
            ..good_extract()
        };
        assert!(evaluate(&extract, &rules).is_empty());
    }

    #[test]
    fn test_short_and_long_title() {
        let short = SeoExtract {
            title: Some("Home".to_string()),
            ..good_extract()
        };
        let issues = evaluate(&short, &SeoRules::default());
        assert_eq!(types(&issues), vec![IssueType::ShortTitle]);
        assert_eq!(
            issues[0].details,
            "Title is 4 characters (recommended: 30-60)"
        );

        let long = SeoExtract {
            title: Some("t".repeat(61)),
            ..good_extract()
        };
        assert_eq!(
            types(&evaluate(&long, &SeoRules::default())),
            vec![IssueType::LongTitle]
        );
    }

    #[test]
    fn test_title_bounds_are_inclusive() {
        for len in [30, 60] {
            let extract = SeoExtract {
                title: Some("t".repeat(len)),
                ..good_extract()
            };
            assert!(evaluate(&extract, &SeoRules::default()).is_empty());
        }
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        // 30 two-byte characters
        let extract = SeoExtract {
            title: Some("é".repeat(30)),
            ..good_extract()
        };
        assert!(evaluate(&extract, &SeoRules::default()).is_empty());
    }

    #[test]
    fn test_short_meta_description_details() {
        let extract = SeoExtract {
            meta_description: Some("Too short".to_string()),
            ..good_extract()
        };
        let issues = evaluate(&extract, &SeoRules::default());
        assert_eq!(types(&issues), vec![IssueType::ShortMetaDescription]);
        assert_eq!(
            issues[0].details,
            "Meta description is 9 characters (recommended: 120-160)"
        );
    }

    #[test]
    fn test_missing_h1() {
        let extract = SeoExtract {
            h1s: vec![],
            ..good_extract()
        };
        let issues = evaluate(&extract, &SeoRules::default());
        assert_eq!(types(&issues), vec![IssueType::MissingH1]);
        assert_eq!(issues[0].details, "No H1 tag found (recommended: 1)");
    }

    #[test]
    fn test_multiple_and_empty_h1() {
        let extract = SeoExtract {
            h1s: vec!["One".to_string(), "  ".to_string(), String::new()],
            ..good_extract()
        };
        let issues = evaluate(&extract, &SeoRules::default());
        assert_eq!(
            types(&issues),
            vec![IssueType::MultipleH1, IssueType::EmptyH1]
        );
        assert_eq!(issues[0].details, "Found 3 H1 tags (recommended: 1)");
        assert_eq!(issues[1].details, "Found 2 empty H1 tag(s)");
    }

    #[test]
    fn test_empty_h1_warning_can_be_disabled() {
        let mut rules = SeoRules::default();
        rules.headings.warn_empty = false;
        let extract = SeoExtract {
            h1s: vec![String::new()],
            ..good_extract()
        };
        assert!(evaluate(&extract, &rules).is_empty());
    }

    #[test]
    fn test_rule_evaluator_uses_its_rules() {
        let mut rules = SeoRules::default();
        rules.headings.max_h1 = 3;
        let evaluator = RuleEvaluator::new(rules);
        let extract = SeoExtract {
            h1s: vec!["a".to_string(), "b".to_string()],
            ..good_extract()
        };
        assert!(evaluator.evaluate(&extract).is_empty());
    }
}
