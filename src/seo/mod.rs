//! On-page SEO data and the rules that turn it into issues
//!
//! - `SeoExtract`: the fields pulled out of a crawled page
//! - `IssueType` / `SeoIssue`: the closed set of problems the evaluator reports
//! - `RuleEvaluator`: threshold-driven evaluation of an extract

mod rules;

pub use rules::{evaluate, IssueEvaluator, RuleEvaluator};

use std::fmt;

/// SEO fields extracted from a successfully crawled page
///
/// Replaced wholesale on every re-crawl.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeoExtract {
    pub title: Option<String>,
    pub meta_description: Option<String>,
    /// H1 texts in document order
    pub h1s: Vec<String>,
    /// H2 texts in document order
    pub h2s: Vec<String>,
}

/// Kind of SEO problem found on a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IssueType {
    MissingTitle,
    ShortTitle,
    LongTitle,
    MissingMetaDescription,
    ShortMetaDescription,
    LongMetaDescription,
    MissingH1,
    MultipleH1,
    EmptyH1,
}

impl IssueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingTitle => "missing_title",
            Self::ShortTitle => "short_title",
            Self::LongTitle => "long_title",
            Self::MissingMetaDescription => "missing_meta_description",
            Self::ShortMetaDescription => "short_meta_description",
            Self::LongMetaDescription => "long_meta_description",
            Self::MissingH1 => "missing_h1",
            Self::MultipleH1 => "multiple_h1",
            Self::EmptyH1 => "empty_h1",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::all().into_iter().find(|t| t.as_str() == s)
    }

    pub fn all() -> [Self; 9] {
        [
            Self::MissingTitle,
            Self::ShortTitle,
            Self::LongTitle,
            Self::MissingMetaDescription,
            Self::ShortMetaDescription,
            Self::LongMetaDescription,
            Self::MissingH1,
            Self::MultipleH1,
            Self::EmptyH1,
        ]
    }

    /// Severity bucket used by the report
    pub fn severity(&self) -> Severity {
        match self {
            Self::MissingTitle | Self::MissingH1 => Severity::Critical,
            Self::MissingMetaDescription | Self::MultipleH1 => Severity::Major,
            _ => Severity::Minor,
        }
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How bad a page is, judged by its worst issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Critical,
    Major,
    Minor,
    Clean,
}

impl Severity {
    /// Worst severity among a page's issues; `Clean` when there are none
    pub fn of(issues: &[SeoIssue]) -> Self {
        issues
            .iter()
            .map(|i| i.issue_type.severity())
            .min()
            .unwrap_or(Self::Clean)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Critical => "Critical",
            Self::Major => "Major",
            Self::Minor => "Minor",
            Self::Clean => "Clean",
        }
    }
}

/// A single problem found on a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeoIssue {
    pub issue_type: IssueType,
    pub details: String,
}

impl SeoIssue {
    pub fn new(issue_type: IssueType, details: impl Into<String>) -> Self {
        Self {
            issue_type,
            details: details.into(),
        }
    }
}
