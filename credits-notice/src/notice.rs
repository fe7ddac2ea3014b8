//! Copyright notice parser
//!
//! Extracts copyright (`©`), phonographic copyright (`℗`) and legal
//! statements (licensing, distribution, marketing) from free-form credit text.
//!
//! # Algorithm
//! 1. Normalize the text (mark spellings, quotes, territorial grants).
//! 2. Copyright pass: mark run, optional `;`-terminated aside, optional year,
//!    owner name (co-owners split at slashes).
//! 3. Legal pass: `licensed to/from`, `distributed by`, `marketed by` + owner name.
//!
//! Both passes scan the whole text; legal statements follow all copyright
//! statements. Owner names end where [`NameBoundary`] says so.

use crate::boundary::{split_co_owners, NameBoundary};
use crate::transform::{transform, Rewrite, Substitution, TerritoryRewrite};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Characters `.` may match in the notice patterns
const LINE_CHAR: &str = r"[^\n\r\x{2028}\x{2029}]";

static NORMALIZATION_RULES: Lazy<Vec<Box<dyn Rewrite>>> = Lazy::new(|| {
    vec![
        substitution(r"(?i)\(C\)", "©"),
        substitution(r"(?i)\(P\)", "℗"),
        // a-tisket wraps names in French quotes
        substitution(&format!("«({LINE_CHAR}+?)»"), "${1}"),
        Box::new(TerritoryRewrite),
        // ℗ in front of "under" belongs to a licensing clause, not a mark
        substitution(r"(?i)℗\s*(under )", "${1}"),
    ]
});

static TYPE_RULES: Lazy<Vec<Box<dyn Rewrite>>> =
    Lazy::new(|| vec![substitution(r"licen[sc]ed?", "licensed")]);

static COPYRIGHT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"([©℗](?:\s*[&+]?\s*[©℗])?)(?:{LINE_CHAR}+?;)?\s*([0-9]{{4}})?\s+(?P<name>{LINE_CHAR})"
    ))
    .expect("copyright pattern is valid")
});

static LEGAL_INFO_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)(licen[sc]ed? (?:to|from)|(?:distributed|marketed) by)\s+(?P<name>{LINE_CHAR})"
    ))
    .expect("legal info pattern is valid")
});

fn substitution(pattern: &str, replacement: &str) -> Box<dyn Rewrite> {
    Box::new(Substitution::compile(pattern, replacement).expect("notice rule is valid"))
}

/// Kind of a copyright or legal statement
///
/// Open vocabulary: unknown labels are kept as [`StatementType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StatementType {
    /// `©`
    Copyright,
    /// `℗`
    Phonographic,
    /// `licensed` (direction kept in [`CopyrightStatement::license_direction`])
    Licensed,
    /// `distributed by`
    DistributedBy,
    /// `marketed by`
    MarketedBy,
    /// Any other cleaned label
    Other(String),
}

impl StatementType {
    /// Cleans a free-text label and maps it to a type
    ///
    /// Lower-cases and trims; every `licensed`/`licenced`/`license` spelling,
    /// with or without `to`/`from`, becomes [`StatementType::Licensed`].
    pub fn from_label(label: &str) -> Self {
        let cleaned = clean_label(label);
        match cleaned.as_str() {
            "©" => StatementType::Copyright,
            "℗" => StatementType::Phonographic,
            "licensed" | "licensed to" | "licensed from" => StatementType::Licensed,
            "distributed by" => StatementType::DistributedBy,
            "marketed by" => StatementType::MarketedBy,
            _ => StatementType::Other(cleaned),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            StatementType::Copyright => "©",
            StatementType::Phonographic => "℗",
            StatementType::Licensed => "licensed",
            StatementType::DistributedBy => "distributed by",
            StatementType::MarketedBy => "marketed by",
            StatementType::Other(label) => label,
        }
    }
}

impl fmt::Display for StatementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for StatementType {
    fn from(label: String) -> Self {
        StatementType::from_label(&label)
    }
}

impl From<StatementType> for String {
    fn from(statement_type: StatementType) -> Self {
        statement_type.as_str().to_string()
    }
}

/// Direction of a licensing statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LicenseDirection {
    /// `licensed to <owner>`
    To,
    /// `licensed from <owner>`
    From,
}

impl LicenseDirection {
    /// Direction named by the last word of a licensing label
    pub fn from_label(label: &str) -> Option<Self> {
        let cleaned = clean_label(label);
        if !cleaned.starts_with("licensed") {
            return None;
        }
        match cleaned.rsplit(' ').next() {
            Some("to") => Some(LicenseDirection::To),
            Some("from") => Some(LicenseDirection::From),
            _ => None,
        }
    }
}

/// One extracted copyright or legal fact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyrightStatement {
    /// Owner name (label or artist), trimmed and non-empty
    pub name: String,
    /// Statement types in order of appearance, without duplicates
    pub types: Vec<StatementType>,
    /// Four-digit year
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    /// Direction of a `licensed` statement
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_direction: Option<LicenseDirection>,
}

impl CopyrightStatement {
    pub fn new(name: impl Into<String>, types: Vec<StatementType>, year: Option<String>) -> Self {
        let mut unique: Vec<StatementType> = Vec::with_capacity(types.len());
        for statement_type in types {
            if !unique.contains(&statement_type) {
                unique.push(statement_type);
            }
        }
        Self {
            name: name.into(),
            types: unique,
            year,
            license_direction: None,
        }
    }

    pub fn with_license_direction(mut self, direction: Option<LicenseDirection>) -> Self {
        self.license_direction = direction;
        self
    }
}

/// Standardizes spellings the patterns do not cover
pub fn normalize_notice(text: &str) -> String {
    transform(text, &NORMALIZATION_RULES)
}

/// Extracts all copyright and legal statements from `text`
///
/// Text without any statement yields an empty vector.
pub fn parse_copyright_notice(text: &str) -> Vec<CopyrightStatement> {
    let text = normalize_notice(text);
    let mut statements = Vec::new();

    let mut pos = 0;
    while let Some(captures) = COPYRIGHT_PATTERN.captures_at(&text, pos) {
        let Some(name_match) = captures.name("name") else {
            break;
        };
        let name_start = name_match.start();
        let name_end = name_start + NameBoundary::STRICT.name_len(&text[name_start..]);

        let types = mark_types(&captures[1]);
        let year = captures.get(2).map(|m| m.as_str().to_string());

        for owner in split_co_owners(&text[name_start..name_end]) {
            statements.push(CopyrightStatement::new(owner, types.clone(), year.clone()));
        }
        pos = name_end;
    }

    let mut pos = 0;
    while let Some(captures) = LEGAL_INFO_PATTERN.captures_at(&text, pos) {
        let Some(name_match) = captures.name("name") else {
            break;
        };
        let name_start = name_match.start();
        let name_end = name_start + NameBoundary::IGNORE_CASE.name_len(&text[name_start..]);

        let label = &captures[1];
        let name = text[name_start..name_end].trim();
        if !name.is_empty() {
            statements.push(
                CopyrightStatement::new(name, vec![StatementType::from_label(label)], None)
                    .with_license_direction(LicenseDirection::from_label(label)),
            );
        }
        pos = name_end;
    }

    statements
}

/// One type per mark of a run such as `℗&©` or `© + ℗`
fn mark_types(run: &str) -> Vec<StatementType> {
    run.chars()
        .filter(|c| matches!(c, '©' | '℗'))
        .map(|mark| StatementType::from_label(&mark.to_string()))
        .collect()
}

fn clean_label(label: &str) -> String {
    transform(&label.trim().to_lowercase(), &TYPE_RULES)
}
