//! Read-only gate for generated SQL
//!
//! Allow-list first (the statement must start with `select`), then a
//! whole-word deny-list of mutating keywords.

use std::fmt;

use regex::Regex;
use serde::Serialize;

use crate::normalize::NormalizedQuery;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MutatingKeyword {
    Delete,
    Drop,
    Update,
    Insert,
    Alter,
    Truncate,
}

impl MutatingKeyword {
    /// Deny-list in the order it is checked
    pub const ALL: [MutatingKeyword; 6] = [
        MutatingKeyword::Delete,
        MutatingKeyword::Drop,
        MutatingKeyword::Update,
        MutatingKeyword::Insert,
        MutatingKeyword::Alter,
        MutatingKeyword::Truncate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MutatingKeyword::Delete => "DELETE",
            MutatingKeyword::Drop => "DROP",
            MutatingKeyword::Update => "UPDATE",
            MutatingKeyword::Insert => "INSERT",
            MutatingKeyword::Alter => "ALTER",
            MutatingKeyword::Truncate => "TRUNCATE",
        }
    }
}

impl fmt::Display for MutatingKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of the safety and intent checks; only `Safe` may be executed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Verdict {
    Safe,
    /// `None` when the statement is not a SELECT at all
    UnsafeKeyword(Option<MutatingKeyword>),
    /// Carries the generic template the query matched
    AmbiguousFallback(String),
}

impl Verdict {
    pub fn is_safe(&self) -> bool {
        matches!(self, Verdict::Safe)
    }
}

pub struct SafetyValidator {
    read_statement: Regex,
    deny_list: Vec<(MutatingKeyword, Regex)>,
}

impl SafetyValidator {
    pub fn new() -> Self {
        let deny_list = MutatingKeyword::ALL
            .iter()
            .map(|kw| {
                let re = Regex::new(&format!(r"\b{}\b", kw.as_str().to_lowercase()))
                    .expect("keyword pattern compiles");
                (*kw, re)
            })
            .collect();

        Self {
            read_statement: Regex::new(r"^select\b").expect("select pattern compiles"),
            deny_list,
        }
    }

    pub fn validate(&self, query: &NormalizedQuery) -> Verdict {
        self.validate_sql(query.as_str())
    }

    pub fn validate_sql(&self, sql: &str) -> Verdict {
        let cleaned = sql.trim().to_lowercase();

        if !self.read_statement.is_match(&cleaned) {
            return Verdict::UnsafeKeyword(None);
        }

        for (keyword, re) in &self.deny_list {
            if re.is_match(&cleaned) {
                return Verdict::UnsafeKeyword(Some(*keyword));
            }
        }

        Verdict::Safe
    }
}

impl Default for SafetyValidator {
    fn default() -> Self {
        Self::new()
    }
}
