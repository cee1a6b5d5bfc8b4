//! Rewrites raw oracle output into single-line SQLite SQL
//!
//! Rules run in a fixed order; later rules assume the earlier ones already
//! ran (the spacing fixes expect a single line, the LIMIT check expects the
//! compound keywords to be split). The normalizer never rejects input.

use std::fmt;

use regex::{Captures, Regex};
use serde::Serialize;

/// Tokens matched by the keyword-spacing rule that are SQLite keywords or
/// functions in their own right.
const SPACING_EXEMPT: &[&str] = &["ASC", "ASCII", "ASIN", "ASINH"];

/// SQL that went through every normalization rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NormalizedQuery(String);

impl NormalizedQuery {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for NormalizedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedQuery {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

pub struct Normalizer {
    fence_open: Regex,
    fence_close: Regex,
    line_breaks: Regex,
    curdate: Regex,
    now_minus_days: Regex,
    glued_keyword: Regex,
    group_by: Regex,
    order_by: Regex,
    desc_limit: Regex,
    limit_clause: Regex,
    first_cue: Regex,
}

impl Normalizer {
    pub fn new() -> Self {
        Self {
            // A language tag counts only as `sql`/`sqlite` or when a line break
            // follows it, so an inline fence keeps its leading keyword.
            fence_open: pattern(r"^\s*```(?:(?i:sql|sqlite)\b|[A-Za-z0-9_+-]+[ \t]*\r?\n)?"),
            fence_close: pattern(r"```\s*$"),
            line_breaks: pattern(r"[ \t]*[\r\n]+[ \t]*"),
            curdate: pattern(r"(?i)\bCURDATE\s*\(\s*\)"),
            now_minus_days: pattern(
                r"(?i)\bNOW\s*\(\s*\)\s*-\s*INTERVAL\s+'?(\d+)'?\s+DAYS?\b",
            ),
            glued_keyword: pattern(r"\b(AS|FROM|WHERE)(\w+)"),
            group_by: pattern(r"(?i)GROUPBY"),
            order_by: pattern(r"(?i)ORDERBY"),
            desc_limit: pattern(r"(?i)\b(DESC)(LIMIT)\b"),
            limit_clause: pattern(r"(?i)\blimit\b"),
            first_cue: pattern(r"(?i)\b(first|erste|ersten|erster|zuerst)\b"),
        }
    }

    /// Apply every rule to `raw`; `utterance` is the user's original sentence.
    pub fn normalize(&self, raw: &str, utterance: &str) -> NormalizedQuery {
        let query = self.strip_fences(raw);
        let query = self.collapse_statement_breaks(&query);
        let query = query.trim();
        let query = self.rewrite_dialect(query);
        let query = self.space_glued_keywords(&query);
        let query = self.split_compound_keywords(&query);
        let query = self.inject_limit(query.trim().to_string(), utterance);

        NormalizedQuery(query)
    }

    fn strip_fences(&self, raw: &str) -> String {
        let stripped = self.fence_open.replace(raw, "");
        self.fence_close.replace(&stripped, "").into_owned()
    }

    /// Newline runs become one space, semicolons disappear.
    fn collapse_statement_breaks(&self, query: &str) -> String {
        self.line_breaks.replace_all(query, " ").replace(';', "")
    }

    fn rewrite_dialect(&self, query: &str) -> String {
        let query = self.curdate.replace_all(query, "date('now')");
        self.now_minus_days
            .replace_all(&query, "date('now','-${1} days')")
            .into_owned()
    }

    fn space_glued_keywords(&self, query: &str) -> String {
        self.glued_keyword
            .replace_all(query, |caps: &Captures| {
                let token = &caps[0];
                if SPACING_EXEMPT.contains(&token) {
                    token.to_string()
                } else {
                    format!("{} {}", &caps[1], &caps[2])
                }
            })
            .into_owned()
    }

    fn split_compound_keywords(&self, query: &str) -> String {
        let query = self.group_by.replace_all(query, "GROUP BY");
        let query = self.order_by.replace_all(&query, "ORDER BY");
        self.desc_limit.replace_all(&query, "${1} ${2}").into_owned()
    }

    fn inject_limit(&self, mut query: String, utterance: &str) -> String {
        if self.first_cue.is_match(utterance) && !self.limit_clause.is_match(&query) {
            tracing::debug!(utterance, "superlative cue without LIMIT, appending LIMIT 1");
            query.push_str(" LIMIT 1");
        }
        query
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

fn pattern(re: &str) -> Regex {
    Regex::new(re).expect("hard-coded normalization pattern compiles")
}
