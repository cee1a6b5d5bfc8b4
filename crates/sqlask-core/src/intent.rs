//! Blocks catch-all queries the user did not ask for
//!
//! When the oracle cannot map an utterance to a filter it tends to answer
//! `select * from <table>`. Such a query is only executed when the utterance
//! explicitly asks for all records. Matching is exact (case-insensitive)
//! against the templates derived from the schema; equivalent rewrites with
//! extra whitespace or explicit column lists are not detected.

use crate::normalize::NormalizedQuery;
use crate::safety::Verdict;
use crate::schema::Schema;

/// Words that make a request for every row explicit
const ALL_CUES: &[&str] = &["all", "alle", "allen", "aller", "alles", "every", "everything"];

pub const CLARIFICATION_MESSAGE: &str =
    "Hinweis: Ich konnte deine Eingabe nicht verstehen. Formuliere deine Eingabe klarer.";

pub struct IntentGuard {
    generic_queries: Vec<String>,
}

impl IntentGuard {
    pub fn new(schema: &Schema) -> Self {
        Self {
            generic_queries: schema.generic_queries(),
        }
    }

    pub fn generic_queries(&self) -> &[String] {
        &self.generic_queries
    }

    pub fn check(&self, query: &NormalizedQuery, utterance: &str) -> Verdict {
        let lowered = query.as_str().to_lowercase();

        match self.generic_queries.iter().find(|g| **g == lowered) {
            Some(template) if !requests_all(utterance) => {
                Verdict::AmbiguousFallback(template.clone())
            }
            _ => Verdict::Safe,
        }
    }
}

fn requests_all(utterance: &str) -> bool {
    utterance
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| ALL_CUES.contains(&word))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::Normalizer;

    fn check(raw: &str, utterance: &str) -> Verdict {
        let guard = IntentGuard::new(&Schema::sales());
        let query = Normalizer::new().normalize(raw, utterance);
        guard.check(&query, utterance)
    }

    #[test]
    fn test_explicit_all_allows_generic_query() {
        assert_eq!(check("select * from customers", "Zeig mir alle Kunden"), Verdict::Safe);
        assert_eq!(check("SELECT * FROM products", "Show me all products"), Verdict::Safe);
    }

    #[test]
    fn test_generic_query_without_cue_is_ambiguous() {
        assert_eq!(
            check("select * from customers", "Wer ist das?"),
            Verdict::AmbiguousFallback("select * from customers".to_string())
        );
        assert_eq!(
            check("SELECT * FROM Sales", "Welcher Verkauf ist der größte?"),
            Verdict::AmbiguousFallback("select * from sales".to_string())
        );
    }

    #[test]
    fn test_specific_query_passes_without_cue() {
        assert_eq!(
            check("SELECT * FROM customers WHERE city = 'Berlin'", "Welche Kunden sind in Berlin?"),
            Verdict::Safe
        );
    }

    #[test]
    fn test_all_cue_matches_whole_words_only() {
        assert!(requests_all("Zeig mir ALLE Mitarbeiter"));
        assert!(requests_all("list everything"));
        assert!(!requests_all("Welche Produkte sind klein und small?"));
        assert!(!requests_all("Kunden aus Halle"));
    }

    #[test]
    fn test_templates_follow_schema() {
        let guard = IntentGuard::new(&Schema::sales());
        assert_eq!(
            guard.generic_queries(),
            &[
                "select * from sales",
                "select * from customers",
                "select * from products",
                "select * from employees",
            ]
        );
    }
}
