//! Prompt construction for the completion oracle

use serde::{Deserialize, Serialize};

use crate::error::InputError;
use crate::schema::Schema;

/// Translation rules handed to the oracle ahead of the schema.
const SYSTEM_RULES: &str = r#"You are an SQL expert. Convert user input into SQL SELECT statements only.
Return a single SQLite SELECT statement without explanations or markdown.
Rules:
- Use only SELECT (no DELETE, DROP, UPDATE, INSERT, ALTER, TRUNCATE)
- 'neueste/r', 'letzte/r', 'aktuelle/r', 'most recent', 'latest' → ORDER BY <date_field> DESC LIMIT 1
- 'älteste/r', 'oldest' → ORDER BY <date_field> ASC LIMIT 1
- 'letzten X', 'last X' → ORDER BY <date_field> DESC LIMIT X
- 'wie viele', 'how many' → SELECT COUNT(*) AS count ...
- 'am meisten gekauft/verkauft/beliebt', 'bought/sold the most':
   * customers → GROUP BY customer_id ORDER BY SUM(total_amount) DESC
   * products → GROUP BY product_id ORDER BY SUM(quantity) DESC LIMIT 1
- 'Top X' → ORDER BY SUM(...) DESC LIMIT X
Use SQLite date syntax: date('now'), date('now','-X days')"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

/// Generation parameters sent with every completion request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl GenerationSettings {
    /// Settings for `model`; temperature stays pinned at zero.
    pub fn new(model: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            model: model.into(),
            temperature: 0.0,
            max_tokens,
        }
    }
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self::new("gpt-4o-mini", 150)
    }
}

/// One completion request: the utterance, the schema text and the
/// generation parameters, already laid out as role-tagged messages.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationRequest {
    utterance: String,
    schema_description: String,
    settings: GenerationSettings,
    messages: Vec<ChatMessage>,
}

impl TranslationRequest {
    pub fn new(
        utterance: &str,
        schema: &Schema,
        settings: GenerationSettings,
    ) -> Result<Self, InputError> {
        let utterance = utterance.trim();
        if utterance.is_empty() {
            return Err(InputError::EmptyUtterance);
        }

        let schema_description = schema.describe();
        let messages = build_messages(utterance, &schema_description);

        Ok(Self {
            utterance: utterance.to_string(),
            schema_description,
            settings,
            messages,
        })
    }

    pub fn utterance(&self) -> &str {
        &self.utterance
    }

    pub fn schema_description(&self) -> &str {
        &self.schema_description
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }
}

fn build_messages(utterance: &str, schema_description: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage {
            role: Role::System,
            content: format!("{}\nDatabase schema:\n{}", SYSTEM_RULES, schema_description),
        },
        ChatMessage {
            role: Role::User,
            content: utterance.to_string(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_utterance_rejected() {
        let schema = Schema::sales();
        for blank in ["", "   ", "\n\t"] {
            let err = TranslationRequest::new(blank, &schema, GenerationSettings::default());
            assert_eq!(err.unwrap_err(), InputError::EmptyUtterance);
        }
    }

    #[test]
    fn test_two_messages_system_then_user() {
        let schema = Schema::sales();
        let request =
            TranslationRequest::new("  Wer ist der neueste Kunde?  ", &schema, GenerationSettings::default())
                .unwrap();

        let messages = request.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[1].role, Role::User);
        assert_eq!(messages[1].content, "Wer ist der neueste Kunde?");
        assert_eq!(request.utterance(), "Wer ist der neueste Kunde?");
    }

    #[test]
    fn test_system_prompt_contains_rules_and_schema() {
        let schema = Schema::sales();
        let request = TranslationRequest::new("how many customers?", &schema, GenerationSettings::default())
            .unwrap();
        let system = &request.messages()[0].content;

        assert!(system.contains("SELECT statements only"));
        assert!(system.contains("ORDER BY <date_field> DESC LIMIT 1"));
        assert!(system.contains("SELECT COUNT(*)"));
        assert!(system.contains("ORDER BY SUM(...) DESC LIMIT X"));
        assert!(system.contains("date('now','-X days')"));
        assert!(system.contains(&schema.describe()));
        assert_eq!(request.schema_description(), schema.describe());
    }

    #[test]
    fn test_default_settings_pin_temperature() {
        let settings = GenerationSettings::default();
        assert_eq!(settings.model, "gpt-4o-mini");
        assert_eq!(settings.temperature, 0.0);
        assert_eq!(settings.max_tokens, 150);
        assert_eq!(GenerationSettings::new("gpt-4o", 300).temperature, 0.0);
    }
}
