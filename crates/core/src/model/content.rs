use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::catalog::CatalogEntry;
use crate::model::ids::ItemId;

//
// ─── CONTENT TYPES ─────────────────────────────────────────────────────────────
//

/// Whether a judge rule applies for the whole game or only for one turn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    Permanent,
    #[default]
    Card,
}

/// Category-specific payload of a content item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContentPayload {
    /// Multiple-choice trivia question.
    Question {
        text: String,
        options: Vec<String>,
        correct_answer: String,
    },
    /// Confession, challenge, most-likely prompt or penalty text.
    Prompt { text: String },
    /// Judge rule card.
    Rule {
        text: String,
        #[serde(default)]
        scope: RuleKind,
    },
    /// Charades word.
    Word { text: String },
}

/// One playable record in a content catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: ItemId,
    #[serde(flatten)]
    pub payload: ContentPayload,
}

//
// ─── VALIDATION ERRORS ─────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ContentError {
    #[error("item {0}: text cannot be empty")]
    EmptyText(ItemId),

    #[error("item {0}: a question needs at least two options")]
    TooFewOptions(ItemId),

    #[error("item {id}: correct answer {answer:?} is not one of the options")]
    AnswerNotInOptions { id: ItemId, answer: String },
}

//
// ─── CONTENT ITEM IMPL ─────────────────────────────────────────────────────────
//

impl ContentItem {
    #[must_use]
    pub fn new(id: ItemId, payload: ContentPayload) -> Self {
        Self { id, payload }
    }

    /// Headline text shown to players, whatever the payload kind.
    #[must_use]
    pub fn text(&self) -> &str {
        match &self.payload {
            ContentPayload::Question { text, .. }
            | ContentPayload::Prompt { text }
            | ContentPayload::Rule { text, .. }
            | ContentPayload::Word { text } => text,
        }
    }

    /// Check authoring rules for the payload.
    ///
    /// # Errors
    ///
    /// Returns `ContentError` if text is blank or a question's answer key
    /// does not match one of its options.
    pub fn validate(self) -> Result<Self, ContentError> {
        if self.text().trim().is_empty() {
            return Err(ContentError::EmptyText(self.id));
        }

        if let ContentPayload::Question {
            options,
            correct_answer,
            ..
        } = &self.payload
        {
            if options.len() < 2 {
                return Err(ContentError::TooFewOptions(self.id));
            }
            if !options.iter().any(|o| o == correct_answer) {
                return Err(ContentError::AnswerNotInOptions {
                    answer: correct_answer.clone(),
                    id: self.id,
                });
            }
        }

        Ok(self)
    }
}

impl CatalogEntry for ContentItem {
    fn id(&self) -> &ItemId {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: &str) -> ItemId {
        ItemId::new(raw).unwrap()
    }

    #[test]
    fn deserializes_tagged_payloads() {
        let raw = r#"[
            {"id": "gq_1", "kind": "question", "text": "Capital of France?",
             "options": ["Berlin", "Paris", "Madrid"], "correct_answer": "Paris"},
            {"id": "p_1", "kind": "prompt", "text": "Sing a song"},
            {"id": "pr_1", "kind": "rule", "text": "No saying no", "scope": "permanent"},
            {"id": "cm_1", "kind": "rule", "text": "Clap twice when laughing"},
            {"id": "w_1", "kind": "word", "text": "Elephant"}
        ]"#;
        let items: Vec<ContentItem> = serde_json::from_str(raw).unwrap();

        assert_eq!(items.len(), 5);
        assert_eq!(items[0].text(), "Capital of France?");
        assert_eq!(
            items[2].payload,
            ContentPayload::Rule {
                text: "No saying no".into(),
                scope: RuleKind::Permanent,
            }
        );
        assert!(matches!(
            items[3].payload,
            ContentPayload::Rule {
                scope: RuleKind::Card,
                ..
            }
        ));
        assert_eq!(items[4].id, id("w_1"));
    }

    #[test]
    fn rejects_blank_text() {
        let item = ContentItem::new(id("p_1"), ContentPayload::Prompt { text: "  ".into() });
        assert_eq!(item.validate(), Err(ContentError::EmptyText(id("p_1"))));
    }

    #[test]
    fn rejects_answer_outside_options() {
        let item = ContentItem::new(
            id("gq_2"),
            ContentPayload::Question {
                text: "How many continents?".into(),
                options: vec!["5".into(), "6".into()],
                correct_answer: "7".into(),
            },
        );
        assert!(matches!(
            item.validate(),
            Err(ContentError::AnswerNotInOptions { .. })
        ));
    }

    #[test]
    fn rejects_single_option_question() {
        let item = ContentItem::new(
            id("gq_3"),
            ContentPayload::Question {
                text: "Largest planet?".into(),
                options: vec!["Jupiter".into()],
                correct_answer: "Jupiter".into(),
            },
        );
        assert_eq!(item.validate(), Err(ContentError::TooFewOptions(id("gq_3"))));
    }
}
