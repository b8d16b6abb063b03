//! Training content types
//!
//! The same shapes deserialize from the content TOML files and serialize
//! to JSON for the browser.

use serde::{Deserialize, Serialize};

use crate::models::ExerciseType;

/// Callout emphasis
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CalloutVariant {
    Info,
    Warning,
    Tip,
}

/// One block of section reading material
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Markdown text
    Text { content: String },
    Callout {
        variant: CalloutVariant,
        content: String,
    },
    Table {
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    Quote {
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        attribution: Option<String>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MultipleChoiceExercise {
    pub id: String,
    pub question: String,
    pub options: Vec<String>,
    pub correct_index: usize,
    pub explanation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShortAnswerExercise {
    pub id: String,
    pub question: String,
    pub sample_answer: String,
}

/// Spoken-response exercise evaluated by the feedback model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VoiceExercise {
    pub id: String,
    /// What the simulated parent says
    pub scenario: String,
    /// Shown to the trainee before recording
    pub guidance: String,
    /// Evaluation criteria handed to the feedback model
    pub ai_prompt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Exercise {
    MultipleChoice(MultipleChoiceExercise),
    ShortAnswer(ShortAnswerExercise),
    Voice(VoiceExercise),
}

impl Exercise {
    pub fn id(&self) -> &str {
        match self {
            Exercise::MultipleChoice(e) => &e.id,
            Exercise::ShortAnswer(e) => &e.id,
            Exercise::Voice(e) => &e.id,
        }
    }

    pub fn exercise_type(&self) -> ExerciseType {
        match self {
            Exercise::MultipleChoice(_) => ExerciseType::MultipleChoice,
            Exercise::ShortAnswer(_) => ExerciseType::ShortAnswer,
            Exercise::Voice(_) => ExerciseType::Voice,
        }
    }

    pub fn as_voice(&self) -> Option<&VoiceExercise> {
        match self {
            Exercise::Voice(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_multiple_choice(&self) -> Option<&MultipleChoiceExercise> {
        match self {
            Exercise::MultipleChoice(m) => Some(m),
            _ => None,
        }
    }
}

/// A training module
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Section {
    pub id: String,
    pub title: String,
    pub estimated_minutes: u32,
    #[serde(default)]
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
}

impl Section {
    pub fn exercise(&self, id: &str) -> Option<&Exercise> {
        self.exercises.iter().find(|e| e.id() == id)
    }

    pub fn voice_exercise_count(&self) -> usize {
        self.exercises.iter().filter(|e| e.as_voice().is_some()).count()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssessmentQuestion {
    pub id: String,
    pub question: String,
    pub options: Vec<String>,
    pub correct_index: usize,
    pub explanation: String,
    /// Title of the section the question draws on
    pub module: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exercise_tagged_deserialize() {
        let exercise: Exercise = toml::from_str(
            r#"
            type = "voice"
            id = "v-1"
            scenario = "A parent asks..."
            guidance = "Cover the basics"
            ai_prompt = "Evaluate"
            "#,
        )
        .unwrap();

        assert_eq!(exercise.id(), "v-1");
        assert_eq!(exercise.exercise_type(), ExerciseType::Voice);
        assert!(exercise.as_voice().is_some());
        assert!(exercise.as_multiple_choice().is_none());
    }

    #[test]
    fn test_content_block_json_shape() {
        let block = ContentBlock::Callout {
            variant: CalloutVariant::Tip,
            content: "Listen first".to_string(),
        };
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["type"], "callout");
        assert_eq!(json["variant"], "tip");

        let quote = ContentBlock::Quote {
            content: "We guide.".to_string(),
            attribution: None,
        };
        let json = serde_json::to_value(&quote).unwrap();
        assert!(json.get("attribution").is_none());
    }
}
