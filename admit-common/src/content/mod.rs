//! Training content: sections, exercises, and the final assessment

pub mod catalog;
pub mod types;

pub use catalog::{AssessmentGrade, Catalog, QuestionResult, PASSING_SCORE};
pub use types::{
    AssessmentQuestion, CalloutVariant, ContentBlock, Exercise, MultipleChoiceExercise, Section,
    ShortAnswerExercise, VoiceExercise,
};
