//! Section and assessment catalog
//!
//! Loaded once at startup from the embedded TOML files, or from a content
//! directory that overrides either file.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

use super::types::{AssessmentQuestion, Exercise, Section};
use crate::models::AssessmentAnswers;
use crate::{Error, Result};

const EMBEDDED_SECTIONS: &str = include_str!("../../content/sections.toml");
const EMBEDDED_ASSESSMENT: &str = include_str!("../../content/assessment.toml");

pub const SECTIONS_FILE: &str = "sections.toml";
pub const ASSESSMENT_FILE: &str = "assessment.toml";

/// Minimum number of correct answers to pass the final assessment
pub const PASSING_SCORE: i64 = 12;

#[derive(Debug, Deserialize)]
struct SectionsFile {
    sections: Vec<Section>,
}

#[derive(Debug, Deserialize)]
struct AssessmentFile {
    questions: Vec<AssessmentQuestion>,
}

/// Grading outcome for one assessment question
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResult {
    pub question_id: String,
    pub selected: Option<u32>,
    pub correct_index: usize,
    pub correct: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AssessmentGrade {
    pub details: Vec<QuestionResult>,
    pub score: i64,
    pub total: i64,
    pub passed: bool,
}

/// Immutable training content
#[derive(Debug, Clone)]
pub struct Catalog {
    sections: Vec<Section>,
    questions: Vec<AssessmentQuestion>,
}

impl Catalog {
    /// Build from TOML sources, validating ids and answer indices
    pub fn from_toml(sections_toml: &str, assessment_toml: &str) -> Result<Self> {
        let sections: SectionsFile = toml::from_str(sections_toml)
            .map_err(|e| Error::Config(format!("Invalid sections content: {}", e)))?;
        let assessment: AssessmentFile = toml::from_str(assessment_toml)
            .map_err(|e| Error::Config(format!("Invalid assessment content: {}", e)))?;

        let catalog = Self {
            sections: sections.sections,
            questions: assessment.questions,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    /// The content compiled into the binary
    pub fn embedded() -> Result<Self> {
        Self::from_toml(EMBEDDED_SECTIONS, EMBEDDED_ASSESSMENT)
    }

    /// Load content, letting files in `content_dir` replace the embedded ones
    pub fn load(content_dir: Option<&Path>) -> Result<Self> {
        let Some(dir) = content_dir else {
            return Self::embedded();
        };

        let sections = read_override(dir, SECTIONS_FILE)?;
        let assessment = read_override(dir, ASSESSMENT_FILE)?;

        Self::from_toml(
            sections.as_deref().unwrap_or(EMBEDDED_SECTIONS),
            assessment.as_deref().unwrap_or(EMBEDDED_ASSESSMENT),
        )
    }

    fn validate(&self) -> Result<()> {
        let mut section_ids = HashSet::new();
        let mut exercise_ids = HashSet::new();

        for section in &self.sections {
            if !section_ids.insert(section.id.as_str()) {
                return Err(Error::Config(format!("Duplicate section id: {}", section.id)));
            }
            for exercise in &section.exercises {
                if !exercise_ids.insert(exercise.id()) {
                    return Err(Error::Config(format!(
                        "Duplicate exercise id: {}",
                        exercise.id()
                    )));
                }
                if let Exercise::MultipleChoice(mc) = exercise {
                    if mc.correct_index >= mc.options.len() {
                        return Err(Error::Config(format!(
                            "Exercise {} correct_index {} out of range",
                            mc.id, mc.correct_index
                        )));
                    }
                }
            }
        }

        let mut question_ids = HashSet::new();
        for question in &self.questions {
            if !question_ids.insert(question.id.as_str()) {
                return Err(Error::Config(format!("Duplicate question id: {}", question.id)));
            }
            if question.correct_index >= question.options.len() {
                return Err(Error::Config(format!(
                    "Question {} correct_index {} out of range",
                    question.id, question.correct_index
                )));
            }
        }

        Ok(())
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section_ids(&self) -> Vec<&str> {
        self.sections.iter().map(|s| s.id.as_str()).collect()
    }

    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    pub fn section_index(&self, id: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.id == id)
    }

    /// None for the last section or an unknown id
    pub fn next_section(&self, id: &str) -> Option<&Section> {
        let index = self.section_index(id)?;
        self.sections.get(index + 1)
    }

    /// None for the first section or an unknown id
    pub fn previous_section(&self, id: &str) -> Option<&Section> {
        let index = self.section_index(id)?;
        index.checked_sub(1).and_then(|i| self.sections.get(i))
    }

    pub fn exercise(&self, section_id: &str, exercise_id: &str) -> Option<&Exercise> {
        self.section(section_id)?.exercise(exercise_id)
    }

    /// Exercise lookup across all sections, with its section id
    pub fn find_exercise(&self, exercise_id: &str) -> Option<(&str, &Exercise)> {
        self.sections.iter().find_map(|s| {
            s.exercise(exercise_id)
                .map(|exercise| (s.id.as_str(), exercise))
        })
    }

    pub fn total_sections(&self) -> usize {
        self.sections.len()
    }

    pub fn total_minutes(&self) -> u32 {
        self.sections.iter().map(|s| s.estimated_minutes).sum()
    }

    pub fn assessment_questions(&self) -> &[AssessmentQuestion] {
        &self.questions
    }

    pub fn total_questions(&self) -> i64 {
        self.questions.len() as i64
    }

    /// Grade a submission; unanswered questions count as wrong
    pub fn grade_assessment(&self, answers: &AssessmentAnswers) -> AssessmentGrade {
        let details: Vec<QuestionResult> = self
            .questions
            .iter()
            .map(|q| {
                let selected = answers.get(&q.id).copied();
                QuestionResult {
                    question_id: q.id.clone(),
                    selected,
                    correct_index: q.correct_index,
                    correct: selected.map(|s| s as usize) == Some(q.correct_index),
                }
            })
            .collect();

        let score = details.iter().filter(|d| d.correct).count() as i64;

        AssessmentGrade {
            details,
            score,
            total: self.total_questions(),
            passed: crate::scoring::is_passing(score),
        }
    }
}

fn read_override(dir: &Path, file: &str) -> Result<Option<String>> {
    let path = dir.join(file);
    if !path.exists() {
        return Ok(None);
    }
    info!("Loading content override: {}", path.display());
    Ok(Some(std::fs::read_to_string(&path)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::embedded().unwrap()
    }

    #[test]
    fn test_embedded_content_loads() {
        let catalog = catalog();
        assert_eq!(catalog.total_sections(), 2);
        assert_eq!(catalog.section_ids(), vec!["welcome", "belief-system"]);
        assert_eq!(catalog.total_minutes(), 75);
        assert_eq!(catalog.total_questions(), 15);
    }

    #[test]
    fn test_section_navigation() {
        let catalog = catalog();
        assert_eq!(catalog.section_index("welcome"), Some(0));
        assert_eq!(catalog.section_index("belief-system"), Some(1));
        assert_eq!(catalog.section_index("nope"), None);

        assert_eq!(
            catalog.next_section("welcome").map(|s| s.id.as_str()),
            Some("belief-system")
        );
        assert!(catalog.next_section("belief-system").is_none());
        assert!(catalog.next_section("nope").is_none());

        assert_eq!(
            catalog.previous_section("belief-system").map(|s| s.id.as_str()),
            Some("welcome")
        );
        assert!(catalog.previous_section("welcome").is_none());
        assert!(catalog.previous_section("nope").is_none());
    }

    #[test]
    fn test_exercise_lookup() {
        let catalog = catalog();
        let voice = catalog
            .exercise("belief-system", "belief-voice-2")
            .and_then(Exercise::as_voice)
            .unwrap();
        assert!(voice.scenario.contains("DPS or NPS"));
        assert!(catalog.exercise("welcome", "belief-voice-2").is_none());

        let (section_id, _) = catalog.find_exercise("welcome-mc-2").unwrap();
        assert_eq!(section_id, "welcome");
        assert_eq!(catalog.section("belief-system").unwrap().voice_exercise_count(), 3);
    }

    #[test]
    fn test_multiline_text_trims_leading_newline() {
        let catalog = catalog();
        let welcome = catalog.section("welcome").unwrap();
        match &welcome.content[0] {
            super::super::ContentBlock::Text { content } => {
                assert!(content.starts_with("# Welcome to PEP Admissions Training"));
            }
            other => panic!("unexpected block: {:?}", other),
        }
    }

    #[test]
    fn test_grade_all_correct() {
        let catalog = catalog();
        let answers: AssessmentAnswers = catalog
            .assessment_questions()
            .iter()
            .map(|q| (q.id.clone(), q.correct_index as u32))
            .collect();

        let grade = catalog.grade_assessment(&answers);
        assert_eq!(grade.score, 15);
        assert_eq!(grade.total, 15);
        assert!(grade.passed);
        assert!(grade.details.iter().all(|d| d.correct));
    }

    #[test]
    fn test_grade_boundary_and_unanswered() {
        let catalog = catalog();
        let questions = catalog.assessment_questions();

        // 12 right, 2 wrong, 1 unanswered
        let mut answers = AssessmentAnswers::new();
        for (i, q) in questions.iter().enumerate().take(14) {
            let pick = if i < 12 {
                q.correct_index
            } else {
                (q.correct_index + 1) % q.options.len()
            };
            answers.insert(q.id.clone(), pick as u32);
        }

        let grade = catalog.grade_assessment(&answers);
        assert_eq!(grade.score, 12);
        assert!(grade.passed);
        assert_eq!(grade.details[14].selected, None);
        assert!(!grade.details[14].correct);

        answers.insert(questions[0].id.clone(), 3);
        let grade = catalog.grade_assessment(&answers);
        assert_eq!(grade.score, 11);
        assert!(!grade.passed);
    }

    #[test]
    fn test_validation_rejects_duplicates_and_bad_index() {
        let dup = r#"
            [[sections]]
            id = "a"
            title = "A"
            estimated_minutes = 5
            [[sections]]
            id = "a"
            title = "A again"
            estimated_minutes = 5
        "#;
        assert!(matches!(
            Catalog::from_toml(dup, "questions = []"),
            Err(Error::Config(_))
        ));

        let bad_index = r#"
            [[questions]]
            id = "q"
            question = "?"
            options = ["x", "y"]
            correct_index = 2
            explanation = ""
            module = "M"
        "#;
        assert!(Catalog::from_toml("sections = []", bad_index).is_err());
    }

    #[test]
    fn test_load_with_partial_override() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(SECTIONS_FILE),
            r#"
            [[sections]]
            id = "only"
            title = "Only section"
            estimated_minutes = 10
            "#,
        )
        .unwrap();

        let catalog = Catalog::load(Some(dir.path())).unwrap();
        assert_eq!(catalog.section_ids(), vec!["only"]);
        // Assessment falls back to the embedded questions
        assert_eq!(catalog.total_questions(), 15);
    }
}
