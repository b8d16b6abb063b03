//! Manager dashboard summaries
//!
//! Pure builders over rows already fetched from the database. JSON keys are
//! camelCase; the embedded trainee keeps its column names.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::content::{Catalog, Exercise};
use crate::models::{AssessmentAttempt, ExerciseResponse, ExerciseType, Progress, ProgressStatus, Trainee};
use crate::scoring;

/// One dashboard row
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TraineeSummary {
    #[serde(flatten)]
    pub trainee: Trainee,
    pub completed_sections: usize,
    pub total_sections: usize,
    pub progress_percent: u32,
    pub avg_score: Option<f64>,
    pub status: ProgressStatus,
    pub exercise_count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptView {
    pub transcription: Option<String>,
    pub audio_url: Option<String>,
    pub feedback: Option<String>,
    pub score: Option<i64>,
    pub correct: Option<bool>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseReport {
    pub exercise_id: String,
    pub exercise_type: ExerciseType,
    pub question_text: String,
    pub attempts: Vec<AttemptView>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionReport {
    pub id: String,
    pub title: String,
    pub status: ProgressStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub avg_score: Option<f64>,
    pub needs_attention: bool,
    pub exercises: Vec<ExerciseReport>,
    pub total_responses: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TraineeStats {
    pub completed_sections: usize,
    pub total_sections: usize,
    pub progress_percent: u32,
    pub overall_avg_score: Option<f64>,
    pub total_responses: usize,
    pub sections_needing_attention: usize,
    pub assessment_attempts: usize,
    pub best_assessment_score: Option<i64>,
    pub passed_assessment: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TraineeDetail {
    pub trainee: Trainee,
    pub sections: Vec<SectionReport>,
    pub assessment_attempts: Vec<AssessmentAttempt>,
    pub stats: TraineeStats,
}

/// Scores that count toward averages: voice responses with a positive score
fn voice_scores<'a>(responses: impl IntoIterator<Item = &'a ExerciseResponse>) -> Vec<i64> {
    responses
        .into_iter()
        .filter(|r| r.exercise_type == ExerciseType::Voice)
        .filter_map(|r| r.ai_score)
        .filter(|score| *score > 0)
        .collect()
}

/// Every voice response in a section, unscored ones counting as 0
fn section_voice_scores<'a>(
    responses: impl IntoIterator<Item = &'a ExerciseResponse>,
) -> Vec<i64> {
    responses
        .into_iter()
        .filter(|r| r.exercise_type == ExerciseType::Voice)
        .map(|r| r.ai_score.unwrap_or(0))
        .collect()
}

/// Dashboard rows, preserving the order of `trainees`
pub fn build_summaries(
    trainees: Vec<Trainee>,
    progress: &[Progress],
    responses: &[ExerciseResponse],
    total_sections: usize,
) -> Vec<TraineeSummary> {
    trainees
        .into_iter()
        .map(|trainee| {
            let own_progress: Vec<Progress> = progress
                .iter()
                .filter(|p| p.trainee_id == trainee.id)
                .cloned()
                .collect();
            let own_responses: Vec<&ExerciseResponse> = responses
                .iter()
                .filter(|r| r.trainee_id == trainee.id)
                .collect();

            let completed_sections = own_progress
                .iter()
                .filter(|p| p.status == ProgressStatus::Completed)
                .count();

            TraineeSummary {
                completed_sections,
                total_sections,
                progress_percent: scoring::progress_percent(completed_sections, total_sections),
                avg_score: scoring::average_score(voice_scores(own_responses.iter().copied())),
                status: scoring::overall_status(&own_progress, total_sections),
                exercise_count: own_responses.len(),
                trainee,
            }
        })
        .collect()
}

fn question_text(exercise: &Exercise) -> String {
    match exercise {
        Exercise::MultipleChoice(e) => e.question.clone(),
        Exercise::ShortAnswer(e) => e.question.clone(),
        Exercise::Voice(e) => e.scenario.clone(),
    }
}

fn attempt_view(response: &ExerciseResponse) -> AttemptView {
    AttemptView {
        transcription: response.response_text.clone(),
        audio_url: response.audio_url.clone(),
        feedback: response.ai_feedback.clone(),
        score: response.ai_score,
        correct: response.correct,
        created_at: response.created_at,
    }
}

/// Section-by-section report for one trainee
///
/// `responses` should be oldest first so attempts read chronologically;
/// `attempts` newest first.
pub fn build_detail(
    catalog: &Catalog,
    trainee: Trainee,
    progress: &[Progress],
    responses: &[ExerciseResponse],
    attempts: Vec<AssessmentAttempt>,
) -> TraineeDetail {
    let sections: Vec<SectionReport> = catalog
        .sections()
        .iter()
        .map(|section| {
            let section_progress = progress.iter().find(|p| p.section_id == section.id);
            let section_responses: Vec<&ExerciseResponse> = responses
                .iter()
                .filter(|r| r.section_id == section.id)
                .collect();

            let avg_score =
                scoring::average_score(section_voice_scores(section_responses.iter().copied()));

            let exercises = section
                .exercises
                .iter()
                .map(|exercise| ExerciseReport {
                    exercise_id: exercise.id().to_string(),
                    exercise_type: exercise.exercise_type(),
                    question_text: question_text(exercise),
                    attempts: section_responses
                        .iter()
                        .filter(|r| r.exercise_id == exercise.id())
                        .map(|r| attempt_view(r))
                        .collect(),
                })
                .collect();

            SectionReport {
                id: section.id.clone(),
                title: section.title.clone(),
                status: section_progress.map(|p| p.status).unwrap_or_default(),
                started_at: section_progress.and_then(|p| p.started_at),
                completed_at: section_progress.and_then(|p| p.completed_at),
                avg_score,
                needs_attention: scoring::needs_attention(avg_score),
                exercises,
                total_responses: section_responses.len(),
            }
        })
        .collect();

    let completed_sections = sections
        .iter()
        .filter(|s| s.status == ProgressStatus::Completed)
        .count();
    let total_sections = catalog.total_sections();
    let best_assessment_score = attempts.iter().map(|a| a.score).max();

    let stats = TraineeStats {
        completed_sections,
        total_sections,
        progress_percent: scoring::progress_percent(completed_sections, total_sections),
        overall_avg_score: scoring::average_score(voice_scores(responses)),
        total_responses: responses.len(),
        sections_needing_attention: sections.iter().filter(|s| s.needs_attention).count(),
        assessment_attempts: attempts.len(),
        best_assessment_score,
        passed_assessment: best_assessment_score.is_some_and(scoring::is_passing),
    };

    TraineeDetail {
        trainee,
        sections,
        assessment_attempts: attempts,
        stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time;

    fn trainee(id: &str) -> Trainee {
        Trainee {
            id: id.to_string(),
            name: format!("Trainee {}", id),
            email: None,
            access_token: format!("token-{}", id),
            created_at: time::now(),
            last_active_at: None,
        }
    }

    fn progress(trainee_id: &str, section_id: &str, status: ProgressStatus) -> Progress {
        Progress {
            id: format!("{}-{}", trainee_id, section_id),
            trainee_id: trainee_id.to_string(),
            section_id: section_id.to_string(),
            status,
            started_at: None,
            completed_at: None,
        }
    }

    fn response(
        trainee_id: &str,
        section_id: &str,
        exercise_id: &str,
        exercise_type: ExerciseType,
        score: Option<i64>,
    ) -> ExerciseResponse {
        ExerciseResponse {
            id: format!("r-{}-{}", exercise_id, score.unwrap_or(-1)),
            trainee_id: trainee_id.to_string(),
            section_id: section_id.to_string(),
            exercise_id: exercise_id.to_string(),
            exercise_type,
            response_text: Some("answer".to_string()),
            audio_url: None,
            ai_feedback: None,
            ai_score: score,
            correct: None,
            created_at: time::now(),
        }
    }

    fn attempt(trainee_id: &str, score: i64) -> AssessmentAttempt {
        AssessmentAttempt {
            id: format!("a-{}", score),
            trainee_id: trainee_id.to_string(),
            score,
            total: 15,
            answers: Default::default(),
            created_at: time::now(),
        }
    }

    #[test]
    fn test_summaries() {
        let progress = vec![
            progress("a", "welcome", ProgressStatus::Completed),
            progress("a", "belief-system", ProgressStatus::InProgress),
            progress("b", "welcome", ProgressStatus::NotStarted),
        ];
        let responses = vec![
            response("a", "belief-system", "belief-voice-1", ExerciseType::Voice, Some(4)),
            response("a", "belief-system", "belief-voice-2", ExerciseType::Voice, Some(3)),
            response("a", "belief-system", "belief-voice-3", ExerciseType::Voice, Some(0)),
            response("a", "welcome", "welcome-mc-1", ExerciseType::MultipleChoice, Some(5)),
        ];

        let rows = build_summaries(vec![trainee("a"), trainee("b")], &progress, &responses, 2);

        assert_eq!(rows.len(), 2);
        let a = &rows[0];
        assert_eq!(a.completed_sections, 1);
        assert_eq!(a.progress_percent, 50);
        assert_eq!(a.avg_score, Some(3.5));
        assert_eq!(a.status, ProgressStatus::InProgress);
        assert_eq!(a.exercise_count, 4);

        let b = &rows[1];
        assert_eq!(b.avg_score, None);
        assert_eq!(b.status, ProgressStatus::NotStarted);
        assert_eq!(b.exercise_count, 0);
    }

    #[test]
    fn test_summary_json_flattens_trainee() {
        let rows = build_summaries(vec![trainee("a")], &[], &[], 2);
        let json = serde_json::to_value(&rows[0]).unwrap();
        assert_eq!(json["id"], "a");
        assert_eq!(json["access_token"], "token-a");
        assert_eq!(json["progressPercent"], 0);
        assert!(json["avgScore"].is_null());
        assert_eq!(json["status"], "not_started");
    }

    #[test]
    fn test_detail() {
        let catalog = Catalog::embedded().unwrap();
        let progress = vec![
            progress("a", "welcome", ProgressStatus::Completed),
            progress("a", "belief-system", ProgressStatus::InProgress),
        ];
        let responses = vec![
            response("a", "welcome", "welcome-mc-1", ExerciseType::MultipleChoice, Some(5)),
            response("a", "belief-system", "belief-voice-1", ExerciseType::Voice, Some(2)),
            response("a", "belief-system", "belief-voice-1", ExerciseType::Voice, Some(3)),
        ];
        let attempts = vec![attempt("a", 13), attempt("a", 9)];

        let detail = build_detail(&catalog, trainee("a"), &progress, &responses, attempts);

        assert_eq!(detail.sections.len(), 2);
        let welcome = &detail.sections[0];
        assert_eq!(welcome.status, ProgressStatus::Completed);
        assert_eq!(welcome.avg_score, None);
        assert!(!welcome.needs_attention);
        assert_eq!(welcome.exercises[0].attempts.len(), 1);

        let belief = &detail.sections[1];
        assert_eq!(belief.avg_score, Some(2.5));
        assert!(belief.needs_attention);
        assert_eq!(belief.total_responses, 2);
        let voice_1 = belief
            .exercises
            .iter()
            .find(|e| e.exercise_id == "belief-voice-1")
            .unwrap();
        assert_eq!(voice_1.attempts.len(), 2);
        assert!(voice_1.question_text.starts_with("A parent asks"));

        assert_eq!(detail.stats.completed_sections, 1);
        assert_eq!(detail.stats.progress_percent, 50);
        assert_eq!(detail.stats.overall_avg_score, Some(2.5));
        assert_eq!(detail.stats.total_responses, 3);
        assert_eq!(detail.stats.sections_needing_attention, 1);
        assert_eq!(detail.stats.assessment_attempts, 2);
        assert_eq!(detail.stats.best_assessment_score, Some(13));
        assert!(detail.stats.passed_assessment);
    }

    #[test]
    fn test_section_average_counts_zero_scores() {
        let catalog = Catalog::embedded().unwrap();
        let responses = vec![
            response("a", "belief-system", "belief-voice-1", ExerciseType::Voice, Some(0)),
            response("a", "belief-system", "belief-voice-2", ExerciseType::Voice, Some(4)),
        ];

        let detail = build_detail(&catalog, trainee("a"), &[], &responses, Vec::new());

        let belief = &detail.sections[1];
        assert_eq!(belief.avg_score, Some(2.0));
        assert!(belief.needs_attention);
        assert_eq!(detail.stats.sections_needing_attention, 1);
        // The overall figure still skips zero scores
        assert_eq!(detail.stats.overall_avg_score, Some(4.0));
    }

    #[test]
    fn test_detail_without_progress_rows() {
        let catalog = Catalog::embedded().unwrap();
        let detail = build_detail(&catalog, trainee("a"), &[], &[], Vec::new());

        assert!(detail
            .sections
            .iter()
            .all(|s| s.status == ProgressStatus::NotStarted));
        assert_eq!(detail.stats.best_assessment_score, None);
        assert!(!detail.stats.passed_assessment);

        let json = serde_json::to_value(&detail).unwrap();
        assert!(json["stats"]["bestAssessmentScore"].is_null());
        assert_eq!(json["sections"][1]["exercises"][3]["exerciseType"], "voice");
    }
}
