//! Score and progress arithmetic shared by the dashboard and the API

use once_cell::sync::Lazy;
use regex::Regex;

use crate::content::PASSING_SCORE;
use crate::models::{Progress, ProgressStatus};

/// Score used when the feedback text carries no parsable score
pub const DEFAULT_FEEDBACK_SCORE: i64 = 3;

/// Section average below which a manager is alerted
pub const ATTENTION_THRESHOLD: f64 = 3.0;

/// Knowledge-check score for a correct answer
pub const KNOWLEDGE_CHECK_FULL_SCORE: i64 = 5;

static SCORE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Score:\s*(\d)/5").expect("score pattern is a valid regex")
});

pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Mean of the scores rounded to one decimal, None when there are none
pub fn average_score<I>(scores: I) -> Option<f64>
where
    I: IntoIterator<Item = i64>,
{
    let (sum, count) = scores
        .into_iter()
        .fold((0i64, 0usize), |(sum, count), s| (sum + s, count + 1));

    if count == 0 {
        None
    } else {
        Some(round_one_decimal(sum as f64 / count as f64))
    }
}

/// Rounded completion percentage; 0 when there is nothing to complete
pub fn progress_percent(completed: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((completed as f64 / total as f64) * 100.0).round() as u32
}

pub fn is_passing(score: i64) -> bool {
    score >= PASSING_SCORE
}

/// Overall training status derived from a trainee's progress rows
pub fn overall_status(progress: &[Progress], total_sections: usize) -> ProgressStatus {
    let completed = progress
        .iter()
        .filter(|p| p.status == ProgressStatus::Completed)
        .count();

    if completed == total_sections {
        ProgressStatus::Completed
    } else if completed > 0 || progress.iter().any(|p| p.status == ProgressStatus::InProgress) {
        ProgressStatus::InProgress
    } else {
        ProgressStatus::NotStarted
    }
}

pub fn needs_attention(average: Option<f64>) -> bool {
    matches!(average, Some(avg) if avg < ATTENTION_THRESHOLD)
}

/// Pull the `Score: N/5` value out of model feedback
pub fn extract_score(feedback: &str) -> i64 {
    SCORE_PATTERN
        .captures(feedback)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(DEFAULT_FEEDBACK_SCORE)
}

pub fn knowledge_check_score(correct: bool) -> i64 {
    if correct {
        KNOWLEDGE_CHECK_FULL_SCORE
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress(status: ProgressStatus) -> Progress {
        Progress {
            id: "p".to_string(),
            trainee_id: "t".to_string(),
            section_id: "s".to_string(),
            status,
            started_at: None,
            completed_at: None,
        }
    }

    #[test]
    fn test_round_one_decimal() {
        assert_eq!(round_one_decimal(3.333), 3.3);
        assert_eq!(round_one_decimal(3.35), 3.4);
        assert_eq!(round_one_decimal(4.0), 4.0);
    }

    #[test]
    fn test_average_score() {
        assert_eq!(average_score(Vec::<i64>::new()), None);
        assert_eq!(average_score([4, 3, 3]), Some(3.3));
        assert_eq!(average_score([5, 4]), Some(4.5));
    }

    #[test]
    fn test_progress_percent() {
        assert_eq!(progress_percent(0, 0), 0);
        assert_eq!(progress_percent(1, 2), 50);
        assert_eq!(progress_percent(1, 3), 33);
        assert_eq!(progress_percent(2, 3), 67);
        assert_eq!(progress_percent(9, 9), 100);
    }

    #[test]
    fn test_passing_boundary() {
        assert!(!is_passing(11));
        assert!(is_passing(12));
        assert!(is_passing(15));
    }

    #[test]
    fn test_overall_status() {
        assert_eq!(overall_status(&[], 2), ProgressStatus::NotStarted);
        assert_eq!(
            overall_status(&[progress(ProgressStatus::NotStarted)], 2),
            ProgressStatus::NotStarted
        );
        assert_eq!(
            overall_status(&[progress(ProgressStatus::InProgress)], 2),
            ProgressStatus::InProgress
        );
        assert_eq!(
            overall_status(
                &[
                    progress(ProgressStatus::Completed),
                    progress(ProgressStatus::NotStarted)
                ],
                2
            ),
            ProgressStatus::InProgress
        );
        assert_eq!(
            overall_status(
                &[
                    progress(ProgressStatus::Completed),
                    progress(ProgressStatus::Completed)
                ],
                2
            ),
            ProgressStatus::Completed
        );
    }

    #[test]
    fn test_needs_attention() {
        assert!(!needs_attention(None));
        assert!(needs_attention(Some(2.9)));
        assert!(!needs_attention(Some(3.0)));
    }

    #[test]
    fn test_extract_score() {
        assert_eq!(extract_score("Nice work.\n\n**Score: 4/5**"), 4);
        assert_eq!(extract_score("score:2/5"), 2);
        assert_eq!(extract_score("Score:   5/5 and later Score: 1/5"), 5);
        assert_eq!(extract_score("No rating given"), DEFAULT_FEEDBACK_SCORE);
        assert_eq!(extract_score("Score: 10/5"), DEFAULT_FEEDBACK_SCORE);
    }

    #[test]
    fn test_knowledge_check_score() {
        assert_eq!(knowledge_check_score(true), 5);
        assert_eq!(knowledge_check_score(false), 0);
    }
}
