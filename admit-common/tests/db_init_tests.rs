//! On-disk database bootstrap and query round trips

use admit_common::db::{self, assessments, progress, responses, settings, trainees};
use admit_common::models::{AssessmentAnswers, ExerciseType, NewResponse, ProgressStatus};

#[tokio::test]
async fn test_init_creates_database_file() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("data").join("admit.db");
    assert!(!db_path.exists());

    let pool = db::init_database(&db_path).await.unwrap();
    assert!(db_path.exists());

    let tables: Vec<(String,)> =
        sqlx::query_as("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .fetch_all(&pool)
            .await
            .unwrap();
    let names: Vec<&str> = tables.iter().map(|(n,)| n.as_str()).collect();
    for expected in [
        "assessment_attempts",
        "progress",
        "responses",
        "settings",
        "trainees",
    ] {
        assert!(names.contains(&expected), "missing table {}", expected);
    }
}

#[tokio::test]
async fn test_reopen_keeps_data_and_secret() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("admit.db");

    let (trainee_id, secret) = {
        let pool = db::init_database(&db_path).await.unwrap();
        let trainee = trainees::insert_trainee(&pool, "Ada", None).await.unwrap();
        let secret = settings::load_or_init_session_secret(&pool).await.unwrap();
        pool.close().await;
        (trainee.id, secret)
    };

    let pool = db::init_database(&db_path).await.unwrap();
    assert!(trainees::get_trainee_by_id(&pool, &trainee_id)
        .await
        .unwrap()
        .is_some());
    assert_eq!(
        settings::load_or_init_session_secret(&pool).await.unwrap(),
        secret
    );
}

#[tokio::test]
async fn test_trainee_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let pool = db::init_database(&dir.path().join("admit.db")).await.unwrap();

    let trainee = trainees::insert_trainee(&pool, "Grace", Some("grace@example.com"))
        .await
        .unwrap();
    progress::seed_progress(&pool, &trainee.id, &["welcome", "belief-system"])
        .await
        .unwrap();

    progress::upsert_status(&pool, &trainee.id, "welcome", ProgressStatus::Completed)
        .await
        .unwrap();

    responses::insert_response(
        &pool,
        NewResponse {
            trainee_id: trainee.id.clone(),
            section_id: "belief-system".to_string(),
            exercise_id: "belief-voice-1".to_string(),
            exercise_type: ExerciseType::Voice,
            response_text: Some("Our founders...".to_string()),
            audio_url: None,
            ai_feedback: Some("**Score: 4/5**".to_string()),
            ai_score: Some(4),
            correct: None,
        },
    )
    .await
    .unwrap();

    let mut answers = AssessmentAnswers::new();
    answers.insert("final-1".to_string(), 1);
    assessments::insert_attempt(&pool, &trainee.id, 12, 15, answers)
        .await
        .unwrap();

    let rows = progress::list_progress_for_trainee(&pool, &trainee.id)
        .await
        .unwrap();
    let welcome = rows.iter().find(|p| p.section_id == "welcome").unwrap();
    assert_eq!(welcome.status, ProgressStatus::Completed);
    assert!(welcome.completed_at.is_some());

    let stored = responses::list_responses_for_trainee(&pool, &trainee.id)
        .await
        .unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].ai_score, Some(4));

    let attempts = assessments::list_attempts_for_trainee(&pool, &trainee.id)
        .await
        .unwrap();
    assert_eq!(attempts.len(), 1);
    assert_eq!(attempts[0].score, 12);
}
