//! # Admissions Training Common Library
//!
//! Shared code for the admissions training service including:
//! - Database schema and queries
//! - Domain models (trainees, progress, responses, assessment attempts)
//! - Training content catalog
//! - Scoring and progress arithmetic
//! - Manager session tokens
//! - Configuration loading
//! - Voice recorder state machine

pub mod config;
pub mod content;
pub mod db;
pub mod error;
pub mod models;
pub mod recorder;
pub mod reporting;
pub mod scoring;
pub mod session;
pub mod time;

pub use error::{Error, Result};
pub use models::{AssessmentAttempt, ExerciseResponse, ExerciseType, Progress, ProgressStatus, Trainee};
