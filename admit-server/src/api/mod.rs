//! HTTP API handlers for admit-server

pub mod assessment;
pub mod auth;
pub mod buildinfo;
pub mod content;
pub mod health;
pub mod manager;
pub mod progress;
pub mod trainee;
pub mod ui;
pub mod voice;

pub use assessment::{assessment_questions, list_attempts, save_attempt, submit_assessment};
pub use auth::{login, logout, require_manager};
pub use buildinfo::{get_build_info, BuildInfo};
pub use content::{content_preview, get_section, list_sections};
pub use health::health_routes;
pub use manager::{get_trainee_detail, list_trainees};
pub use progress::{store_response, update_progress};
pub use trainee::{create_trainee, get_trainee};
pub use ui::ui_routes;
pub use voice::{feedback, transcribe, voice_pipeline};
