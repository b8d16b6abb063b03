//! Training content served to the browser

use admit_common::content::{AssessmentQuestion, Section, PASSING_SCORE};
use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionOutline {
    pub id: String,
    pub title: String,
    pub estimated_minutes: u32,
    pub exercise_count: usize,
    pub voice_exercise_count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionsResponse {
    pub sections: Vec<SectionOutline>,
    pub total_minutes: u32,
}

/// GET /api/content/sections
pub async fn list_sections(State(state): State<AppState>) -> Json<SectionsResponse> {
    let sections = state
        .catalog
        .sections()
        .iter()
        .map(|s| SectionOutline {
            id: s.id.clone(),
            title: s.title.clone(),
            estimated_minutes: s.estimated_minutes,
            exercise_count: s.exercises.len(),
            voice_exercise_count: s.voice_exercise_count(),
        })
        .collect();

    Json(SectionsResponse {
        sections,
        total_minutes: state.catalog.total_minutes(),
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionResponse {
    pub section: Section,
    pub index: usize,
    pub total: usize,
    pub next_section_id: Option<String>,
    pub previous_section_id: Option<String>,
}

/// GET /api/content/sections/:id
///
/// Multiple-choice answers are included; the browser checks them.
pub async fn get_section(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SectionResponse>> {
    let catalog = &state.catalog;
    let (Some(section), Some(index)) = (catalog.section(&id), catalog.section_index(&id)) else {
        return Err(ApiError::NotFound(format!("Section not found: {}", id)));
    };

    Ok(Json(SectionResponse {
        section: section.clone(),
        index,
        total: catalog.total_sections(),
        next_section_id: catalog.next_section(&id).map(|s| s.id.clone()),
        previous_section_id: catalog.previous_section(&id).map(|s| s.id.clone()),
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentPreview {
    pub sections: Vec<Section>,
    pub assessment: Vec<AssessmentQuestion>,
    pub passing_score: i64,
    pub total_minutes: u32,
}

/// GET /api/content/preview (manager session)
///
/// Everything, answers and explanations included.
pub async fn content_preview(State(state): State<AppState>) -> Json<ContentPreview> {
    Json(ContentPreview {
        sections: state.catalog.sections().to_vec(),
        assessment: state.catalog.assessment_questions().to_vec(),
        passing_score: PASSING_SCORE,
        total_minutes: state.catalog.total_minutes(),
    })
}
