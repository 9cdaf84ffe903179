//! Stateless JSON assessment endpoint

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use symptom_core::{Gender, Notice, Session, SymptomReport, build_map_link};

use crate::ai;
use crate::error::AppError;
use crate::state::AppState;

/// Request body for a one-off assessment
#[derive(Debug, Deserialize)]
pub struct AssessRequest {
    age: u32,
    gender: String,
    symptoms: String,
    #[serde(default)]
    categories: Vec<String>,
    #[serde(default)]
    zip_code: Option<String>,
}

/// Response body for a one-off assessment
#[derive(Debug, Serialize)]
pub struct AssessResponse {
    red_flag: bool,
    notices: Vec<Notice>,
    recommendation: String,
    doctor_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    map_link: Option<String>,
}

/// POST /api/assess - Run both steps in one request without a session
pub async fn assess(
    State(state): State<AppState>,
    Json(body): Json<AssessRequest>,
) -> Result<Json<AssessResponse>, AppError> {
    let gender: Gender = body.gender.parse()?;
    let mut session = Session::new();
    session.continue_to_assessment(Some(body.age), Some(gender))?;
    let report = SymptomReport::from_labels(body.symptoms.as_str(), &body.categories)?;

    let assessment = ai::assess(state.completer.as_ref(), &session, &report).await?;
    session.record_assessment(&assessment);

    let mut notices = Vec::new();
    if assessment.red_flag {
        notices.push(Notice::urgent_care());
    }
    let map_link = body
        .zip_code
        .as_deref()
        .filter(|zip| !zip.trim().is_empty())
        .map(|zip| build_map_link(session.lookup_doctor_type(), zip));

    Ok(Json(AssessResponse {
        red_flag: assessment.red_flag,
        notices,
        recommendation: assessment.recommendation,
        doctor_type: assessment.doctor_type,
        map_link,
    }))
}
