//! Step 2 handlers: run an assessment and look up doctors nearby

use std::collections::BTreeSet;

use axum::{
    Extension, Form,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use symptom_core::{Notice, Page, SymptomCategory, SymptomReport, build_map_link};

use crate::ai;
use crate::error::AppError;
use crate::middleware::{RATE_LIMITED_MESSAGE, SharedRateLimiter};
use crate::session::SessionHandle;
use crate::state::AppState;
use crate::views::{self, AssessmentView};

/// Form 2 fields. `category` may repeat, so the body is read as raw pairs.
#[derive(Debug, Default)]
struct AssessForm {
    symptoms: String,
    categories: Vec<String>,
    zip_code: String,
}

impl AssessForm {
    fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        pairs
            .into_iter()
            .fold(Self::default(), |mut form, (key, value)| {
                match key.as_str() {
                    "symptoms" => form.symptoms = value,
                    "category" => form.categories.push(value),
                    "zip_code" => form.zip_code = value,
                    _ => {}
                }
                form
            })
    }

    /// Categories that parse, for redisplay after a rejected submission
    fn known_categories(&self) -> BTreeSet<SymptomCategory> {
        self.categories
            .iter()
            .filter_map(|c| c.parse().ok())
            .collect()
    }

    /// The page as submitted, with `notice` explaining why nothing ran
    fn rejected(&self, notice: Notice) -> AssessmentView<'_> {
        AssessmentView {
            notices: vec![notice],
            symptoms: &self.symptoms,
            categories: self.known_categories(),
            zip_code: &self.zip_code,
            ..Default::default()
        }
    }
}

/// POST /assess - "Check Symptoms"
pub async fn submit(
    State(state): State<AppState>,
    Extension(handle): Extension<SessionHandle>,
    Extension(limiter): Extension<SharedRateLimiter>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let form = AssessForm::from_pairs(pairs);
    let mut session = handle.lock().await;

    if session.page() != Page::Assessment {
        return Ok(Redirect::to("/").into_response());
    }

    let report = match SymptomReport::from_labels(form.symptoms.as_str(), &form.categories) {
        Ok(report) => report,
        Err(e) => {
            let html = views::render_assessment(&session, &form.rejected(Notice::from(e)))?;
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(html)).into_response());
        }
    };

    if limiter.check().is_err() {
        tracing::warn!("Assessment rate limit exceeded");
        let html = views::render_assessment(
            &session,
            &form.rejected(Notice::warning(RATE_LIMITED_MESSAGE)),
        )?;
        return Ok((StatusCode::TOO_MANY_REQUESTS, Html(html)).into_response());
    }

    let assessment = match ai::assess(state.completer.as_ref(), &session, &report).await {
        Ok(assessment) => assessment,
        Err(e) => {
            tracing::warn!(error = %e, "Assessment rejected");
            return Ok(Redirect::to("/").into_response());
        }
    };
    session.record_assessment(&assessment);

    let mut notices = Vec::new();
    if assessment.red_flag {
        notices.push(Notice::urgent_care());
    }
    let map_link = (!form.zip_code.trim().is_empty())
        .then(|| build_map_link(session.lookup_doctor_type(), &form.zip_code));

    let view = AssessmentView {
        notices,
        symptoms: &form.symptoms,
        categories: report.categories().clone(),
        result: Some(&assessment),
        zip_code: &form.zip_code,
        map_link,
    };
    Ok(Html(views::render_assessment(&session, &view)?).into_response())
}

#[derive(Debug, Default, serde::Deserialize)]
pub struct DoctorsForm {
    #[serde(default)]
    zip_code: String,
}

/// POST /doctors - Map link for the current specialist (or "doctor")
pub async fn doctors(
    Extension(handle): Extension<SessionHandle>,
    Form(form): Form<DoctorsForm>,
) -> Result<Response, AppError> {
    let session = handle.lock().await;

    if session.page() != Page::Assessment {
        return Ok(Redirect::to("/").into_response());
    }

    if form.zip_code.trim().is_empty() {
        let view = AssessmentView {
            notices: vec![Notice::warning("Please enter a ZIP code to search.")],
            ..Default::default()
        };
        let html = views::render_assessment(&session, &view)?;
        return Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(html)).into_response());
    }

    let view = AssessmentView {
        zip_code: &form.zip_code,
        map_link: Some(build_map_link(
            session.lookup_doctor_type(),
            &form.zip_code,
        )),
        ..Default::default()
    };
    Ok(Html(views::render_assessment(&session, &view)?).into_response())
}
