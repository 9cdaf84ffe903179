//! Step 1 handlers: show the current page, continue, and go back

use axum::{
    Extension, Form,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use symptom_core::{Gender, IntakeError, Notice, Page};

use crate::error::AppError;
use crate::session::SessionHandle;
use crate::views::{self, AssessmentView};

/// Form 1 fields. Kept as raw strings so a blank or malformed age shows the
/// usual warning instead of a rejection.
#[derive(Debug, Default, Deserialize)]
pub struct StartForm {
    #[serde(default)]
    age: String,
    #[serde(default)]
    gender: String,
}

/// GET / - Render whichever page the session is on
pub async fn show(Extension(handle): Extension<SessionHandle>) -> Result<Html<String>, AppError> {
    let session = handle.lock().await;
    let html = match session.page() {
        Page::Start => views::render_start(&session, &[])?,
        Page::Assessment => views::render_assessment(&session, &AssessmentView::default())?,
    };
    Ok(Html(html))
}

/// POST /start - Validate demographics and move to the assessment page
pub async fn start(
    Extension(handle): Extension<SessionHandle>,
    Form(form): Form<StartForm>,
) -> Result<Response, AppError> {
    let mut session = handle.lock().await;

    let age = form.age.trim().parse::<u32>().ok();
    let gender = match form.gender.trim() {
        "" => Ok(None),
        raw => raw.parse::<Gender>().map(Some),
    };

    match gender.and_then(|g| session.continue_to_assessment(age, g)) {
        Ok(()) => {
            tracing::info!("Continuing to assessment");
            Ok(Redirect::to("/").into_response())
        }
        Err(IntakeError::WrongPage { .. }) => Ok(Redirect::to("/").into_response()),
        Err(e) => {
            tracing::debug!(error = %e, "Intake rejected");
            let html = views::render_start(&session, &[Notice::from(e)])?;
            Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(html)).into_response())
        }
    }
}

/// POST /back - Return to step 1, keeping everything entered so far
pub async fn back(Extension(handle): Extension<SessionHandle>) -> Redirect {
    handle.lock().await.back();
    Redirect::to("/")
}
