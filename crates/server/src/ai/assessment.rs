//! Symptom assessment: red-flag scan, one model call, specialist extraction

use symptom_core::{Assessment, IntakeError, Session, SymptomReport};

use super::client::Completer;

/// Prefix of the recommendation text when the model call fails
pub const ERROR_PREFIX: &str = "⚠️ An error occurred:";

/// Run one assessment for the session's demographics and `report`.
///
/// The session must be on the assessment page. A failed model call is not
/// an error here: it becomes the recommendation text and leaves
/// `doctor_type` unset so the session keeps its previous specialist.
pub async fn assess(
    completer: &dyn Completer,
    session: &Session,
    report: &SymptomReport,
) -> Result<Assessment, IntakeError> {
    let (age, gender) = session.demographics()?;

    let red_flags = symptom_core::matched_red_flags(report.free_text());
    if !red_flags.is_empty() {
        tracing::warn!(flags = ?red_flags, "Red-flag symptoms reported");
        metrics::counter!("red_flags_total").increment(1);
    }

    let prompt = symptom_core::build_prompt(age, gender, report);
    tracing::info!(
        age = age,
        gender = %gender,
        symptom_chars = report.free_text().chars().count(),
        categories = report.categories().len(),
        "Requesting symptom assessment"
    );

    let assessment = match completer.complete(&prompt).await {
        Ok(text) => {
            let doctor_type = symptom_core::extract_specialist(&text);
            tracing::info!(doctor_type = %doctor_type, "Assessment completed");
            metrics::counter!("assessments_total", "outcome" => "success").increment(1);
            Assessment {
                red_flag: !red_flags.is_empty(),
                recommendation: text,
                doctor_type: Some(doctor_type),
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "Assessment request failed");
            metrics::counter!("assessments_total", "outcome" => "error").increment(1);
            Assessment {
                red_flag: !red_flags.is_empty(),
                recommendation: format!("{ERROR_PREFIX} {e}"),
                doctor_type: None,
            }
        }
    };

    Ok(assessment)
}
