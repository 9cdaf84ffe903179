//! Pure parts of symptom assessment: red-flag scan, prompt template, and
//! specialist extraction from free-form model output.

use std::sync::LazyLock;

use regex::Regex;

use crate::session::Gender;
use crate::symptoms::SymptomReport;

/// Phrases that trigger the urgent-care warning
pub const RED_FLAGS: [&str; 4] = [
    "chest pain",
    "shortness of breath",
    "unconscious",
    "bleeding",
];

/// Specialist used when the model response has no recognizable suggestion
pub const FALLBACK_SPECIALIST: &str = "primary care physician";

/// Public datasets the model is asked to ground its answer in
pub const PROMPT_SOURCES: [&str; 4] = [
    "healthdata.gov",
    "data.cdc.gov",
    "data.cms.gov",
    "open.fda.gov",
];

static SPECIALIST_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)you should consult with\s+(?:(?:an|a)\s+)?(.+?)(?:[.\n]|$)")
        .expect("specialist pattern is a valid regex")
});

/// Red-flag phrases found in the description, in [`RED_FLAGS`] order
pub fn matched_red_flags(symptom_text: &str) -> Vec<&'static str> {
    let lowered = symptom_text.to_lowercase();
    RED_FLAGS
        .into_iter()
        .filter(|flag| lowered.contains(flag))
        .collect()
}

pub fn has_red_flag(symptom_text: &str) -> bool {
    let lowered = symptom_text.to_lowercase();
    RED_FLAGS.iter().any(|flag| lowered.contains(flag))
}

/// Build the one-shot prompt sent to the language model
pub fn build_prompt(age: u8, gender: Gender, report: &SymptomReport) -> String {
    let sources = PROMPT_SOURCES
        .iter()
        .map(|s| format!("- {s}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are an AI healthcare assistant. A {age}-year-old {gender} reports the following symptoms: {symptoms}.
Symptom categories: {categories}.

Your response must be informed by medical knowledge sourced from publicly available and trusted datasets like:
{sources}

Based on this, provide:
1. A possible explanation in layman's terms (non-diagnostic).
2. A recommendation (e.g., rest, monitor, consult doctor, urgent care).
3. In one line, suggest the type of doctor they should consult using this format:
   "You should consult with a [specialist type]."

Avoid giving specific diagnoses."#,
        symptoms = report.free_text(),
        categories = report.category_summary(),
    )
}

/// Recover the suggested specialist from a model response.
///
/// Best effort: anything without a `You should consult with ...` sentence
/// resolves to [`FALLBACK_SPECIALIST`].
pub fn extract_specialist(response: &str) -> String {
    SPECIALIST_PATTERN
        .captures(response)
        .and_then(|caps| caps.get(1))
        .map(|m| clean_specialist(m.as_str()))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| FALLBACK_SPECIALIST.to_string())
}

/// Strip whitespace plus the markdown and quoting models like to wrap
/// around the specialist name
fn clean_specialist(raw: &str) -> String {
    raw.trim_matches(|c: char| {
        c.is_whitespace() || matches!(c, '*' | '_' | '"' | '\'' | '[' | ']')
    })
    .to_string()
}
