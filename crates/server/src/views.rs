//! Server-rendered HTML for the two intake pages
//!
//! Templates live in `crates/server/templates` and are compiled into the
//! binary. Their `.html` names turn on minijinja's HTML auto-escaping, so
//! user text and model output are always escaped.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use minijinja::{Environment, Value, context};
use symptom_core::{Assessment, Gender, MAX_AGE, Notice, Session, SymptomCategory};

/// Public health data sources listed on both pages
pub const TRUSTED_SOURCES: [&str; 7] = [
    "healthdata.gov",
    "data.gov",
    "data.cdc.gov",
    "open.fda.gov",
    "data.cms.gov",
    "wonder.cdc.gov",
    "bigcitieshealthdata.org",
];

const TEMPLATES: [(&str, &str); 4] = [
    ("layout.html", include_str!("../templates/layout.html")),
    ("sources.html", include_str!("../templates/sources.html")),
    ("start.html", include_str!("../templates/start.html")),
    ("assessment.html", include_str!("../templates/assessment.html")),
];

static ENV: LazyLock<Environment<'static>> = LazyLock::new(|| {
    let mut env = Environment::new();
    for (name, source) in TEMPLATES {
        if let Err(e) = env.add_template(name, source) {
            // Surfaces again as "template not found" when the page renders
            tracing::error!(template = name, error = %e, "Failed to compile template");
        }
    }
    env
});

/// Everything the assessment page can show
#[derive(Debug, Default)]
pub struct AssessmentView<'a> {
    pub notices: Vec<Notice>,
    pub symptoms: &'a str,
    pub categories: BTreeSet<SymptomCategory>,
    pub result: Option<&'a Assessment>,
    pub zip_code: &'a str,
    pub map_link: Option<String>,
}

/// Step 1: age and gender
pub fn render_start(session: &Session, notices: &[Notice]) -> Result<String, minijinja::Error> {
    ENV.get_template("start.html")?.render(context! {
        step => 1,
        title => "Basic Information",
        notices => notices,
        sources => TRUSTED_SOURCES,
        max_age => MAX_AGE,
        age => session.age().map(|a| a.to_string()).unwrap_or_default(),
        genders => Gender::ALL.map(Gender::label),
        selected_gender => session.gender().map(Gender::label),
    })
}

/// Step 2: symptoms, results and the doctor lookup
pub fn render_assessment(
    session: &Session,
    view: &AssessmentView<'_>,
) -> Result<String, minijinja::Error> {
    let result = view.result.map(|r| {
        if r.doctor_type.is_some() {
            Notice::success(r.recommendation.clone())
        } else {
            Notice::error(r.recommendation.clone())
        }
    });

    // The link is built from percent-encoded parts, so it holds no markup
    // characters; escaping would only mangle its slashes.
    let map_link = view
        .map_link
        .clone()
        .map(Value::from_safe_string)
        .unwrap_or_default();

    ENV.get_template("assessment.html")?.render(context! {
        step => 2,
        title => "Symptom Assessment",
        notices => &view.notices,
        sources => TRUSTED_SOURCES,
        gender => session.gender().map(Gender::label).unwrap_or("unknown"),
        age => session.age().map(|a| a.to_string()).unwrap_or_default(),
        symptoms => view.symptoms,
        categories => SymptomCategory::ALL.map(SymptomCategory::label),
        selected_categories => view.categories.iter().map(|c| c.label()).collect::<Vec<_>>(),
        zip_code => view.zip_code,
        result => result,
        consult => view.result.and(session.doctor_type()),
        map_link => map_link,
        doctor_type => session.lookup_doctor_type(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assessment_session() -> Session {
        let mut session = Session::new();
        session
            .continue_to_assessment(Some(34), Some(Gender::Female))
            .unwrap();
        session
    }

    fn failed(recommendation: &str) -> Assessment {
        Assessment {
            red_flag: false,
            recommendation: recommendation.to_string(),
            doctor_type: None,
        }
    }

    #[test]
    fn start_page_shows_warning_and_prefills() {
        let mut session = assessment_session();
        session.back();
        let html = render_start(&session, &[Notice::warning("Please enter your age")]).unwrap();

        assert!(html.contains("Step 1 of 2: Basic Information"));
        assert!(html.contains(r#"value="34""#));
        assert!(html.contains(r#"value="Female" checked"#));
        assert!(!html.contains(r#"value="Male" checked"#));
        assert!(html.contains("notice-warning"));
        assert!(html.contains("bigcitieshealthdata.org"));
    }

    #[test]
    fn assessment_page_escapes_user_text() {
        let session = assessment_session();
        let view = AssessmentView {
            symptoms: "<script>bad()</script>",
            zip_code: "\"><b>",
            ..Default::default()
        };
        let html = render_assessment(&session, &view).unwrap();

        assert!(html.contains("Step 2 of 2"));
        assert!(html.contains("Female, aged 34"));
        assert!(!html.contains("<script>bad()"));
        assert!(html.contains("&lt;script&gt;bad()"));
        assert!(!html.contains("\"><b>"));
    }

    #[test]
    fn assessment_page_shows_result_and_map_link() {
        let mut session = assessment_session();
        let result = Assessment {
            red_flag: false,
            recommendation: "Rest.\nYou should consult with a cardiologist.".to_string(),
            doctor_type: Some("cardiologist".to_string()),
        };
        session.record_assessment(&result);
        let view = AssessmentView {
            symptoms: "palpitations",
            categories: BTreeSet::from([SymptomCategory::BreathingIssues]),
            result: Some(&result),
            zip_code: "10001",
            map_link: Some(symptom_core::build_map_link("cardiologist", "10001")),
            ..Default::default()
        };
        let html = render_assessment(&session, &view).unwrap();

        assert!(html.contains("notice-success"));
        assert!(html.contains(r#"value="Breathing issues" checked"#));
        assert!(html.contains("You should consult with a cardiologist</em>"));
        assert!(html.contains("https://www.google.com/maps/search/cardiologist+near+10001"));
        assert!(html.contains("cardiologists near you"));
    }

    #[test]
    fn failed_call_without_prior_specialist_has_no_consult_line() {
        let session = assessment_session();
        let result = failed("⚠️ An error occurred: timeout");
        let view = AssessmentView {
            result: Some(&result),
            ..Default::default()
        };
        let html = render_assessment(&session, &view).unwrap();

        assert!(html.contains("notice-error"));
        assert!(!html.contains("You should consult with"));
    }

    #[test]
    fn failed_call_keeps_showing_prior_specialist() {
        let mut session = assessment_session();
        session.record_assessment(&Assessment {
            red_flag: false,
            recommendation: String::new(),
            doctor_type: Some("dermatologist".to_string()),
        });
        let result = failed("⚠️ An error occurred: timeout");
        session.record_assessment(&result);
        let view = AssessmentView {
            result: Some(&result),
            ..Default::default()
        };
        let html = render_assessment(&session, &view).unwrap();

        assert!(html.contains("You should consult with a dermatologist</em>"));
    }

    #[test]
    fn no_result_means_no_consult_line() {
        let html = render_assessment(&assessment_session(), &AssessmentView::default()).unwrap();
        assert!(!html.contains("You should consult with"));
        assert!(!html.contains("Click to view"));
    }
}
