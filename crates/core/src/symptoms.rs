//! Symptom reports submitted from the assessment page

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::IntakeError;

/// Optional categories offered next to the free-text description
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SymptomCategory {
    Fever,
    Cough,
    Fatigue,
    Pain,
    #[serde(rename = "Breathing issues")]
    BreathingIssues,
    #[serde(rename = "Digestive issues")]
    DigestiveIssues,
}

impl SymptomCategory {
    pub const ALL: [SymptomCategory; 6] = [
        SymptomCategory::Fever,
        SymptomCategory::Cough,
        SymptomCategory::Fatigue,
        SymptomCategory::Pain,
        SymptomCategory::BreathingIssues,
        SymptomCategory::DigestiveIssues,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SymptomCategory::Fever => "Fever",
            SymptomCategory::Cough => "Cough",
            SymptomCategory::Fatigue => "Fatigue",
            SymptomCategory::Pain => "Pain",
            SymptomCategory::BreathingIssues => "Breathing issues",
            SymptomCategory::DigestiveIssues => "Digestive issues",
        }
    }
}

impl fmt::Display for SymptomCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SymptomCategory {
    type Err = IntakeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        SymptomCategory::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| IntakeError::UnknownCategory(trimmed.to_string()))
    }
}

/// One submission of the symptom form. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymptomReport {
    free_text: String,
    categories: BTreeSet<SymptomCategory>,
}

impl SymptomReport {
    /// Rejects a description that is empty or only whitespace
    pub fn new(
        free_text: impl Into<String>,
        categories: impl IntoIterator<Item = SymptomCategory>,
    ) -> Result<Self, IntakeError> {
        let free_text = free_text.into();
        if free_text.trim().is_empty() {
            return Err(IntakeError::EmptySymptoms);
        }
        Ok(Self {
            free_text,
            categories: categories.into_iter().collect(),
        })
    }

    /// Parse category labels as they arrive from a form or JSON body
    pub fn from_labels<S: AsRef<str>>(
        free_text: impl Into<String>,
        labels: impl IntoIterator<Item = S>,
    ) -> Result<Self, IntakeError> {
        let categories = labels
            .into_iter()
            .map(|l| l.as_ref().parse())
            .collect::<Result<Vec<SymptomCategory>, _>>()?;
        Self::new(free_text, categories)
    }

    pub fn free_text(&self) -> &str {
        &self.free_text
    }

    pub fn categories(&self) -> &BTreeSet<SymptomCategory> {
        &self.categories
    }

    /// Comma-joined category labels, or `N/A` when none were chosen
    pub fn category_summary(&self) -> String {
        if self.categories.is_empty() {
            return "N/A".to_string();
        }
        self.categories
            .iter()
            .map(|c| c.label())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
