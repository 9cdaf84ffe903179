//! Per-visitor intake state and the two-page flow.
//!
//! A [`Session`] moves between [`Page::Start`] (demographics) and
//! [`Page::Assessment`] (symptoms). Going forward is validated. Going back
//! always succeeds and keeps everything entered so far, including any
//! specialist derived from an earlier assessment.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::IntakeError;
use crate::maplink::DEFAULT_DOCTOR_TYPE;

/// Oldest age the intake form accepts
pub const MAX_AGE: u32 = 120;

/// Page the session is currently showing
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Page {
    #[default]
    Start,
    Assessment,
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Page::Start => f.write_str("start"),
            Page::Assessment => f.write_str("assessment"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];

    pub fn label(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Gender {
    type Err = IntakeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(IntakeError::MissingGender);
        }
        Gender::ALL
            .into_iter()
            .find(|g| g.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| IntakeError::UnknownGender(trimmed.to_string()))
    }
}

/// Result of one assessment, as far as the session is concerned.
///
/// `doctor_type` is `None` when the model call failed; in that case the
/// previously derived specialist is left alone.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Assessment {
    pub red_flag: bool,
    pub recommendation: String,
    pub doctor_type: Option<String>,
}

/// Transient per-visitor state. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    page: Page,
    age: Option<u8>,
    gender: Option<Gender>,
    doctor_type: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn age(&self) -> Option<u8> {
        self.age
    }

    pub fn gender(&self) -> Option<Gender> {
        self.gender
    }

    pub fn doctor_type(&self) -> Option<&str> {
        self.doctor_type.as_deref()
    }

    /// Specialist to search for on the map, `"doctor"` until one is derived
    pub fn lookup_doctor_type(&self) -> &str {
        self.doctor_type.as_deref().unwrap_or(DEFAULT_DOCTOR_TYPE)
    }

    /// Start → Assessment. Rejected without any state change unless the age
    /// is 1..=120 and a gender was chosen.
    pub fn continue_to_assessment(
        &mut self,
        age: Option<u32>,
        gender: Option<Gender>,
    ) -> Result<(), IntakeError> {
        if self.page != Page::Start {
            return Err(IntakeError::WrongPage {
                expected: Page::Start,
                actual: self.page,
            });
        }

        let age = match age {
            None | Some(0) => return Err(IntakeError::MissingAge),
            Some(a) if a > MAX_AGE => return Err(IntakeError::AgeOutOfRange(a)),
            Some(a) => u8::try_from(a).map_err(|_| IntakeError::AgeOutOfRange(a))?,
        };
        let gender = gender.ok_or(IntakeError::MissingGender)?;

        self.age = Some(age);
        self.gender = Some(gender);
        self.page = Page::Assessment;
        Ok(())
    }

    /// Assessment → Start. Keeps age, gender and doctor type.
    pub fn back(&mut self) {
        self.page = Page::Start;
    }

    /// Demographics needed to run an assessment from the current page
    pub fn demographics(&self) -> Result<(u8, Gender), IntakeError> {
        if self.page != Page::Assessment {
            return Err(IntakeError::WrongPage {
                expected: Page::Assessment,
                actual: self.page,
            });
        }
        let age = self.age.ok_or(IntakeError::MissingAge)?;
        let gender = self.gender.ok_or(IntakeError::MissingGender)?;
        Ok((age, gender))
    }

    pub fn record_assessment(&mut self, assessment: &Assessment) {
        if let Some(ref doctor_type) = assessment.doctor_type {
            self.doctor_type = Some(doctor_type.clone());
        }
    }
}
