use thiserror::Error;

use crate::session::Page;

/// Validation failures in the intake flow.
///
/// None of these are fatal: the caller shows the message as a warning and
/// the session stays where it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntakeError {
    #[error("Please enter your age and select a gender to proceed.")]
    MissingAge,

    #[error("Age must be between 1 and 120, got {0}.")]
    AgeOutOfRange(u32),

    #[error("Please enter your age and select a gender to proceed.")]
    MissingGender,

    #[error("Unknown gender: {0}")]
    UnknownGender(String),

    #[error("Please describe your symptoms before proceeding.")]
    EmptySymptoms,

    #[error("Unknown symptom category: {0}")]
    UnknownCategory(String),

    #[error("This action is not available on the {actual} page.")]
    WrongPage { expected: Page, actual: Page },
}
