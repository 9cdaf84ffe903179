//! symptom-core: domain logic for the symptom checker
//!
//! Holds the two-page intake state machine, symptom reports, the pure
//! parts of response interpretation (red-flag scan, prompt template,
//! specialist extraction) and map-link construction. No I/O happens here.

pub mod error;
pub mod interpreter;
pub mod maplink;
pub mod notice;
pub mod session;
pub mod symptoms;

pub use error::IntakeError;
pub use interpreter::{
    FALLBACK_SPECIALIST, RED_FLAGS, build_prompt, extract_specialist, has_red_flag,
    matched_red_flags,
};
pub use maplink::{DEFAULT_DOCTOR_TYPE, build_map_link};
pub use notice::{Notice, NoticeLevel};
pub use session::{Assessment, Gender, MAX_AGE, Page, Session};
pub use symptoms::{SymptomCategory, SymptomReport};
