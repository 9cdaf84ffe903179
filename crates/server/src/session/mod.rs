//! Per-visitor session storage

mod store;

pub use store::{SESSION_COOKIE, SessionHandle, SessionStore, session_middleware};
