//! Map-search links for finding a specialist near a ZIP code.
//!
//! Only the URL is built here; nothing is ever requested from the map
//! provider.

/// Map search endpoint the link points at
pub const MAP_SEARCH_BASE: &str = "https://www.google.com/maps/search/";

/// Search term used before any assessment has suggested a specialist
pub const DEFAULT_DOCTOR_TYPE: &str = "doctor";

/// Build a `<doctor type> near <zip>` map search link.
///
/// Both parts are percent-encoded so free-form model output cannot break
/// out of the URL. The ZIP code is not validated.
pub fn build_map_link(doctor_type: &str, zip_code: &str) -> String {
    let doctor_type = match doctor_type.trim() {
        "" => DEFAULT_DOCTOR_TYPE,
        trimmed => trimmed,
    };
    format!(
        "{MAP_SEARCH_BASE}{}+near+{}",
        urlencoding::encode(doctor_type),
        urlencoding::encode(zip_code.trim())
    )
}
