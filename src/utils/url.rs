//! Helpers for building backend endpoint URLs.
//!
//! The backend may be configured with or without a trailing slash, so every
//! endpoint goes through [`construct_api_url`] instead of string concatenation.

/// Strip trailing slashes from a base URL.
///
/// # Examples
///
/// ```
/// use coursebot::utils::url::normalize_base_url;
///
/// assert_eq!(normalize_base_url("http://localhost:8000"), "http://localhost:8000");
/// assert_eq!(normalize_base_url("http://localhost:8000/"), "http://localhost:8000");
/// assert_eq!(normalize_base_url("http://localhost:8000///"), "http://localhost:8000");
/// ```
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim().trim_end_matches('/').to_string()
}

/// Join a base URL and an endpoint path with exactly one slash between them.
///
/// # Examples
///
/// ```
/// use coursebot::utils::url::construct_api_url;
///
/// assert_eq!(
///     construct_api_url("http://localhost:8000", "api/query"),
///     "http://localhost:8000/api/query"
/// );
/// assert_eq!(
///     construct_api_url("http://localhost:8000/", "/api/courses"),
///     "http://localhost:8000/api/courses"
/// );
/// ```
pub fn construct_api_url(base_url: &str, endpoint: &str) -> String {
    let normalized_base = normalize_base_url(base_url);
    let endpoint = endpoint.trim_start_matches('/');
    format!("{}/{}", normalized_base, endpoint)
}

/// Short form of the base URL for the title bar: scheme and trailing slashes removed.
pub fn endpoint_label(base_url: &str) -> String {
    let normalized = normalize_base_url(base_url);
    match normalized.split_once("://") {
        Some((_, rest)) => rest.to_string(),
        None => normalized,
    }
}
