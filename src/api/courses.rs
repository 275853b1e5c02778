use crate::api::CourseStats;
use crate::core::error::TransportError;
use crate::core::transport::format_api_error;
use crate::utils::url::construct_api_url;

pub async fn fetch_course_stats(
    client: &reqwest::Client,
    base_url: &str,
) -> Result<CourseStats, TransportError> {
    let courses_url = construct_api_url(base_url, "api/courses");
    let response = client
        .get(courses_url)
        .header("Accept", "application/json")
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "<no body>".to_string());
        return Err(TransportError::Status {
            status: status.as_u16(),
            message: format_api_error(&error_text),
        });
    }

    let body = response.text().await?;
    serde_json::from_str::<CourseStats>(&body)
        .map_err(|err| TransportError::Malformed(err.to_string()))
}

/// Sort titles case-insensitively for display, keeping the original casing.
pub fn sort_titles(titles: &mut [String]) {
    titles.sort_by(|a, b| {
        a.to_lowercase()
            .cmp(&b.to_lowercase())
            .then_with(|| a.cmp(b))
    });
}
