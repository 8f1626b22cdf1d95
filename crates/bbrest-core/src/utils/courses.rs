//! Course lookups by external id.

use serde_json::Value;
use tracing::{info, warn};

use crate::api::{ApiClient, ApiError};

/// Learn courses collection
pub const COURSES_ENDPOINT: &str = "/learn/api/public/v3/courses";

/// Check whether a course with the given external id exists.
pub async fn check_course_id(
    api: &ApiClient,
    token: &str,
    external_course_id: &str,
) -> Result<bool, ApiError> {
    let params = [("externalId", external_course_id), ("fields", "id")];
    let courses = api.get(COURSES_ENDPOINT, token, &params).await?;

    if courses.is_empty() {
        warn!(
            external_id = external_course_id,
            "Course not found, check that the id is the external id"
        );
        Ok(false)
    } else {
        info!(external_id = external_course_id, "Course found");
        Ok(true)
    }
}

/// Resolve an external course id to another course field (`id` by default
/// in the CLI). Returns `None` unless exactly one course matches.
pub async fn convert_external_id(
    api: &ApiClient,
    token: &str,
    external_id: &str,
    final_id: &str,
) -> Result<Option<String>, ApiError> {
    let params = [("externalId", external_id), ("fields", final_id)];
    let courses = api.get(COURSES_ENDPOINT, token, &params).await?;

    let [course] = courses.as_slice() else {
        warn!(
            external_id = external_id,
            matches = courses.len(),
            "Expected exactly one course, use a more specific id"
        );
        return Ok(None);
    };

    let converted = match course.get(final_id) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Null) | None => None,
        Some(other) => Some(other.to_string()),
    };
    match converted {
        Some(_) => info!(external_id = external_id, field = final_id, "Course external id converted"),
        None => warn!(field = final_id, "Course has no such field"),
    }
    Ok(converted)
}
