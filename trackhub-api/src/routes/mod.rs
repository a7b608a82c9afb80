/// API route handlers
///
/// - `health`: Health check endpoint
/// - `auth`: Registration, login, token refresh and the caller's profile
/// - `projects`: Project CRUD
/// - `tasks`: Task views, creation and changes
/// - `comments`: Comment threads under tasks

pub mod auth;
pub mod comments;
pub mod health;
pub mod projects;
pub mod tasks;

use crate::error::{ApiError, ApiResult};

/// Trims a required text field, rejecting values that are only whitespace
pub(crate) fn non_blank(field: &str, value: &str) -> ApiResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::invalid_field(field, format!("{} cannot be blank", field)));
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_blank_trims() {
        assert_eq!(non_blank("name", "  Launch  ").unwrap(), "Launch");
    }

    #[test]
    fn test_non_blank_rejects_whitespace() {
        match non_blank("name", " \t\n ") {
            Err(ApiError::ValidationError(details)) => {
                assert_eq!(details[0].field, "name");
                assert_eq!(details[0].message, "name cannot be blank");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
