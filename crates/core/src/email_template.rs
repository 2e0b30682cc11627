//! Email template naming rules.

use crate::error::CoreError;

/// Maximum length of a template name in characters.
pub const MAX_TEMPLATE_NAME_LENGTH: usize = 255;

/// Name given to templates created without one.
pub const DEFAULT_TEMPLATE_NAME: &str = "Untitled Template";

/// Validate a template name: non-blank and within the length limit.
pub fn validate_template_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation(
            "Template name cannot be empty".to_string(),
        ));
    }
    if name.chars().count() > MAX_TEMPLATE_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Template name exceeds maximum length of {MAX_TEMPLATE_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Resolve the name for a new template, falling back to
/// [`DEFAULT_TEMPLATE_NAME`] when the client sent none.
///
/// An explicitly supplied name is validated; it is never silently replaced.
pub fn resolve_template_name(name: Option<&str>) -> Result<String, CoreError> {
    match name {
        None => Ok(DEFAULT_TEMPLATE_NAME.to_string()),
        Some(name) => {
            validate_template_name(name)?;
            Ok(name.to_string())
        }
    }
}

/// Interpret the `category_id` of a set-category request.
///
/// Absent, `null` and `0` all clear the category; any other id is a
/// reference that must exist.
pub fn normalize_category_ref(category_id: Option<i64>) -> Option<i64> {
    category_id.filter(|&id| id != 0)
}
