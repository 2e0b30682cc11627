use crate::types::DbId;

/// Failures the domain rules can report on their own.
///
/// Uniqueness conflicts are detected by the database constraints and
/// surface through the API's sqlx classification instead.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// No row with this id.
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: DbId },

    /// Input broke a field rule (length, color format, dangling reference).
    #[error("Validation failed: {0}")]
    Validation(String),
}
