//! Category model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use mailforge_core::types::{DbId, Timestamp};

/// A row from the `categories` table.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Category {
    pub id: DbId,
    pub name: String,
    pub color: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new category. `color` defaults to `#2196f3`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCategory {
    pub name: String,
    pub color: Option<String>,
}

/// DTO for a full replacement (`PUT`). An absent `color` keeps the stored one.
#[derive(Debug, Clone, Deserialize)]
pub struct ReplaceCategory {
    pub name: String,
    pub color: Option<String>,
}

/// DTO for a partial update (`PATCH`). All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCategory {
    pub name: Option<String>,
    pub color: Option<String>,
}

impl From<ReplaceCategory> for UpdateCategory {
    fn from(input: ReplaceCategory) -> Self {
        Self {
            name: Some(input.name),
            color: input.color,
        }
    }
}

/// Query parameters for the category list endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct CategoryListParams {
    /// Case-insensitive substring match on the name.
    pub search: Option<String>,
}
