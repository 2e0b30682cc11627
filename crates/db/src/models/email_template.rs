//! Email template model and DTOs.
//!
//! Reads always embed the referenced category inline as `category_details`,
//! so the repository selects from a `LEFT JOIN` into [`EmailTemplateRow`]
//! and folds the category columns into a nested [`Category`].

use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use mailforge_core::types::{DbId, Timestamp};

use crate::models::category::Category;

/// An email template as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailTemplate {
    pub id: DbId,
    pub name: String,
    pub design: Option<serde_json::Value>,
    pub html: Option<String>,
    /// Id of the referenced category, serialized as `category`.
    #[serde(rename = "category")]
    pub category_id: Option<DbId>,
    /// Read-only copy of the referenced category.
    pub category_details: Option<Category>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row of `email_templates LEFT JOIN categories`.
#[derive(Debug, Clone, FromRow)]
pub struct EmailTemplateRow {
    pub id: DbId,
    pub name: String,
    pub design: Option<serde_json::Value>,
    pub html: Option<String>,
    pub category_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub category_name: Option<String>,
    pub category_color: Option<String>,
    pub category_created_at: Option<Timestamp>,
    pub category_updated_at: Option<Timestamp>,
}

impl From<EmailTemplateRow> for EmailTemplate {
    fn from(row: EmailTemplateRow) -> Self {
        let category_details = match (
            row.category_id,
            row.category_name,
            row.category_color,
            row.category_created_at,
            row.category_updated_at,
        ) {
            (Some(id), Some(name), Some(color), Some(created_at), Some(updated_at)) => {
                Some(Category {
                    id,
                    name,
                    color,
                    created_at,
                    updated_at,
                })
            }
            _ => None,
        };

        Self {
            id: row.id,
            name: row.name,
            design: row.design,
            html: row.html,
            category_id: row.category_id,
            category_details,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// DTO for creating a new template. A missing `name` becomes
/// `"Untitled Template"`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateEmailTemplate {
    pub name: Option<String>,
    pub design: Option<serde_json::Value>,
    pub html: Option<String>,
    #[serde(rename = "category")]
    pub category_id: Option<DbId>,
}

/// DTO for a full replacement (`PUT`).
///
/// `name` is required. The nullable fields distinguish an absent key
/// (outer `None`, keep the stored value) from an explicit `null`
/// (`Some(None)`, clear it).
#[derive(Debug, Clone, Deserialize)]
pub struct ReplaceEmailTemplate {
    pub name: String,
    #[serde(default, deserialize_with = "double_option")]
    pub design: Option<Option<serde_json::Value>>,
    #[serde(default, deserialize_with = "double_option")]
    pub html: Option<Option<String>>,
    #[serde(default, rename = "category", deserialize_with = "double_option")]
    pub category_id: Option<Option<DbId>>,
}

/// DTO for a partial update (`PATCH`). Same absent/`null` rules as
/// [`ReplaceEmailTemplate`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateEmailTemplate {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub design: Option<Option<serde_json::Value>>,
    #[serde(default, deserialize_with = "double_option")]
    pub html: Option<Option<String>>,
    #[serde(default, rename = "category", deserialize_with = "double_option")]
    pub category_id: Option<Option<DbId>>,
}

impl From<ReplaceEmailTemplate> for UpdateEmailTemplate {
    fn from(input: ReplaceEmailTemplate) -> Self {
        Self {
            name: Some(input.name),
            design: input.design,
            html: input.html,
            category_id: input.category_id,
        }
    }
}

/// Body of `POST /templates/{id}/set_category`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SetCategory {
    pub category_id: Option<DbId>,
}

/// Query parameters for the template list endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct EmailTemplateListParams {
    /// Only templates in this category.
    pub category: Option<DbId>,
    /// Case-insensitive substring match on the name.
    pub search: Option<String>,
}

/// Present-but-null deserializes to `Some(None)`; combined with
/// `#[serde(default)]` an absent key stays `None`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn absent_nullable_fields_are_left_untouched() {
        let input: UpdateEmailTemplate = serde_json::from_value(json!({"name": "x"})).unwrap();
        assert_eq!(input.name.as_deref(), Some("x"));
        assert!(input.design.is_none());
        assert!(input.html.is_none());
        assert!(input.category_id.is_none());
    }

    #[test]
    fn explicit_null_clears_field() {
        let input: UpdateEmailTemplate =
            serde_json::from_value(json!({"html": null, "category": null})).unwrap();
        assert_eq!(input.html, Some(None));
        assert_eq!(input.category_id, Some(None));
        assert!(input.design.is_none());
    }

    #[test]
    fn explicit_value_sets_field() {
        let input: ReplaceEmailTemplate = serde_json::from_value(json!({
            "name": "Welcome",
            "design": {"body": {"rows": []}},
            "category": 4
        }))
        .unwrap();
        assert_eq!(input.design, Some(Some(json!({"body": {"rows": []}}))));
        assert_eq!(input.category_id, Some(Some(4)));
    }

    #[test]
    fn replace_requires_name() {
        let result: Result<ReplaceEmailTemplate, _> =
            serde_json::from_value(json!({"html": "<p>hi</p>"}));
        assert!(result.is_err());
    }

    #[test]
    fn row_without_category_has_no_details() {
        let now = chrono::Utc::now();
        let row = EmailTemplateRow {
            id: 1,
            name: "Plain".into(),
            design: None,
            html: None,
            category_id: None,
            created_at: now,
            updated_at: now,
            category_name: None,
            category_color: None,
            category_created_at: None,
            category_updated_at: None,
        };

        let template = EmailTemplate::from(row);
        assert!(template.category_details.is_none());

        let json = serde_json::to_value(&template).unwrap();
        assert!(json["category"].is_null());
        assert!(json["category_details"].is_null());
    }

    #[test]
    fn row_with_category_embeds_details() {
        let now = chrono::Utc::now();
        let row = EmailTemplateRow {
            id: 2,
            name: "Promo".into(),
            design: Some(json!({"rows": 1})),
            html: Some("<p>Sale</p>".into()),
            category_id: Some(9),
            created_at: now,
            updated_at: now,
            category_name: Some("Marketing".into()),
            category_color: Some("#ff0000".into()),
            category_created_at: Some(now),
            category_updated_at: Some(now),
        };

        let json = serde_json::to_value(EmailTemplate::from(row)).unwrap();
        assert_eq!(json["category"], 9);
        assert_eq!(json["category_details"]["id"], 9);
        assert_eq!(json["category_details"]["name"], "Marketing");
        assert_eq!(json["category_details"]["color"], "#ff0000");
    }
}
