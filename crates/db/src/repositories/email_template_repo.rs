//! Repository for the `email_templates` table.
//!
//! Every read joins `categories` so the returned [`EmailTemplate`] carries
//! its category inline. Writes use a data-modifying CTE so the joined row
//! comes back from the same statement.

use sqlx::PgPool;
use mailforge_core::types::DbId;

use crate::models::email_template::{
    EmailTemplate, EmailTemplateListParams, EmailTemplateRow, UpdateEmailTemplate,
};
use crate::repositories::contains_pattern;

/// Columns selected from `t` (templates) joined with `c` (categories).
const COLUMNS: &str = "t.id, t.name, t.design, t.html, t.category_id, \
     t.created_at, t.updated_at, \
     c.name AS category_name, c.color AS category_color, \
     c.created_at AS category_created_at, c.updated_at AS category_updated_at";

/// Join applied to every read.
const JOIN_CATEGORY: &str = "LEFT JOIN categories c ON c.id = t.category_id";

/// Fields of a template insert after name resolution and validation.
#[derive(Debug, Clone)]
pub struct NewEmailTemplate {
    pub name: String,
    pub design: Option<serde_json::Value>,
    pub html: Option<String>,
    pub category_id: Option<DbId>,
}

/// Provides CRUD operations for email templates.
pub struct EmailTemplateRepo;

impl EmailTemplateRepo {
    /// List templates newest first, optionally filtered by category and
    /// name substring.
    pub async fn list(
        pool: &PgPool,
        params: &EmailTemplateListParams,
    ) -> Result<Vec<EmailTemplate>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM email_templates t {JOIN_CATEGORY} \
             WHERE ($1::BIGINT IS NULL OR t.category_id = $1) \
               AND ($2::TEXT IS NULL OR t.name ILIKE $2) \
             ORDER BY t.created_at DESC, t.id DESC"
        );
        let rows = sqlx::query_as::<_, EmailTemplateRow>(&query)
            .bind(params.category)
            .bind(params.search.as_deref().map(contains_pattern))
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(EmailTemplate::from).collect())
    }

    /// Find a template by ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<EmailTemplate>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM email_templates t {JOIN_CATEGORY} WHERE t.id = $1");
        let row = sqlx::query_as::<_, EmailTemplateRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(EmailTemplate::from))
    }

    /// Insert a new template, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &NewEmailTemplate,
    ) -> Result<EmailTemplate, sqlx::Error> {
        let query = format!(
            "WITH t AS ( \
                INSERT INTO email_templates (name, design, html, category_id) \
                VALUES ($1, $2, $3, $4) \
                RETURNING * \
             ) \
             SELECT {COLUMNS} FROM t {JOIN_CATEGORY}"
        );
        let row = sqlx::query_as::<_, EmailTemplateRow>(&query)
            .bind(&input.name)
            .bind(&input.design)
            .bind(&input.html)
            .bind(input.category_id)
            .fetch_one(pool)
            .await?;
        Ok(row.into())
    }

    /// Update a template by ID, returning the updated row.
    ///
    /// `name` is applied when present. For `design`, `html` and `category_id`
    /// an outer `None` keeps the stored value and `Some(None)` clears it.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateEmailTemplate,
    ) -> Result<Option<EmailTemplate>, sqlx::Error> {
        let query = format!(
            "WITH t AS ( \
                UPDATE email_templates SET \
                    name = COALESCE($2, name), \
                    design = CASE WHEN $3 THEN $4 ELSE design END, \
                    html = CASE WHEN $5 THEN $6 ELSE html END, \
                    category_id = CASE WHEN $7 THEN $8 ELSE category_id END, \
                    updated_at = NOW() \
                WHERE id = $1 \
                RETURNING * \
             ) \
             SELECT {COLUMNS} FROM t {JOIN_CATEGORY}"
        );
        let row = sqlx::query_as::<_, EmailTemplateRow>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.design.is_some())
            .bind(input.design.clone().flatten())
            .bind(input.html.is_some())
            .bind(input.html.clone().flatten())
            .bind(input.category_id.is_some())
            .bind(input.category_id.flatten())
            .fetch_optional(pool)
            .await?;
        Ok(row.map(EmailTemplate::from))
    }

    /// Point a template at a category, or clear it with `None`.
    pub async fn set_category(
        pool: &PgPool,
        id: DbId,
        category_id: Option<DbId>,
    ) -> Result<Option<EmailTemplate>, sqlx::Error> {
        let query = format!(
            "WITH t AS ( \
                UPDATE email_templates SET category_id = $2, updated_at = NOW() \
                WHERE id = $1 \
                RETURNING * \
             ) \
             SELECT {COLUMNS} FROM t {JOIN_CATEGORY}"
        );
        let row = sqlx::query_as::<_, EmailTemplateRow>(&query)
            .bind(id)
            .bind(category_id)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(EmailTemplate::from))
    }

    /// Delete a template by ID. Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM email_templates WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
