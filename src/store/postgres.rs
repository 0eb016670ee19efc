//! Postgres-backed stores. The content document lives in a single JSONB
//! row; a partial unique index on the active flag serializes first-read
//! seeding so concurrent cold starts cannot create two active rows.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{ContactStore, ContentStore, StoreError};
use crate::models::contact::{ContactStatus, ContactSubmission, NewSubmission};
use crate::models::content::{default_document, ContentDocument, Section, SectionValue};

pub struct PgContentStore {
    pool: PgPool,
}

impl PgContentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn decode(content: serde_json::Value) -> Result<ContentDocument, StoreError> {
        serde_json::from_value(content)
            .map_err(|e| StoreError::Unavailable(format!("stored content is malformed: {}", e)))
    }
}

#[async_trait]
impl ContentStore for PgContentStore {
    async fn get_active(&self) -> Result<ContentDocument, StoreError> {
        let row: Option<(serde_json::Value,)> =
            sqlx::query_as("SELECT content FROM portfolio_content WHERE is_active")
                .fetch_optional(&self.pool)
                .await?;
        if let Some((content,)) = row {
            return Self::decode(content);
        }

        // No active row yet: seed the default. The partial unique index
        // makes the insert race-safe; whoever loses re-reads the winner.
        let seed = serde_json::to_value(default_document())
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        sqlx::query(
            r#"
            INSERT INTO portfolio_content (content, is_active)
            VALUES ($1, true)
            ON CONFLICT (is_active) WHERE is_active DO NOTHING
            "#,
        )
        .bind(&seed)
        .execute(&self.pool)
        .await?;
        tracing::info!("seeded default content document");

        let (content,): (serde_json::Value,) =
            sqlx::query_as("SELECT content FROM portfolio_content WHERE is_active")
                .fetch_one(&self.pool)
                .await?;
        Self::decode(content)
    }

    async fn replace_active(&self, doc: ContentDocument) -> Result<ContentDocument, StoreError> {
        let content =
            serde_json::to_value(&doc).map_err(|e| StoreError::Unavailable(e.to_string()))?;
        sqlx::query(
            r#"
            INSERT INTO portfolio_content (content, is_active)
            VALUES ($1, true)
            ON CONFLICT (is_active) WHERE is_active
            DO UPDATE SET content = EXCLUDED.content, updated_at = now()
            "#,
        )
        .bind(&content)
        .execute(&self.pool)
        .await?;
        Ok(doc)
    }

    async fn replace_section(&self, value: SectionValue) -> Result<SectionValue, StoreError> {
        let section = value.section();
        let payload =
            serde_json::to_value(&value).map_err(|e| StoreError::Unavailable(e.to_string()))?;
        let result = sqlx::query(
            r#"
            UPDATE portfolio_content
            SET content = jsonb_set(content, $1, $2), updated_at = now()
            WHERE is_active
            "#,
        )
        .bind(vec![section.as_str().to_string()])
        .bind(&payload)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(value)
    }

    async fn get_section(&self, section: Section) -> Result<SectionValue, StoreError> {
        // Unlike get_active, a section read never seeds: no active row
        // means NotFound, same as replace_section.
        let row: Option<(serde_json::Value,)> =
            sqlx::query_as("SELECT content FROM portfolio_content WHERE is_active")
                .fetch_optional(&self.pool)
                .await?;
        let (content,) = row.ok_or(StoreError::NotFound)?;
        Ok(Self::decode(content)?.section(section))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}

pub struct PgContactStore {
    pool: PgPool,
}

impl PgContactStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

type SubmissionRow = (Uuid, String, String, String, String, String, DateTime<Utc>);

fn row_to_submission(row: SubmissionRow) -> ContactSubmission {
    let (id, name, email, subject, message, status, created_at) = row;
    ContactSubmission {
        id,
        name,
        email,
        subject,
        message,
        // Rows only ever hold values written through ContactStatus.
        status: status.parse().unwrap_or(ContactStatus::New),
        created_at,
    }
}

const SUBMISSION_COLUMNS: &str = "id, name, email, subject, message, status, created_at";

#[async_trait]
impl ContactStore for PgContactStore {
    async fn insert(&self, new: NewSubmission) -> Result<ContactSubmission, StoreError> {
        let row: SubmissionRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO contact_submissions (name, email, subject, message, status)
            VALUES ($1, $2, $3, $4, 'new')
            RETURNING {}
            "#,
            SUBMISSION_COLUMNS
        ))
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.subject)
        .bind(&new.message)
        .fetch_one(&self.pool)
        .await?;
        Ok(row_to_submission(row))
    }

    async fn list(
        &self,
        status: Option<ContactStatus>,
        limit: i64,
        skip: i64,
    ) -> Result<(Vec<ContactSubmission>, i64), StoreError> {
        let (rows, total): (Vec<SubmissionRow>, (i64,)) = if let Some(status) = status {
            let rows = sqlx::query_as(&format!(
                r#"
                SELECT {}
                FROM contact_submissions
                WHERE status = $1
                ORDER BY created_at DESC, id DESC
                LIMIT $2 OFFSET $3
                "#,
                SUBMISSION_COLUMNS
            ))
            .bind(status.as_str())
            .bind(limit)
            .bind(skip)
            .fetch_all(&self.pool)
            .await?;
            let total =
                sqlx::query_as("SELECT COUNT(*) FROM contact_submissions WHERE status = $1")
                    .bind(status.as_str())
                    .fetch_one(&self.pool)
                    .await?;
            (rows, total)
        } else {
            let rows = sqlx::query_as(&format!(
                r#"
                SELECT {}
                FROM contact_submissions
                ORDER BY created_at DESC, id DESC
                LIMIT $1 OFFSET $2
                "#,
                SUBMISSION_COLUMNS
            ))
            .bind(limit)
            .bind(skip)
            .fetch_all(&self.pool)
            .await?;
            let total = sqlx::query_as("SELECT COUNT(*) FROM contact_submissions")
                .fetch_one(&self.pool)
                .await?;
            (rows, total)
        };

        Ok((rows.into_iter().map(row_to_submission).collect(), total.0))
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: ContactStatus,
    ) -> Result<ContactSubmission, StoreError> {
        let row: Option<SubmissionRow> = sqlx::query_as(&format!(
            r#"
            UPDATE contact_submissions
            SET status = $2
            WHERE id = $1
            RETURNING {}
            "#,
            SUBMISSION_COLUMNS
        ))
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?;
        row.map(row_to_submission).ok_or(StoreError::NotFound)
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM contact_submissions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}
