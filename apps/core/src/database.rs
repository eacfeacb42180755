use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::types::Json;
use std::path::Path;
use std::str::FromStr;
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{ComplaintRow, ComplaintStatus, NewComplaint, StoredComplaint};
use crate::traits::ComplaintStore;

const COMPLAINT_COLUMNS: &str = "id, user_id, complaint_text, city, category, priority, department, summary, status, image_urls, created_at";

pub async fn init_db(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    let db_url = format!("sqlite://{}", db_path.to_string_lossy());

    info!("Initializing database at: {}", db_url);

    let options = SqliteConnectOptions::from_str(&db_url)?.create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    migrate(&pool).await?;

    info!("Database initialized and migrations applied.");

    Ok(pool)
}

/// Creates the schema if it is missing.
pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS complaints (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            complaint_text TEXT NOT NULL,
            city TEXT,
            category TEXT NOT NULL,
            priority TEXT NOT NULL,
            department TEXT NOT NULL,
            summary TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending',
            image_urls TEXT NOT NULL DEFAULT '[]',
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_complaints_user ON complaints(user_id, created_at)")
        .execute(pool)
        .await?;

    Ok(())
}

fn into_complaints(rows: Vec<ComplaintRow>) -> Result<Vec<StoredComplaint>, AppError> {
    rows.into_iter().map(StoredComplaint::try_from).collect()
}

// --- Complaints CRUD ---

pub async fn insert_complaint(pool: &SqlitePool, complaint: NewComplaint) -> Result<StoredComplaint, AppError> {
    let id = Uuid::new_v4().to_string();
    let created_at = Utc::now().timestamp();
    let NewComplaint {
        user_id,
        input,
        analysis,
        image_urls,
    } = complaint;

    let row = sqlx::query_as::<_, ComplaintRow>(&format!(
        r#"
        INSERT INTO complaints (id, user_id, complaint_text, city, category, priority, department, summary, status, image_urls, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING {}
        "#,
        COMPLAINT_COLUMNS
    ))
    .bind(&id)
    .bind(&user_id)
    .bind(&input.text)
    .bind(input.city.map(|c| c.label()))
    .bind(analysis.category.label())
    .bind(analysis.priority.label())
    .bind(&analysis.department)
    .bind(&analysis.summary)
    .bind(ComplaintStatus::default().as_str())
    .bind(Json(image_urls))
    .bind(created_at)
    .fetch_one(pool)
    .await?;

    StoredComplaint::try_from(row)
}

pub async fn get_complaint(pool: &SqlitePool, id: &str) -> Result<Option<StoredComplaint>, AppError> {
    sqlx::query_as::<_, ComplaintRow>(&format!(
        "SELECT {} FROM complaints WHERE id = ?",
        COMPLAINT_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .map(StoredComplaint::try_from)
    .transpose()
}

pub async fn get_user_complaints(pool: &SqlitePool, user_id: &str) -> Result<Vec<StoredComplaint>, AppError> {
    let rows = sqlx::query_as::<_, ComplaintRow>(&format!(
        "SELECT {} FROM complaints WHERE user_id = ? ORDER BY created_at DESC, rowid DESC",
        COMPLAINT_COLUMNS
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    into_complaints(rows)
}

pub async fn get_all_complaints(pool: &SqlitePool) -> Result<Vec<StoredComplaint>, AppError> {
    let rows = sqlx::query_as::<_, ComplaintRow>(&format!(
        "SELECT {} FROM complaints ORDER BY created_at DESC, rowid DESC",
        COMPLAINT_COLUMNS
    ))
    .fetch_all(pool)
    .await?;

    into_complaints(rows)
}

pub async fn update_complaint_status(
    pool: &SqlitePool,
    id: &str,
    status: ComplaintStatus,
) -> Result<Option<StoredComplaint>, AppError> {
    sqlx::query_as::<_, ComplaintRow>(&format!(
        "UPDATE complaints SET status = ? WHERE id = ? RETURNING {}",
        COMPLAINT_COLUMNS
    ))
    .bind(status.as_str())
    .bind(id)
    .fetch_optional(pool)
    .await?
    .map(StoredComplaint::try_from)
    .transpose()
}

/// [`ComplaintStore`] backed by a SQLite pool.
#[derive(Clone)]
pub struct SqliteComplaintStore {
    pool: SqlitePool,
}

impl SqliteComplaintStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ComplaintStore for SqliteComplaintStore {
    async fn insert(&self, complaint: NewComplaint) -> Result<StoredComplaint, AppError> {
        insert_complaint(&self.pool, complaint).await
    }

    async fn get(&self, id: &str) -> Result<Option<StoredComplaint>, AppError> {
        get_complaint(&self.pool, id).await
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<StoredComplaint>, AppError> {
        get_user_complaints(&self.pool, user_id).await
    }

    async fn list_all(&self) -> Result<Vec<StoredComplaint>, AppError> {
        get_all_complaints(&self.pool).await
    }

    async fn update_status(
        &self,
        id: &str,
        status: ComplaintStatus,
    ) -> Result<Option<StoredComplaint>, AppError> {
        update_complaint_status(&self.pool, id, status).await
    }
}
