use async_trait::async_trait;
use chrono::{DateTime, Utc};
use clipvault_core::models::{NewVideo, Video};
use clipvault_core::AppError;
use sqlx::PgPool;
use uuid::Uuid;

/// Metadata store seam for video records.
#[async_trait]
pub trait VideoRepository: Send + Sync {
    async fn create_video(&self, video: NewVideo) -> Result<Video, AppError>;

    async fn get_video(&self, id: Uuid) -> Result<Option<Video>, AppError>;

    /// Overwrite the record's `video_url`. Fails with `NotFound` when the
    /// record no longer exists.
    async fn update_video_url(&self, id: Uuid, video_url: &str) -> Result<(), AppError>;
}

#[derive(Debug, sqlx::FromRow)]
struct VideoRow {
    id: Uuid,
    user_id: Uuid,
    title: String,
    description: Option<String>,
    video_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<VideoRow> for Video {
    fn from(row: VideoRow) -> Self {
        Video {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            description: row.description,
            video_url: row.video_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Postgres-backed `VideoRepository`.
#[derive(Clone)]
pub struct PgVideoRepository {
    pool: PgPool,
}

impl PgVideoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VideoRepository for PgVideoRepository {
    async fn create_video(&self, video: NewVideo) -> Result<Video, AppError> {
        let row = sqlx::query_as::<_, VideoRow>(
            r#"
            INSERT INTO videos (id, user_id, title, description)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, title, description, video_url, created_at, updated_at
            "#,
        )
        .bind(video.id)
        .bind(video.user_id)
        .bind(&video.title)
        .bind(&video.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(row.into())
    }

    async fn get_video(&self, id: Uuid) -> Result<Option<Video>, AppError> {
        let row = sqlx::query_as::<_, VideoRow>(
            r#"
            SELECT id, user_id, title, description, video_url, created_at, updated_at
            FROM videos
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(row.map(Into::into))
    }

    async fn update_video_url(&self, id: Uuid, video_url: &str) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE videos
            SET video_url = $2, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(video_url)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Video {} not found", id)));
        }

        Ok(())
    }
}
