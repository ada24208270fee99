//! Video catalog domain - DB queries for the shared gallery

use sqlx::{Executor, Postgres};

use crate::models::VideoItem;

const VIDEO_COLUMNS: &str = "id, title, thumbnail, video_url, author, owner_id, is_public, \
     credits_common, credits_exclusive, is_exclusive_sold, created_at, tags, category";

/// List the shared gallery, newest first
pub async fn list_catalog<'e, E>(executor: E) -> Result<Vec<VideoItem>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(&format!(
        "SELECT {VIDEO_COLUMNS} FROM videos ORDER BY created_at DESC"
    ))
    .fetch_all(executor)
    .await
}

/// Fetch one catalog item
pub async fn get<'e, E>(executor: E, id: &str) -> Result<Option<VideoItem>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(&format!("SELECT {VIDEO_COLUMNS} FROM videos WHERE id = $1"))
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// Mark an item's exclusive license as sold. Idempotent; returns the number
/// of rows that actually flipped.
pub async fn mark_exclusive_sold<'e, E>(executor: E, id: &str) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result =
        sqlx::query("UPDATE videos SET is_exclusive_sold = true WHERE id = $1 AND NOT is_exclusive_sold")
            .bind(id)
            .execute(executor)
            .await?;

    Ok(result.rows_affected())
}
