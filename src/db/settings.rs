// Generic key/value settings table.

use crate::db::StoreError;
use sqlx::{Pool, Sqlite};

pub async fn get(pool: &Pool<Sqlite>, key: &str) -> Result<String, StoreError> {
    let value: Option<String> = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await?;

    value.ok_or_else(|| StoreError::NotFound(key.to_string()))
}

pub async fn set(pool: &Pool<Sqlite>, key: &str, value: &str) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO settings (key, value) VALUES (?, ?)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn get_u64(pool: &Pool<Sqlite>, key: &str) -> Result<u64, StoreError> {
    let value = get(pool, key).await?;
    value.parse().map_err(|_| StoreError::InvalidValue {
        key: key.to_string(),
        value,
    })
}

pub async fn set_u64(pool: &Pool<Sqlite>, key: &str, value: u64) -> Result<(), StoreError> {
    // Stored as text: INTEGER columns are signed 64-bit
    set(pool, key, &value.to_string()).await
}
