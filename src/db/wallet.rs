use crate::db::StoreError;
use crate::models::Wallet;
use crate::validation::normalize_address;
use sqlx::{Pool, Row, Sqlite};
use std::time::{SystemTime, UNIX_EPOCH};

/// Start tracking a wallet. The address is stored lower-cased; adding a
/// wallet twice is a no-op.
pub async fn add_wallet(pool: &Pool<Sqlite>, address: &str) -> Result<Wallet, StoreError> {
    let address = normalize_address(address)?;
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64;

    sqlx::query(
        "INSERT INTO wallets (address, added_at) VALUES (?, ?)
         ON CONFLICT(address) DO NOTHING",
    )
    .bind(&address)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(Wallet { address })
}

/// Returns false when the wallet was not tracked.
pub async fn remove_wallet(pool: &Pool<Sqlite>, address: &str) -> Result<bool, StoreError> {
    let address = normalize_address(address)?;
    let result = sqlx::query("DELETE FROM wallets WHERE address = ?")
        .bind(&address)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn get_wallets(pool: &Pool<Sqlite>) -> Result<Vec<Wallet>, StoreError> {
    let rows = sqlx::query("SELECT address FROM wallets ORDER BY added_at, address")
        .fetch_all(pool)
        .await?;

    rows.iter()
        .map(|row| -> Result<Wallet, StoreError> { Ok(Wallet { address: row.try_get("address")? }) })
        .collect()
}
