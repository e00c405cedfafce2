use crate::db::StoreError;
use crate::models::Asset;
use crate::validation::normalize_address;
use sqlx::{Pool, Row, Sqlite};

/// Register an asset, or update the metadata of an existing one.
pub async fn add_asset(pool: &Pool<Sqlite>, asset: &Asset) -> Result<(), StoreError> {
    let address = normalize_address(&asset.address)?;

    sqlx::query(
        "INSERT INTO assets (chain_id, address, name, symbol, decimals) VALUES (?, ?, ?, ?, ?)
         ON CONFLICT(chain_id, address) DO UPDATE SET
            name = excluded.name,
            symbol = excluded.symbol,
            decimals = excluded.decimals",
    )
    .bind(asset.chain_id)
    .bind(&address)
    .bind(&asset.name)
    .bind(&asset.symbol)
    .bind(i64::from(asset.decimals))
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn get_assets(pool: &Pool<Sqlite>) -> Result<Vec<Asset>, StoreError> {
    let rows = sqlx::query("SELECT chain_id, address, name, symbol, decimals FROM assets ORDER BY chain_id, address")
        .fetch_all(pool)
        .await?;

    rows.iter()
        .map(|row| -> Result<Asset, StoreError> {
            let address: String = row.try_get("address")?;
            let decimals: i64 = row.try_get("decimals")?;
            let decimals = u32::try_from(decimals).map_err(|_| StoreError::InvalidValue {
                key: format!("assets.decimals[{}]", address),
                value: decimals.to_string(),
            })?;
            Ok(Asset {
                chain_id: row.try_get("chain_id")?,
                name: row.try_get("name")?,
                symbol: row.try_get("symbol")?,
                address,
                decimals,
            })
        })
        .collect()
}
