use crate::db::StoreError;
use crate::models::decimal::parse_decimal;
use crate::models::{LedgerTransfer, Transfer, TransferDirection};
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};
use std::str::FromStr;

/// Append a transfer to the ledger.
///
/// Insert-or-ignore on `(chain_id, tx_hash, log_index)`: a transfer that is
/// already recorded is left as is and `Ok(false)` is returned.
pub async fn create_transfer(pool: &Pool<Sqlite>, transfer: &Transfer) -> Result<bool, StoreError> {
    let result = sqlx::query(
        r#"
        INSERT INTO transfers
        (chain_id, tx_hash, block_number, block_timestamp, payer_address, payee_address, asset, amount, direction, log_index)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(chain_id, tx_hash, log_index) DO NOTHING
        "#,
    )
    .bind(transfer.chain_id)
    .bind(&transfer.tx_hash)
    .bind(transfer.block_number as i64)
    .bind(transfer.block_timestamp)
    .bind(&transfer.from_address)
    .bind(&transfer.to_address)
    .bind(&transfer.asset)
    .bind(transfer.amount.normalized().to_plain_string())
    .bind(transfer.direction.as_str())
    .bind(i64::from(transfer.log_index))
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Newest transfers first.
pub async fn get_transfers(pool: &Pool<Sqlite>, limit: i64, offset: i64) -> Result<Vec<LedgerTransfer>, StoreError> {
    let rows = sqlx::query(
        r#"SELECT t.id, t.chain_id, t.tx_hash, t.block_number, t.block_timestamp,
                  t.payer_address, t.payee_address, t.asset, t.amount, t.direction, t.log_index,
                  a.symbol AS asset_symbol
           FROM transfers t
           LEFT JOIN assets a ON (t.asset = a.address AND t.chain_id = a.chain_id)
           ORDER BY t.block_timestamp DESC, t.log_index DESC, t.id DESC
           LIMIT ? OFFSET ?"#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    rows.iter().map(transfer_from_row).collect()
}

pub async fn count_transfers(pool: &Pool<Sqlite>) -> Result<i64, StoreError> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM transfers")
        .fetch_one(pool)
        .await?;

    Ok(count)
}

fn transfer_from_row(row: &SqliteRow) -> Result<LedgerTransfer, StoreError> {
    let id: i64 = row.try_get("id")?;
    let amount: String = row.try_get("amount")?;
    let direction: String = row.try_get("direction")?;
    let block_number: i64 = row.try_get("block_number")?;
    let log_index: i64 = row.try_get("log_index")?;

    let invalid = |column: &str, value: String| StoreError::InvalidValue {
        key: format!("transfers.{}[{}]", column, id),
        value,
    };

    Ok(LedgerTransfer {
        id,
        transfer: Transfer {
            chain_id: row.try_get("chain_id")?,
            tx_hash: row.try_get("tx_hash")?,
            block_number: u64::try_from(block_number).map_err(|_| invalid("block_number", block_number.to_string()))?,
            block_timestamp: row.try_get("block_timestamp")?,
            from_address: row.try_get("payer_address")?,
            to_address: row.try_get("payee_address")?,
            asset: row.try_get("asset")?,
            amount: parse_decimal(&amount).map_err(|_| invalid("amount", amount.clone()))?,
            direction: TransferDirection::from_str(&direction).map_err(|_| invalid("direction", direction.clone()))?,
            log_index: u32::try_from(log_index).map_err(|_| invalid("log_index", log_index.to_string()))?,
        },
        asset_symbol: row.try_get("asset_symbol")?,
    })
}
