use crate::db::StoreError;
use crate::models::decimal::parse_decimal;
use crate::models::{TreasuryTotals, WalletBalance};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};

/// Replace the balance snapshot of `wallet` with `balances` in one transaction.
///
/// Existing rows are deleted before the new set is inserted, so an asset that
/// is no longer held disappears. An empty `balances` clears the snapshot. If
/// any insert fails the transaction is rolled back and the previous snapshot
/// is left untouched.
pub async fn update_wallet_balances(
    pool: &Pool<Sqlite>,
    wallet: &str,
    balances: &[WalletBalance],
) -> Result<(), StoreError> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM wallet_balances WHERE wallet = ?")
        .bind(wallet)
        .execute(&mut *tx)
        .await?;

    for balance in balances {
        sqlx::query(
            "INSERT INTO wallet_balances
             (chain_id, address, wallet, amount, usd_worth, eth_worth, last_updated)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(balance.chain_id)
        .bind(&balance.address)
        .bind(&balance.wallet)
        .bind(balance.amount.normalized().to_plain_string())
        .bind(balance.usd_worth)
        .bind(balance.eth_worth.normalized().to_plain_string())
        .bind(balance.last_updated)
        .execute(&mut *tx)
        .await?;
    }

    // Dropping `tx` on an early return rolls back
    tx.commit().await?;

    Ok(())
}

/// Stored balances, for one wallet or for all of them.
pub async fn get_wallet_balances(
    pool: &Pool<Sqlite>,
    wallet: Option<&str>,
) -> Result<Vec<WalletBalance>, StoreError> {
    let rows = match wallet {
        Some(wallet) => {
            sqlx::query(
                "SELECT chain_id, address, wallet, amount, usd_worth, eth_worth, last_updated
                 FROM wallet_balances WHERE wallet = ? ORDER BY address",
            )
            .bind(wallet)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query(
                "SELECT chain_id, address, wallet, amount, usd_worth, eth_worth, last_updated
                 FROM wallet_balances ORDER BY wallet, address",
            )
            .fetch_all(pool)
            .await?
        }
    };

    rows.iter().map(balance_from_row).collect()
}

fn balance_from_row(row: &SqliteRow) -> Result<WalletBalance, StoreError> {
    let address: String = row.try_get("address")?;
    let wallet: String = row.try_get("wallet")?;
    let amount: String = row.try_get("amount")?;
    let eth_worth: String = row.try_get("eth_worth")?;

    let invalid = |column: &str, value: &str| StoreError::InvalidValue {
        key: format!("wallet_balances.{}[{}/{}]", column, wallet, address),
        value: value.to_string(),
    };

    Ok(WalletBalance {
        chain_id: row.try_get("chain_id")?,
        amount: parse_decimal(&amount).map_err(|_| invalid("amount", &amount))?,
        usd_worth: row.try_get("usd_worth")?,
        eth_worth: parse_decimal(&eth_worth).map_err(|_| invalid("eth_worth", &eth_worth))?,
        last_updated: row.try_get("last_updated")?,
        address,
        wallet,
    })
}

/// Headline figures across every tracked wallet.
pub async fn treasury_totals(pool: &Pool<Sqlite>) -> Result<TreasuryTotals, StoreError> {
    let wallets: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM wallets")
        .fetch_one(pool)
        .await?;
    let assets: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM assets")
        .fetch_one(pool)
        .await?;
    let total_value_usd: Option<f64> = sqlx::query_scalar("SELECT SUM(usd_worth) FROM wallet_balances")
        .fetch_one(pool)
        .await?;
    let last_updated: Option<DateTime<Utc>> =
        sqlx::query_scalar("SELECT last_updated FROM wallet_balances ORDER BY last_updated DESC LIMIT 1")
            .fetch_optional(pool)
            .await?;

    Ok(TreasuryTotals {
        wallets,
        assets,
        total_value_usd: total_value_usd.unwrap_or(0.0),
        last_updated,
    })
}
