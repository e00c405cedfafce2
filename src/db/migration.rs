use sqlx::SqlitePool;
use tracing::info;

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    info!("Running database migrations...");

    // Tracked wallets, managed by operators
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS wallets (
            address TEXT PRIMARY KEY,
            added_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        )"
    )
    .execute(pool)
    .await?;

    // Asset registry
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS assets (
            chain_id INTEGER NOT NULL,
            address TEXT NOT NULL,
            name TEXT NOT NULL,
            symbol TEXT NOT NULL,
            decimals INTEGER NOT NULL,
            PRIMARY KEY (chain_id, address)
        )"
    )
    .execute(pool)
    .await?;

    // Balance snapshot, replaced per wallet on every cycle
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS wallet_balances (
            chain_id INTEGER NOT NULL,
            address TEXT NOT NULL,
            wallet TEXT NOT NULL,
            amount TEXT NOT NULL,
            usd_worth REAL NOT NULL,
            eth_worth TEXT NOT NULL,
            last_updated TEXT NOT NULL,
            PRIMARY KEY (chain_id, address, wallet)
        )"
    )
    .execute(pool)
    .await?;

    // Append-only transfer ledger
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS transfers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            chain_id INTEGER NOT NULL,
            tx_hash TEXT NOT NULL,
            block_number INTEGER NOT NULL,
            block_timestamp INTEGER NOT NULL,
            payer_address TEXT NOT NULL,
            payee_address TEXT NOT NULL,
            asset TEXT NOT NULL,
            amount TEXT NOT NULL,
            direction TEXT NOT NULL CHECK (direction IN ('incoming', 'outgoing')),
            log_index INTEGER NOT NULL,
            created_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now')),
            UNIQUE (chain_id, tx_hash, log_index)
        )"
    )
    .execute(pool)
    .await?;

    // Generic key/value settings, also holds per-wallet checkpoints
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )"
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_wallet_balances_wallet
         ON wallet_balances(wallet)"
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_transfers_block_timestamp
         ON transfers(block_timestamp)"
    )
    .execute(pool)
    .await?;

    info!("Database migrations completed successfully");
    Ok(())
}
