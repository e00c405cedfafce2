pub mod blockchain;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod provider;
pub mod tracker;
pub mod validation;

#[cfg(test)]
pub mod tests;

// Re-export specific items for convenience
pub use blockchain::EthRpcClient;
pub use db::{connection, migration, SqliteStore};
pub use error::TrackerError;
pub use models::{Asset, Transfer, TransferDirection, Wallet, WalletBalance};
pub use provider::AlchemyClient;
pub use tracker::{start_polling, CycleReport, Tracker, TrackerSettings};
pub use validation::{normalize_address, validate_address};
