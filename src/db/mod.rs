pub mod asset;
pub mod balance;
pub mod connection;
pub mod migration;
pub mod settings;
pub mod store;
pub mod transfer;
pub mod wallet;

pub use store::SqliteStore;

use crate::validation::ValidationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("key not found: {0}")]
    NotFound(String),

    #[error("invalid stored value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}
