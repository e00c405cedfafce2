pub mod client;
pub mod models;

pub use client::AlchemyClient;
pub use models::{AddressFilter, TokenBalance, TokenTransfer, TransferQuery};

use crate::blockchain::client::ClientError;
use crate::blockchain::models::HexError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error(transparent)]
    Transport(#[from] ClientError),

    #[error("invalid unique id format: {0}")]
    InvalidUniqueId(String),

    #[error("invalid hex in {field}: {source}")]
    Hex {
        field: &'static str,
        #[source]
        source: HexError,
    },

    #[error("missing {0} for {1}")]
    MissingField(&'static str, String),

    #[error("failed to parse price value {0:?}")]
    InvalidPrice(String),
}
