pub mod client;
pub mod models;

// Re-exports for convenience
pub use client::{ClientError, EthRpcClient, RpcTransport};
