//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - Algod REST client for the LedgerClient port
//! - Indexer REST client for the IndexerClient port
//! - ORE ID HTTP/JSON client for the CustodialApi port

pub mod algod;
mod http;
pub mod indexer;
pub mod ore_id;

#[cfg(test)]
pub mod mock_server;

pub use algod::AlgodClient;
pub use indexer::IndexerHttpClient;
pub use ore_id::{OreIdClient, ORE_ID_DEFAULT_URL};
