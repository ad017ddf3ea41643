//! Core domain entities
//!
//! Addresses, keys, transactions and asset records. Pure data structures with
//! validation and encoding logic - no network or storage I/O.

mod account;
mod asset;
pub mod result;
mod retry;
mod transaction;

pub use account::{
    funding_hint, Account, AccountInformation, Address, OreIdCredentials, PrivateKey, ADDRESS_LEN,
    TESTNET_DISPENSER_URL,
};
pub use asset::{
    AssetHolding, AssetInfo, AssetListing, AssetParams, AssetSummary, AssetTransferDetail,
    AssetTransferRecord, IndexerAccount, IndexerAssetParams,
};
pub use retry::RetryPolicy;
pub use transaction::{
    AssetTransferIntent, NodeStatus, PendingTransaction, SignedTransaction, SuggestedParams,
    Transaction, TransactionKind, TransactionReceipt, DEFAULT_FLAT_FEE, DEFAULT_VALIDITY_WINDOW,
};

/// Minimum receiver balance, in microalgos, before an asset transfer is attempted
pub const MIN_FUNDED_BALANCE: u64 = 200_000;

/// Default amount sent when funding a receiver below the threshold
pub const DEFAULT_FUND_AMOUNT: u64 = 200_000;

/// Asset moved by default when none is configured
pub const DEFAULT_ASSET_ID: u64 = 96_230_975;
