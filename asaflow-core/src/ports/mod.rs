//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. The services
//! depend only on these traits, not on concrete HTTP clients.

mod custodial;
mod indexer;
mod ledger;

pub use custodial::{
    ComposeActionRequest, CustodialApi, NewUserRequest, RemoteResponse, SignRequest,
    VerificationTarget,
};
pub use indexer::IndexerClient;
pub use ledger::LedgerClient;
