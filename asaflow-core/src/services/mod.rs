//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on a specific use case or feature area.

pub mod assets;
mod confirmation;
pub mod custodial;
pub mod logging;
mod status;
pub mod transfer;

pub use assets::AssetQueryService;
pub use confirmation::ConfirmationPoller;
pub use custodial::{
    ChainActionType, CreatedUser, CustodialService, NewUser, SignOptions, TransferAction,
};
pub use logging::{ActivityRecorder, EntryPoint, LogEntry, LogEvent, LogStats, LoggingService};
pub use status::{AccountSummary, StatusService, StatusSummary};
pub use transfer::{CreatedAsset, OptInPolicy, TransferOptions, TransferOutcome, TransferService};
