//! Election client core.
//!
//! - [`role`]: who may enter as administrator or voter
//! - [`sync`]: snapshot of chain state with stale-value fallback
//! - [`orchestrator`]: single-flight submit, confirm, refresh
//! - [`controls`]: which actions the current state allows
//! - [`session`]: wallet binding tying the above together

pub mod config;
pub mod controls;
pub mod error;
pub mod orchestrator;
pub mod role;
pub mod session;
pub mod sync;

pub use config::ClientConfig;
pub use controls::SessionControls;
pub use error::ClientError;
pub use orchestrator::{Orchestrator, TxOutcome, SUCCESS_NOTICE};
pub use role::{decide, resolve, AccessSummary, DenialReason, RoleDecision};
pub use session::{
    ClaimOutcome, ConnectOutcome, Session, CLAIM_FAILED_NOTICE, CLAIM_SUCCESS_NOTICE,
    CONNECTION_FAILED,
};
pub use sync::{ReadTarget, Snapshot, SyncReport, Synchronizer};
