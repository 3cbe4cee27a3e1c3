//! Scan-pair-and-confirm workflow for warehouse item moves.

pub mod capture;
pub mod history;
pub mod interfaces;
pub mod payload;
pub mod types;
pub mod workflow;

pub use capture::{FeedConfig, Frame, FrameDecoder, FrameSource, RepeatFilter, ScanFeed};
pub use history::MoveHistory;
pub use interfaces::{AuthError, Authenticator, LookupError, MoveError, MoveService, WorkflowObserver};
pub use payload::{ScanPayload, UnrecognizedPayload};
pub use types::*;
pub use workflow::{ScanOutcome, ScanPairingWorkflow, StatusMessage};
