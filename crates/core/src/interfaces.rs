//! Abstract interfaces for the workflow's collaborators.

use crate::types::{ItemInfo, MoveRecord, MoveRequest, PendingSnapshot, Session};
use crate::workflow::StatusMessage;
use async_trait::async_trait;
use thiserror::Error;

/// Item lookup failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("Item not found: {0}")]
    NotFound(String),

    #[error("Item lookup failed: {0}")]
    Request(String),
}

/// Move submission failures. Pending scans survive all of these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    #[error("Both an item and a location must be scanned before confirming")]
    MissingScans,

    #[error("Move rejected: {0}")]
    Rejected(String),

    #[error("Move request failed: {0}")]
    Request(String),
}

/// Login failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Login rejected: {0}")]
    Rejected(String),

    #[error("Login request failed: {0}")]
    Request(String),
}

/// Remote inventory service used by the workflow.
#[async_trait]
pub trait MoveService: Send + Sync {
    /// Fetch item details, including its current location.
    async fn lookup_item(&self, item_id: &str) -> Result<ItemInfo, LookupError>;

    /// Record a move of an item to a new location.
    async fn record_move(&self, request: &MoveRequest) -> Result<(), MoveError>;
}

/// Credential check producing an operator session.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn login(&self, username: &str, password: &str) -> Result<Session, AuthError>;

    /// Drop any session state held by the authenticator.
    async fn logout(&self);
}

/// Presentation hooks invoked on workflow transitions.
pub trait WorkflowObserver: Send + Sync {
    fn on_status(&self, _status: &StatusMessage) {}

    fn on_state_changed(&self, _snapshot: &PendingSnapshot) {}

    fn on_move_recorded(&self, _record: &MoveRecord) {}
}
