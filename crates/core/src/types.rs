//! Core data types for the scan pairing workflow.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder rendered when an item has no known location.
pub const NO_LOCATION: &str = "—";

/// Holder for the most recent scan of one kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanSlot<T> {
    Empty,
    Filled(T),
}

impl<T> Default for ScanSlot<T> {
    fn default() -> Self {
        ScanSlot::Empty
    }
}

impl<T> ScanSlot<T> {
    pub fn is_filled(&self) -> bool {
        matches!(self, ScanSlot::Filled(_))
    }

    pub fn get(&self) -> Option<&T> {
        match self {
            ScanSlot::Filled(value) => Some(value),
            ScanSlot::Empty => None,
        }
    }

    /// Replace the slot contents. Last scan wins.
    pub fn fill(&mut self, value: T) {
        *self = ScanSlot::Filled(value);
    }

    pub fn clear(&mut self) {
        *self = ScanSlot::Empty;
    }
}

/// Item details as reported by the item lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemInfo {
    pub id: String,
    pub name: String,
    pub sku: String,
    pub quantity: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_code: Option<String>,
}

impl ItemInfo {
    /// Current location code, or the placeholder when the item is unplaced.
    pub fn location_display(&self) -> &str {
        self.location_code.as_deref().unwrap_or(NO_LOCATION)
    }
}

/// An item identifier together with the details fetched when it was scanned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedItem {
    pub identifier: String,
    pub info: ItemInfo,
}

/// Request to move an item to a new location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveRequest {
    pub item_id: String,
    pub to_location_id: String,
    pub user_id: String,
    pub notes: String,
}

/// A completed move, kept in the session history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveRecord {
    pub recorded_at: DateTime<Utc>,
    pub item_id: String,
    /// Location the item occupied before the move.
    pub from_location: Option<String>,
    pub to_location: String,
    pub notes: String,
}

impl MoveRecord {
    pub fn from_display(&self) -> &str {
        self.from_location.as_deref().unwrap_or(NO_LOCATION)
    }

    /// Wall-clock time of the move in the local timezone, `HH:MM:SS`.
    pub fn local_time(&self) -> String {
        self.recorded_at
            .with_timezone(&Local)
            .format("%H:%M:%S")
            .to_string()
    }
}

/// Authenticated operator session.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user_id: String,
    pub username: String,
    pub role: String,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("user_id", &self.user_id)
            .field("username", &self.username)
            .field("role", &self.role)
            .finish()
    }
}

/// Pairing state derived from the two slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    Idle,
    ItemOnly,
    LocationOnly,
    ReadyToConfirm,
}

impl WorkflowState {
    pub fn from_slots(item_filled: bool, location_filled: bool) -> Self {
        match (item_filled, location_filled) {
            (false, false) => WorkflowState::Idle,
            (true, false) => WorkflowState::ItemOnly,
            (false, true) => WorkflowState::LocationOnly,
            (true, true) => WorkflowState::ReadyToConfirm,
        }
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            WorkflowState::Idle => "idle",
            WorkflowState::ItemOnly => "item scanned",
            WorkflowState::LocationOnly => "location scanned",
            WorkflowState::ReadyToConfirm => "ready to confirm",
        };
        f.write_str(label)
    }
}

/// Read-only view of the pending scans handed to observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSnapshot {
    pub state: WorkflowState,
    pub item: Option<ScannedItem>,
    pub location: Option<String>,
}
