//! Scan pairing workflow: pair one item with one location, then confirm.

use crate::history::MoveHistory;
use crate::interfaces::{LookupError, MoveError, MoveService, WorkflowObserver};
use crate::payload::ScanPayload;
use crate::types::{
    MoveRecord, MoveRequest, PendingSnapshot, ScanSlot, ScannedItem, WorkflowState,
};
use chrono::Utc;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// User-facing status emitted on every transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusMessage {
    PayloadDetected(String),
    UnrecognizedPayload(String),
    ItemScanned { identifier: String, name: String },
    LocationScanned(String),
    ScanLocationNext,
    ScanItemNext,
    ConfirmMove,
    ItemNotFound(String),
    LookupFailed(String),
    MoveRecorded,
    MoveFailed(String),
    ReadyForNextScan,
}

impl StatusMessage {
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            StatusMessage::ItemNotFound(_)
                | StatusMessage::LookupFailed(_)
                | StatusMessage::MoveFailed(_)
        )
    }
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusMessage::PayloadDetected(raw) => write!(f, "QR code detected: {}", raw),
            StatusMessage::UnrecognizedPayload(raw) => {
                write!(f, "Unrecognized QR format: {}", raw)
            }
            StatusMessage::ItemScanned { identifier, name } => {
                write!(f, "Item scanned: {} ({})", name, identifier)
            }
            StatusMessage::LocationScanned(id) => write!(f, "Location scanned: {}", id),
            StatusMessage::ScanLocationNext => f.write_str("Now scan the target location"),
            StatusMessage::ScanItemNext => f.write_str("Now scan the item"),
            StatusMessage::ConfirmMove => f.write_str("Confirm the item move"),
            StatusMessage::ItemNotFound(id) => write!(f, "Item not found: {}", id),
            StatusMessage::LookupFailed(reason) => write!(f, "Item lookup failed: {}", reason),
            StatusMessage::MoveRecorded => f.write_str("Item moved successfully"),
            StatusMessage::MoveFailed(reason) => write!(f, "Move failed: {}", reason),
            StatusMessage::ReadyForNextScan => f.write_str("Ready for a new scan"),
        }
    }
}

/// Result of feeding one decoded payload into the workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    Item(WorkflowState),
    Location(WorkflowState),
    /// Informational only; nothing changed.
    Unrecognized(String),
}

/// Holds at most one pending item and one pending location.
///
/// Both slots filled means the pair is ready to confirm. A successful
/// confirmation clears the slots and appends to the history; a failed one
/// leaves the slots untouched so the operator can retry.
pub struct ScanPairingWorkflow<M>
where
    M: MoveService,
{
    move_service: Arc<M>,
    item_slot: ScanSlot<ScannedItem>,
    location_slot: ScanSlot<String>,
    history: MoveHistory,
    observers: Vec<Arc<dyn WorkflowObserver>>,
}

impl<M> ScanPairingWorkflow<M>
where
    M: MoveService,
{
    pub fn new(move_service: Arc<M>) -> Self {
        Self {
            move_service,
            item_slot: ScanSlot::Empty,
            location_slot: ScanSlot::Empty,
            history: MoveHistory::new(),
            observers: Vec::new(),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn WorkflowObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn add_observer(&mut self, observer: Arc<dyn WorkflowObserver>) {
        self.observers.push(observer);
    }

    pub fn state(&self) -> WorkflowState {
        WorkflowState::from_slots(self.item_slot.is_filled(), self.location_slot.is_filled())
    }

    pub fn item_slot(&self) -> &ScanSlot<ScannedItem> {
        &self.item_slot
    }

    pub fn location_slot(&self) -> &ScanSlot<String> {
        &self.location_slot
    }

    pub fn history(&self) -> &MoveHistory {
        &self.history
    }

    pub fn snapshot(&self) -> PendingSnapshot {
        PendingSnapshot {
            state: self.state(),
            item: self.item_slot.get().cloned(),
            location: self.location_slot.get().cloned(),
        }
    }

    /// Dispatch a raw decoded string on its prefix.
    pub async fn handle_payload(&mut self, raw: &str) -> Result<ScanOutcome, LookupError> {
        let raw = raw.trim();
        self.notify_status(StatusMessage::PayloadDetected(raw.to_string()));

        match raw.parse::<ScanPayload>() {
            Ok(ScanPayload::Item(id)) => {
                let state = self.on_item_scanned(&id).await?;
                Ok(ScanOutcome::Item(state))
            }
            Ok(ScanPayload::Location(id)) => Ok(ScanOutcome::Location(self.on_location_scanned(&id))),
            Err(err) => {
                debug!("Ignoring payload: {}", err);
                self.notify_status(StatusMessage::UnrecognizedPayload(err.0.clone()));
                Ok(ScanOutcome::Unrecognized(err.0))
            }
        }
    }

    /// Look the item up and store it in the item slot.
    ///
    /// # Errors
    /// Returns the lookup error unchanged; the slots are not touched.
    pub async fn on_item_scanned(&mut self, identifier: &str) -> Result<WorkflowState, LookupError> {
        debug!("Looking up item: {}", identifier);

        let info = match self.move_service.lookup_item(identifier).await {
            Ok(info) => info,
            Err(err) => {
                warn!("Item lookup failed for {}: {}", identifier, err);
                let status = match &err {
                    LookupError::NotFound(id) => StatusMessage::ItemNotFound(id.clone()),
                    LookupError::Request(reason) => StatusMessage::LookupFailed(reason.clone()),
                };
                self.notify_status(status);
                return Err(err);
            }
        };

        let name = info.name.clone();
        self.item_slot.fill(ScannedItem {
            identifier: identifier.to_string(),
            info,
        });
        info!("Item scanned: {}", identifier);

        self.notify_status(StatusMessage::ItemScanned {
            identifier: identifier.to_string(),
            name,
        });
        let next = if self.location_slot.is_filled() {
            StatusMessage::ConfirmMove
        } else {
            StatusMessage::ScanLocationNext
        };
        Ok(self.after_scan(next))
    }

    /// Store the location. No remote validation happens here.
    pub fn on_location_scanned(&mut self, identifier: &str) -> WorkflowState {
        self.location_slot.fill(identifier.to_string());
        info!("Location scanned: {}", identifier);

        self.notify_status(StatusMessage::LocationScanned(identifier.to_string()));
        let next = if self.item_slot.is_filled() {
            StatusMessage::ConfirmMove
        } else {
            StatusMessage::ScanItemNext
        };
        self.after_scan(next)
    }

    /// Submit the pending pair as a move on behalf of `user_id`.
    ///
    /// # Errors
    /// `MoveError::MissingScans` outside ReadyToConfirm, or the service
    /// error. The pending scans are kept in both cases.
    pub async fn confirm(&mut self, user_id: &str, notes: &str) -> Result<MoveRecord, MoveError> {
        let (item, location) = match (&self.item_slot, &self.location_slot) {
            (ScanSlot::Filled(item), ScanSlot::Filled(location)) => (item.clone(), location.clone()),
            _ => {
                warn!("Confirm requested in state: {}", self.state());
                let err = MoveError::MissingScans;
                self.notify_status(StatusMessage::MoveFailed(err.to_string()));
                return Err(err);
            }
        };

        let request = MoveRequest {
            item_id: item.identifier.clone(),
            to_location_id: location.clone(),
            user_id: user_id.to_string(),
            notes: notes.to_string(),
        };

        if let Err(err) = self.move_service.record_move(&request).await {
            warn!("Move of {} to {} failed: {}", request.item_id, location, err);
            self.notify_status(StatusMessage::MoveFailed(err.to_string()));
            return Err(err);
        }

        let record = MoveRecord {
            recorded_at: Utc::now(),
            item_id: item.identifier,
            from_location: item.info.location_code,
            to_location: location,
            notes: request.notes,
        };
        info!(
            "Moved {} from {} to {}",
            record.item_id,
            record.from_display(),
            record.to_location
        );
        self.history.append(record.clone());

        for observer in &self.observers {
            observer.on_move_recorded(&record);
        }
        self.notify_status(StatusMessage::MoveRecorded);
        self.reset_pending();

        Ok(record)
    }

    /// Clear both slots regardless of state.
    pub fn reset_pending(&mut self) {
        self.item_slot.clear();
        self.location_slot.clear();
        debug!("Pending scans cleared");

        self.notify_state();
        self.notify_status(StatusMessage::ReadyForNextScan);
    }

    fn after_scan(&self, next: StatusMessage) -> WorkflowState {
        self.notify_state();
        self.notify_status(next);
        self.state()
    }

    fn notify_state(&self) {
        if self.observers.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        for observer in &self.observers {
            observer.on_state_changed(&snapshot);
        }
    }

    fn notify_status(&self, status: StatusMessage) {
        for observer in &self.observers {
            observer.on_status(&status);
        }
    }
}
