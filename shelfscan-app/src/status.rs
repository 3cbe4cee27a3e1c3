//! Terminal presentation of workflow state.

use parking_lot::Mutex;
use shelfscan_core::{
    MoveHistory, MoveRecord, PendingSnapshot, StatusMessage, WorkflowObserver, WorkflowState,
    NO_LOCATION,
};

/// One buffered status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub text: String,
    pub is_error: bool,
}

/// Collects workflow notifications until the REPL prints them.
#[derive(Default)]
pub struct StatusBoard {
    lines: Mutex<Vec<StatusLine>>,
    latest: Mutex<Option<PendingSnapshot>>,
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every line buffered since the last drain.
    pub fn drain(&self) -> Vec<StatusLine> {
        std::mem::take(&mut *self.lines.lock())
    }

    pub fn latest_snapshot(&self) -> Option<PendingSnapshot> {
        self.latest.lock().clone()
    }
}

impl WorkflowObserver for StatusBoard {
    fn on_status(&self, status: &StatusMessage) {
        self.lines.lock().push(StatusLine {
            text: status.to_string(),
            is_error: status.is_error(),
        });
    }

    fn on_state_changed(&self, snapshot: &PendingSnapshot) {
        *self.latest.lock() = Some(snapshot.clone());
    }
}

/// Pending scans as shown by `status` and after every scan.
pub fn render_pending(snapshot: &PendingSnapshot) -> Vec<String> {
    let mut lines = vec![format!("State: {}", snapshot.state)];

    match &snapshot.item {
        Some(item) => lines.push(format!(
            "  Item:     {} ({})",
            item.identifier, item.info.name
        )),
        None => lines.push("  Item:     -".to_string()),
    }
    match &snapshot.location {
        Some(location) => lines.push(format!("  Location: {}", location)),
        None => lines.push("  Location: -".to_string()),
    }

    if let Some(summary) = render_confirmation(snapshot) {
        lines.push(summary);
    }
    lines
}

/// `item (name): from → to`, only once both scans are in.
pub fn render_confirmation(snapshot: &PendingSnapshot) -> Option<String> {
    if snapshot.state != WorkflowState::ReadyToConfirm {
        return None;
    }
    let item = snapshot.item.as_ref()?;
    let location = snapshot.location.as_ref()?;
    Some(format!(
        "  Move {} ({}): {} → {}",
        item.identifier,
        item.info.name,
        item.info.location_display(),
        location
    ))
}

pub fn render_record(record: &MoveRecord) -> String {
    let mut line = format!(
        "[{}] {}: {} → {}",
        record.local_time(),
        record.item_id,
        record.from_display(),
        record.to_location
    );
    if !record.notes.is_empty() {
        line.push_str(&format!(" ({})", record.notes));
    }
    line
}

/// Session history, newest first.
pub fn render_history(history: &MoveHistory) -> Vec<String> {
    if history.is_empty() {
        return vec!["No moves recorded in this session".to_string()];
    }
    history.newest_first().map(render_record).collect()
}

/// Blank source location in server history means the item had none.
pub fn display_location(code: &str) -> &str {
    if code.is_empty() {
        NO_LOCATION
    } else {
        code
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use shelfscan_core::{ItemInfo, ScannedItem};

    fn record(item: &str, from: Option<&str>, to: &str, notes: &str) -> MoveRecord {
        MoveRecord {
            recorded_at: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
            item_id: item.to_string(),
            from_location: from.map(String::from),
            to_location: to.to_string(),
            notes: notes.to_string(),
        }
    }

    fn ready_snapshot() -> PendingSnapshot {
        PendingSnapshot {
            state: WorkflowState::ReadyToConfirm,
            item: Some(ScannedItem {
                identifier: "item123".to_string(),
                info: ItemInfo {
                    id: "item123".to_string(),
                    name: "Bolt M6".to_string(),
                    sku: "BLT-M6".to_string(),
                    quantity: 200,
                    location_code: Some("A1".to_string()),
                },
            }),
            location: Some("B2".to_string()),
        }
    }

    #[test]
    fn test_board_collects_and_drains() {
        let board = StatusBoard::new();
        board.on_status(&StatusMessage::ScanLocationNext);
        board.on_status(&StatusMessage::ItemNotFound("item999".to_string()));

        let lines = board.drain();
        assert_eq!(lines.len(), 2);
        assert!(!lines[0].is_error);
        assert!(lines[1].is_error);
        assert_eq!(lines[1].text, "Item not found: item999");
        assert!(board.drain().is_empty());
    }

    #[test]
    fn test_confirmation_summary() {
        let summary = render_confirmation(&ready_snapshot()).unwrap();
        assert_eq!(summary, "  Move item123 (Bolt M6): A1 → B2");
    }

    #[test]
    fn test_no_summary_until_ready() {
        let mut snapshot = ready_snapshot();
        snapshot.state = WorkflowState::ItemOnly;
        snapshot.location = None;
        assert!(render_confirmation(&snapshot).is_none());
        assert_eq!(render_pending(&snapshot).len(), 3);
    }

    #[test]
    fn test_record_without_origin_uses_placeholder() {
        let line = render_record(&record("item7", None, "C3", ""));
        assert!(line.ends_with("item7: — → C3"));
    }

    #[test]
    fn test_record_shows_notes() {
        let line = render_record(&record("item7", Some("A1"), "C3", "damaged box"));
        assert!(line.ends_with("(damaged box)"));
    }

    #[test]
    fn test_history_newest_first() {
        let mut history = MoveHistory::new();
        history.append(record("first", Some("A1"), "B2", ""));
        history.append(record("second", Some("B2"), "C3", ""));

        let lines = render_history(&history);
        assert!(lines[0].contains("second"));
        assert!(lines[1].contains("first"));
    }

    #[test]
    fn test_empty_history() {
        let lines = render_history(&MoveHistory::new());
        assert_eq!(lines, vec!["No moves recorded in this session".to_string()]);
    }
}
