//! Interactive operator session: login, then scan, pair and confirm moves.

use crate::status::{self, StatusBoard};
use async_trait::async_trait;
use shelfscan_client::{ClientError, HealthStatus, ItemMovement, WarehouseClient};
use shelfscan_core::{
    Authenticator, LookupError, MoveService, RepeatFilter, ScanPairingWorkflow, ScanPayload,
    Session, WorkflowState,
};
use shelfscan_interfaces::Interface;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

/// Everything the REPL needs from the warehouse server.
#[async_trait]
pub trait Backend: MoveService + Authenticator {
    async fn item_history(&self, item_id: &str) -> Result<Vec<ItemMovement>, LookupError>;

    async fn health(&self) -> Result<HealthStatus, ClientError>;
}

#[async_trait]
impl Backend for WarehouseClient {
    async fn item_history(&self, item_id: &str) -> Result<Vec<ItemMovement>, LookupError> {
        WarehouseClient::item_history(self, item_id).await
    }

    async fn health(&self) -> Result<HealthStatus, ClientError> {
        WarehouseClient::health(self).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Scan,
    Stop,
    Payload(String),
    Confirm(String),
    Reset,
    Status,
    History,
    ItemHistory(String),
    Health,
    Logout,
    Help,
    Exit,
    Empty,
    Unknown(String),
}

impl ReplCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if ScanPayload::has_known_prefix(line) {
            return ReplCommand::Payload(line.to_string());
        }

        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word {
            "" => ReplCommand::Empty,
            "scan" => ReplCommand::Scan,
            "stop" => ReplCommand::Stop,
            "confirm" => ReplCommand::Confirm(rest.to_string()),
            "reset" => ReplCommand::Reset,
            "status" => ReplCommand::Status,
            "history" => ReplCommand::History,
            "item-history" => ReplCommand::ItemHistory(rest.to_string()),
            "health" => ReplCommand::Health,
            "logout" => ReplCommand::Logout,
            "help" => ReplCommand::Help,
            "exit" | "quit" => ReplCommand::Exit,
            _ => ReplCommand::Unknown(line.to_string()),
        }
    }

    /// In scan mode anything that is not a control word is a decoded payload.
    pub fn parse_scan(line: &str) -> Self {
        match Self::parse(line) {
            cmd @ (ReplCommand::Stop
            | ReplCommand::Confirm(_)
            | ReplCommand::Reset
            | ReplCommand::Status
            | ReplCommand::Exit
            | ReplCommand::Empty
            | ReplCommand::Payload(_)) => cmd,
            _ => ReplCommand::Payload(line.trim().to_string()),
        }
    }
}

enum SessionEnd {
    Logout,
    Exit,
}

pub struct Repl<I, B>
where
    I: Interface,
    B: Backend,
{
    interface: Arc<I>,
    backend: Arc<B>,
    default_username: Option<String>,
    repeat_window: Duration,
}

impl<I, B> Repl<I, B>
where
    I: Interface,
    B: Backend + 'static,
{
    pub fn new(interface: Arc<I>, backend: Arc<B>) -> Self {
        Self {
            interface,
            backend,
            default_username: None,
            repeat_window: Duration::from_millis(1500),
        }
    }

    pub fn with_default_username(mut self, username: Option<String>) -> Self {
        self.default_username = username.filter(|u| !u.trim().is_empty());
        self
    }

    pub fn with_repeat_window(mut self, window: Duration) -> Self {
        self.repeat_window = window;
        self
    }

    /// Run sessions until input closes or the operator exits.
    pub async fn run(&self) -> anyhow::Result<()> {
        loop {
            let Some(session) = self.login().await else {
                return Ok(());
            };

            match self.session_loop(&session).await {
                SessionEnd::Logout => continue,
                SessionEnd::Exit => {
                    self.interface.send_output("👋 Goodbye!").await;
                    return Ok(());
                }
            }
        }
    }

    /// Prompt until a login succeeds. `None` on end of input.
    async fn login(&self) -> Option<Session> {
        loop {
            let label = match &self.default_username {
                Some(name) => format!("Username [{}]: ", name),
                None => "Username: ".to_string(),
            };
            let entered = self.interface.prompt(&label).await?;
            let username = match (entered.is_empty(), &self.default_username) {
                (false, _) => entered,
                (true, Some(name)) => name.clone(),
                (true, None) => continue,
            };

            let password = self.interface.receive_secret("Password: ").await?;

            match self.backend.login(&username, &password).await {
                Ok(session) => {
                    info!("Logged in as {}", session.username);
                    self.interface
                        .show_status(&format!(
                            "Logged in as {} ({})",
                            session.username, session.role
                        ))
                        .await;
                    self.interface
                        .send_output("Type 'scan' to start scanning, 'help' for commands.")
                        .await;
                    return Some(session);
                }
                Err(e) => self.interface.show_error(&e.to_string()).await,
            }
        }
    }

    async fn session_loop(&self, session: &Session) -> SessionEnd {
        let board = Arc::new(StatusBoard::new());
        let mut workflow =
            ScanPairingWorkflow::new(self.backend.clone()).with_observer(board.clone());
        let mut filter = RepeatFilter::new(self.repeat_window);
        let mut scanning = false;

        loop {
            let label = if scanning { "scan> " } else { "shelfscan> " };
            let Some(line) = self.interface.prompt(label).await else {
                return SessionEnd::Exit;
            };

            let command = if scanning {
                ReplCommand::parse_scan(&line)
            } else {
                ReplCommand::parse(&line)
            };

            match command {
                ReplCommand::Empty => {}
                ReplCommand::Scan => {
                    scanning = true;
                    filter.reset();
                    self.interface
                        .show_status("Scan mode: scan a code, type 'stop' to leave")
                        .await;
                }
                ReplCommand::Stop => {
                    if scanning {
                        scanning = false;
                        self.interface.show_status("Scanning stopped").await;
                    } else {
                        self.interface.show_status("Not scanning").await;
                    }
                }
                ReplCommand::Payload(raw) => {
                    if scanning && !filter.admit(&raw, Instant::now()) {
                        debug!("Suppressed repeated scan: {}", raw);
                        continue;
                    }
                    // Lookup failures are reported through the board.
                    let _ = workflow.handle_payload(&raw).await;
                    self.flush(&board).await;
                    if workflow.state() == WorkflowState::ReadyToConfirm {
                        if let Some(summary) = status::render_confirmation(&workflow.snapshot()) {
                            self.interface.send_output(&summary).await;
                        }
                    }
                }
                ReplCommand::Confirm(notes) => {
                    let result = workflow.confirm(&session.user_id, &notes).await;
                    self.flush(&board).await;
                    if let Ok(record) = result {
                        self.interface
                            .send_output(&status::render_record(&record))
                            .await;
                        filter.reset();
                    }
                }
                ReplCommand::Reset => {
                    workflow.reset_pending();
                    filter.reset();
                    self.flush(&board).await;
                }
                ReplCommand::Status => {
                    for line in status::render_pending(&workflow.snapshot()) {
                        self.interface.send_output(&line).await;
                    }
                }
                ReplCommand::History => {
                    for line in status::render_history(workflow.history()) {
                        self.interface.send_output(&line).await;
                    }
                }
                ReplCommand::ItemHistory(item_id) => self.show_item_history(&item_id).await,
                ReplCommand::Health => self.show_health().await,
                ReplCommand::Logout => {
                    if !self.may_discard(workflow.state()).await {
                        continue;
                    }
                    self.backend.logout().await;
                    info!("Logged out {}", session.username);
                    self.interface.show_status("Logged out").await;
                    return SessionEnd::Logout;
                }
                ReplCommand::Help => self.show_help().await,
                ReplCommand::Exit => {
                    if self.may_discard(workflow.state()).await {
                        return SessionEnd::Exit;
                    }
                }
                ReplCommand::Unknown(input) => {
                    self.interface
                        .show_error(&format!(
                            "Unknown command: {} (type 'help' for commands)",
                            input
                        ))
                        .await;
                }
            }
        }
    }

    /// Ask before dropping scans that were never confirmed.
    async fn may_discard(&self, state: WorkflowState) -> bool {
        if state == WorkflowState::Idle {
            return true;
        }
        self.interface
            .request_approval(&format!("Pending scans ({}) will be discarded", state))
            .await
    }

    async fn flush(&self, board: &StatusBoard) {
        for line in board.drain() {
            if line.is_error {
                self.interface.show_error(&line.text).await;
            } else {
                self.interface.show_status(&line.text).await;
            }
        }
    }

    async fn show_item_history(&self, item_id: &str) {
        if item_id.is_empty() {
            self.interface
                .show_error("Usage: item-history <item-id>")
                .await;
            return;
        }

        match self.backend.item_history(item_id).await {
            Ok(movements) if movements.is_empty() => {
                self.interface
                    .show_status(&format!("No recorded moves for {}", item_id))
                    .await;
            }
            Ok(movements) => {
                for movement in &movements {
                    self.interface
                        .send_output(&render_movement(movement))
                        .await;
                }
            }
            Err(e) => self.interface.show_error(&e.to_string()).await,
        }
    }

    async fn show_health(&self) {
        match self.backend.health().await {
            Ok(health) if health.is_ok() => {
                self.interface
                    .show_status(&format!("Server OK: {}", health.message))
                    .await;
            }
            Ok(health) => {
                self.interface
                    .show_error(&format!("Server reports {}: {}", health.status, health.message))
                    .await;
            }
            Err(e) => self.interface.show_error(&e.to_string()).await,
        }
    }

    async fn show_help(&self) {
        let help = [
            "Commands:",
            "  scan              enter scan mode (one code per line, 'stop' to leave)",
            "  ITEM:<id>         scan an item directly",
            "  LOC:<id>          scan a location directly",
            "  confirm [notes]   record the pending move",
            "  reset             discard pending scans",
            "  status            show pending scans",
            "  history           moves recorded this session",
            "  item-history <id> moves recorded on the server for an item",
            "  health            check the server",
            "  logout            end the session",
            "  exit              quit",
        ];
        for line in help {
            self.interface.send_output(line).await;
        }
    }
}

fn render_movement(movement: &ItemMovement) -> String {
    let when = movement
        .moved_at
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "unknown time".to_string());
    let mut line = format!(
        "[{}] {} → {} by {}",
        when,
        status::display_location(&movement.from_location_id),
        movement.to_location_id,
        movement.user_id
    );
    if !movement.notes.is_empty() {
        line.push_str(&format!(" ({})", movement.notes));
    }
    line
}
