use crate::traits::Interface;
use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;
use tracing::warn;

/// Line-oriented terminal. A keyboard-wedge scanner types each decoded
/// payload followed by Enter, so scans arrive here like any other line.
pub struct TerminalInterface {
    lines: Mutex<Lines<BufReader<Stdin>>>,
}

impl TerminalInterface {
    pub fn new() -> Self {
        Self {
            lines: Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
        }
    }

    async fn write(&self, message: &str, newline: bool) {
        let mut stdout = tokio::io::stdout();
        let _ = stdout.write_all(message.as_bytes()).await;
        if newline {
            let _ = stdout.write_all(b"\n").await;
        }
        let _ = stdout.flush().await;
    }
}

impl Default for TerminalInterface {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Interface for TerminalInterface {
    async fn receive_input(&self) -> Option<String> {
        let mut lines = self.lines.lock().await;

        match lines.next_line().await {
            Ok(Some(line)) => Some(line.trim().to_string()),
            Ok(None) => None, // EOF
            Err(e) => {
                warn!("Failed to read input: {}", e);
                None
            }
        }
    }

    async fn receive_secret(&self, prompt: &str) -> Option<String> {
        self.write(prompt, false).await;

        // Hold the line reader so nothing else consumes the secret.
        let _guard = self.lines.lock().await;
        match tokio::task::spawn_blocking(rpassword::read_password).await {
            Ok(Ok(secret)) => Some(secret.trim().to_string()),
            Ok(Err(e)) => {
                warn!("Failed to read secret: {}", e);
                None
            }
            Err(e) => {
                warn!("Secret reader task failed: {}", e);
                None
            }
        }
    }

    async fn send_output(&self, message: &str) {
        self.write(message, true).await;
    }

    async fn send_prompt(&self, label: &str) {
        self.write(label, false).await;
    }

    async fn request_approval(&self, action: &str) -> bool {
        self.send_output(&format!("⚠️  {}", action)).await;

        if let Some(response) = self.prompt("Confirm? (y/n): ").await {
            response.to_lowercase().starts_with('y')
        } else {
            false
        }
    }

    async fn show_status(&self, status: &str) {
        self.send_output(&format!("ℹ️  {}", status)).await;
    }

    async fn show_error(&self, error: &str) {
        self.send_output(&format!("❌ {}", error)).await;
    }
}
