use async_trait::async_trait;

#[async_trait]
pub trait Interface: Send + Sync {
    /// Next input line, trimmed. `None` once input is closed.
    async fn receive_input(&self) -> Option<String>;

    /// Read a line without echoing it.
    async fn receive_secret(&self, prompt: &str) -> Option<String>;

    async fn send_output(&self, message: &str);

    /// Print `label` without a trailing newline.
    async fn send_prompt(&self, label: &str);

    async fn request_approval(&self, action: &str) -> bool;

    async fn show_status(&self, status: &str);

    async fn show_error(&self, error: &str);

    async fn prompt(&self, label: &str) -> Option<String> {
        self.send_prompt(label).await;
        self.receive_input().await
    }
}
