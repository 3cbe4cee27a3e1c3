//! JSON bodies exchanged with the warehouse API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shelfscan_core::ItemInfo;

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponse {
    #[serde(default)]
    pub success: bool,
    pub user_id: Option<String>,
    pub username: Option<String>,
    pub role: Option<String>,
    pub token: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ItemResponse {
    #[serde(default)]
    pub success: bool,
    pub item: Option<WireItem>,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireItem {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub quantity: i64,
    pub location: Option<WireLocation>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireLocation {
    #[serde(default)]
    pub code: String,
}

impl WireItem {
    /// Convert to the domain type. An empty id falls back to the one requested.
    pub fn into_info(self, requested_id: &str) -> ItemInfo {
        let id = if self.id.is_empty() {
            requested_id.to_string()
        } else {
            self.id
        };
        ItemInfo {
            id,
            name: self.name,
            sku: self.sku,
            quantity: self.quantity,
            location_code: self
                .location
                .map(|l| l.code)
                .filter(|code| !code.is_empty()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct MoveResponse {
    #[serde(default)]
    pub success: bool,
    pub message: Option<String>,
    pub error: Option<String>,
}

/// One entry of the server-side movement log for an item.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ItemMovement {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub item_id: String,
    #[serde(default)]
    pub from_location_id: String,
    #[serde(default)]
    pub to_location_id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub notes: String,
    pub moved_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ItemHistoryResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub movements: Vec<ItemMovement>,
    pub error: Option<String>,
}

/// `GET /health` answer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub message: String,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}

/// Error envelope shared by every endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: Option<String>,
    pub message: Option<String>,
}
