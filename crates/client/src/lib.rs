//! REST client for the warehouse inventory API.

pub mod client;
pub mod wire;

pub use client::{ClientError, WarehouseClient};
pub use wire::{HealthStatus, ItemMovement};
