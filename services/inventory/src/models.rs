//! Inventory models for entities and request payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod report;

/// Inventory item ("sel3a") entity
#[derive(Debug, Clone, Serialize)]
pub struct Sel3a {
    pub id: Uuid,
    pub name: String,
    pub price: f64,
    pub quantity: i32,
    /// Creator's email. Edit and delete are restricted to this identity.
    pub added_by: String,
    pub created_at: DateTime<Utc>,
}

/// Item listing row with the creator's display name joined in
#[derive(Debug, Clone, Serialize)]
pub struct Sel3aListItem {
    pub id: Uuid,
    pub name: String,
    pub price: f64,
    pub quantity: i32,
    pub added_by: String,
    pub added_by_name: Option<String>,
}

/// Create/update payload for an item. Fields are optional so the handler
/// can distinguish a missing field from a zero value.
#[derive(Debug, Deserialize)]
pub struct Sel3aPayload {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub quantity: Option<i32>,
}

/// Take request payload
#[derive(Debug, Deserialize)]
pub struct TakeRequest {
    pub quantity: Option<i32>,
}
