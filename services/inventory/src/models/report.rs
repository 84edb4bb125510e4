//! Report payloads for the withdrawal ledger

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// One ledger entry joined with the item name and taker display name
#[derive(Debug, Clone, Serialize)]
pub struct TakenReportRow {
    pub id: Uuid,
    pub sel3a_name: String,
    pub taken_quantity: i32,
    /// Taker's display name; falls back to the recorded email when the
    /// account no longer exists.
    pub taken_by: String,
    pub taken_at: DateTime<Utc>,
}

/// Per-item total of quantities ever taken. Items with no takes appear
/// with a total of zero.
#[derive(Debug, Clone, Serialize)]
pub struct TakenSummaryRow {
    pub sel3a_id: Uuid,
    pub sel3a_name: String,
    pub total_taken_quantity: i64,
}

/// One withdrawal in the per-item detail report
#[derive(Debug, Clone, Serialize)]
pub struct TakenDetailEntry {
    pub id: Uuid,
    pub taken_quantity: i32,
    pub taken_by: String,
    pub taken_at: DateTime<Utc>,
}

/// Per-item detail report
///
/// `total_added` is derived, never stored: remaining quantity plus the sum
/// of everything ever taken.
#[derive(Debug, Clone, Serialize)]
pub struct TakenDetailsResponse {
    pub sel3a_name: String,
    pub added_by: String,
    pub remaining_quantity: i32,
    pub total_added: i64,
    pub details: Vec<TakenDetailEntry>,
}
