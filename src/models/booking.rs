use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Confirmed booking returned by the backend commit call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingReceipt {
    pub id: String,
    pub session_id: String,
    pub user_id: String,
    pub seats: Vec<String>,
    pub total_amount: f64,
    pub status: String,
    pub created_at: DateTime<Utc>,
}
