use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::seat::Seat;

/// Descriptor of the viewing context, received once on session join and
/// replaced wholesale on re-join. Never partially mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowSession {
    pub id: String,
    pub movie_title: String,
    #[serde(default)]
    pub movie_poster: String,
    pub theater: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub seats: Vec<Seat>,
    pub total_seats: u32,
}
