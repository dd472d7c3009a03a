use serde::{Deserialize, Serialize};

/// Raw seat status as delivered by the authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeatStatus {
    Available,
    Locked,
    Booked,
}

/// Status used for display: the local selection overlay wins over the raw
/// authoritative status, which stays untouched in the seat map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectiveStatus {
    Available,
    Locked,
    Booked,
    Selected,
    Unknown,
}

impl From<SeatStatus> for EffectiveStatus {
    fn from(status: SeatStatus) -> Self {
        match status {
            SeatStatus::Available => EffectiveStatus::Available,
            SeatStatus::Locked => EffectiveStatus::Locked,
            SeatStatus::Booked => EffectiveStatus::Booked,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seat {
    pub id: String,
    pub row: String,
    pub number: u32,
    pub status: SeatStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked_by: Option<String>,
    pub price: f64,
}

impl Seat {
    pub fn is_locked_by(&self, user_id: &str) -> bool {
        self.status == SeatStatus::Locked && self.locked_by.as_deref() == Some(user_id)
    }
}

/// One authoritative seat change as carried by `SEAT_UPDATE` / `SEATS_UPDATE`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatDelta {
    pub seat_id: String,
    pub status: SeatStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked_by: Option<String>,
}
