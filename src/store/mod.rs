//! Client-local seat state: the authoritative seat map plus the user's
//! tentative selection overlay. Pure data, no I/O.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use tracing::trace;

use crate::models::{EffectiveStatus, Seat, SeatDelta, SeatStatus, ShowSession};

pub struct SeatStore {
    session: Option<ShowSession>,
    seats: BTreeMap<String, Seat>,
    // Seat ids the local user tentatively chose, in click order.
    selection: Vec<String>,
    user_id: String,
}

impl SeatStore {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            session: None,
            seats: BTreeMap::new(),
            selection: Vec::new(),
            user_id: user_id.into(),
        }
    }

    /// Replace the entire seat map from a session snapshot and clear the
    /// selection. Used on (re)join; never a partial merge.
    pub fn load_snapshot(&mut self, mut session: ShowSession) {
        self.seats = session
            .seats
            .drain(..)
            .map(|seat| (seat.id.clone(), seat))
            .collect();
        self.selection.clear();
        // Seat truth lives in the map; the descriptor keeps only metadata.
        self.session = Some(session);
    }

    /// Idempotent merge of one authoritative update. An unknown seat id is a
    /// no-op: late or duplicate updates for since-removed seats must never
    /// fault the engine.
    pub fn apply_update(&mut self, delta: &SeatDelta) {
        let evict = match self.seats.get_mut(&delta.seat_id) {
            Some(seat) => {
                seat.status = delta.status;
                seat.locked_by = match delta.status {
                    SeatStatus::Locked => delta.locked_by.clone(),
                    _ => None,
                };
                match delta.status {
                    SeatStatus::Booked => true,
                    SeatStatus::Locked => {
                        seat.locked_by.as_deref() != Some(self.user_id.as_str())
                    }
                    SeatStatus::Available => false,
                }
            }
            None => {
                trace!(seat_id = %delta.seat_id, "update for unknown seat ignored");
                return;
            }
        };

        // A seat the authority handed to someone else (or booked) can no
        // longer be part of the local selection.
        if evict {
            self.selection.retain(|id| id != &delta.seat_id);
        }
    }

    /// Apply a batch of updates, each via the single-update rule. Each entry
    /// targets a distinct key; last write wins per key as delivered.
    pub fn apply_batch(&mut self, deltas: &[SeatDelta]) {
        for delta in deltas {
            self.apply_update(delta);
        }
    }

    /// Toggle the local selection of a seat. Silently refuses unknown seats,
    /// booked seats, and seats locked by a different identity. Returns
    /// whether the selection changed.
    pub fn toggle_selection(&mut self, seat_id: &str) -> bool {
        let Some(seat) = self.seats.get(seat_id) else {
            return false;
        };
        if seat.status == SeatStatus::Booked {
            return false;
        }
        if seat.status == SeatStatus::Locked
            && seat.locked_by.as_deref() != Some(self.user_id.as_str())
        {
            return false;
        }

        if let Some(pos) = self.selection.iter().position(|id| id == seat_id) {
            self.selection.remove(pos);
        } else {
            self.selection.push(seat_id.to_string());
        }
        true
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn is_selected(&self, seat_id: &str) -> bool {
        self.selection.iter().any(|id| id == seat_id)
    }

    /// Display status: the selection overlay wins over the raw status.
    pub fn effective_status(&self, seat_id: &str) -> EffectiveStatus {
        let Some(seat) = self.seats.get(seat_id) else {
            return EffectiveStatus::Unknown;
        };
        if self.is_selected(seat_id) {
            EffectiveStatus::Selected
        } else {
            seat.status.into()
        }
    }

    pub fn seat(&self, seat_id: &str) -> Option<&Seat> {
        self.seats.get(seat_id)
    }

    pub fn session(&self) -> Option<&ShowSession> {
        self.session.as_ref()
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn len(&self) -> usize {
        self.seats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }

    fn with_status(&self, status: SeatStatus) -> Vec<Seat> {
        self.seats
            .values()
            .filter(|seat| seat.status == status)
            .cloned()
            .collect()
    }

    pub fn available_seats(&self) -> Vec<Seat> {
        self.with_status(SeatStatus::Available)
    }

    pub fn locked_seats(&self) -> Vec<Seat> {
        self.with_status(SeatStatus::Locked)
    }

    pub fn booked_seats(&self) -> Vec<Seat> {
        self.with_status(SeatStatus::Booked)
    }

    pub fn my_locked_seats(&self) -> Vec<Seat> {
        self.seats
            .values()
            .filter(|seat| seat.is_locked_by(&self.user_id))
            .cloned()
            .collect()
    }

    /// Selected seats in click order. A selected id missing from the map is
    /// skipped rather than reported.
    pub fn selected_seats(&self) -> Vec<Seat> {
        self.selection
            .iter()
            .filter_map(|id| self.seats.get(id).cloned())
            .collect()
    }

    /// Sum of prices over the current selection; a missing seat contributes
    /// zero, an empty selection totals 0.0.
    pub fn total_selected_price(&self) -> f64 {
        self.selection
            .iter()
            .map(|id| self.seats.get(id).map_or(0.0, |seat| seat.price))
            .sum()
    }

    /// Derived row projection: row -> seats sorted by number. Recomputed on
    /// every call, never independently mutated.
    pub fn seats_by_row(&self) -> BTreeMap<String, Vec<Seat>> {
        let mut grouped: BTreeMap<String, Vec<Seat>> = BTreeMap::new();
        for seat in self.seats.values() {
            grouped.entry(seat.row.clone()).or_default().push(seat.clone());
        }
        for seats in grouped.values_mut() {
            seats.sort_by_key(|seat| seat.number);
        }
        grouped
    }
}

/// Cloneable handle funnelling both mutation sources (the protocol
/// dispatcher and local user intent) through one serialized mutation point.
/// The lock is never held across an await.
#[derive(Clone)]
pub struct SeatStoreHandle {
    inner: Arc<Mutex<SeatStore>>,
}

impl SeatStoreHandle {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SeatStore::new(user_id))),
        }
    }

    /// Run a closure against the locked store. The general entry point for
    /// derived queries the rendering layer needs.
    pub fn with<R>(&self, f: impl FnOnce(&SeatStore) -> R) -> R {
        f(&self.lock())
    }

    pub fn load_snapshot(&self, session: ShowSession) {
        self.lock().load_snapshot(session);
    }

    pub fn apply_update(&self, delta: &SeatDelta) {
        self.lock().apply_update(delta);
    }

    pub fn apply_batch(&self, deltas: &[SeatDelta]) {
        self.lock().apply_batch(deltas);
    }

    pub fn toggle_selection(&self, seat_id: &str) -> bool {
        self.lock().toggle_selection(seat_id)
    }

    pub fn clear_selection(&self) {
        self.lock().clear_selection();
    }

    pub fn is_selected(&self, seat_id: &str) -> bool {
        self.lock().is_selected(seat_id)
    }

    pub fn effective_status(&self, seat_id: &str) -> EffectiveStatus {
        self.lock().effective_status(seat_id)
    }

    pub fn selected_seats(&self) -> Vec<Seat> {
        self.lock().selected_seats()
    }

    pub fn total_selected_price(&self) -> f64 {
        self.lock().total_selected_price()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SeatStore> {
        self.inner.lock().expect("seat store mutex poisoned")
    }
}
