pub mod booking;
pub mod seat;
pub mod session;
pub mod user;

pub use booking::BookingReceipt;
pub use seat::{EffectiveStatus, Seat, SeatDelta, SeatStatus};
pub use session::ShowSession;
pub use user::UserIdentity;
