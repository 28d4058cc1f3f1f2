pub mod clock;
pub mod models;
pub mod repository;
pub mod validation;

pub use clock::{Clock, FixedClock, SystemClock};
pub use models::{Booking, BookingStatus, FlightRef, Passenger, PaymentStatus, User, UserRole};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
