pub mod confirmation;
pub mod fare;
pub mod lifecycle;
pub mod refund;
pub mod service;

pub use confirmation::ConfirmationCodeGenerator;
pub use fare::{FareCalculator, FareQuote};
pub use lifecycle::BookingLifecycle;
pub use refund::{RefundPolicy, RefundQuote, RefundTier};
pub use service::{BookingDraft, BookingError, BookingService, CancellationOutcome};
