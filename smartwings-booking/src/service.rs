use crate::confirmation::ConfirmationCodeGenerator;
use crate::fare::FareCalculator;
use crate::lifecycle::BookingLifecycle;
use crate::refund::{RefundPolicy, RefundQuote};
use rust_decimal::Decimal;
use serde::Deserialize;
use smartwings_core::repository::BookingRepository;
use smartwings_core::{Booking, Clock, CoreError, FlightRef, Passenger, PaymentStatus};
use smartwings_shared::models::events::{
    BookingCancelledEvent, BookingConfirmedEvent, BookingCreatedEvent,
};
use smartwings_store::Config;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

const MAX_CODE_ATTEMPTS: usize = 5;

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("Booking not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Could not allocate a unique confirmation code after {0} attempts")]
    DuplicateCode(usize),

    #[error("Repository error: {0}")]
    Repository(String),
}

fn repo_err(err: Box<dyn std::error::Error + Send + Sync>) -> BookingError {
    BookingError::Repository(err.to_string())
}

/// What a customer submits before a confirmation code exists
#[derive(Debug, Clone, Deserialize)]
pub struct BookingDraft {
    pub flight: FlightRef,
    pub user_id: Option<Uuid>,
    pub contact_email: String,
    pub contact_phone: Option<String>,
    pub travel_class: String,
    pub fare_per_passenger: Decimal,
    pub passengers: Vec<Passenger>,
    pub payment_method: Option<String>,
    pub special_requests: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CancellationOutcome {
    pub booking: Booking,
    pub refund: RefundQuote,
    pub event: BookingCancelledEvent,
}

/// Drives the booking lifecycle over a repository
pub struct BookingService {
    repo: Arc<dyn BookingRepository>,
    clock: Arc<dyn Clock>,
    lifecycle: BookingLifecycle,
    codes: ConfirmationCodeGenerator,
    fares: FareCalculator,
}

impl BookingService {
    pub fn new(repo: Arc<dyn BookingRepository>, clock: Arc<dyn Clock>, config: &Config) -> Self {
        Self {
            repo,
            clock,
            lifecycle: BookingLifecycle::new(RefundPolicy::from(&config.refund)),
            codes: ConfirmationCodeGenerator::new(
                config.business_rules.confirmation_code_prefix.clone(),
            ),
            fares: FareCalculator::new(config.business_rules.tax_rate),
        }
    }

    /// Price, validate and store a new PENDING booking
    pub async fn create_booking(
        &self,
        draft: BookingDraft,
    ) -> Result<(Booking, BookingCreatedEvent), BookingError> {
        let now = self.clock.now();
        let passengers = u32::try_from(draft.passengers.len())
            .map_err(|_| CoreError::ValidationError("Too many passengers".to_string()))?;
        let fare = self.fares.quote(draft.fare_per_passenger, passengers);
        let code = self.allocate_code().await?;

        let mut booking = Booking::new(
            code,
            draft.flight,
            draft.contact_email,
            draft.travel_class,
            passengers,
            fare.total,
            now,
        );
        booking.user_id = draft.user_id;
        booking.contact_phone = draft.contact_phone;
        booking.payment_method = draft.payment_method;
        booking.special_requests = draft.special_requests;
        for passenger in draft.passengers {
            booking.add_passenger(passenger);
        }

        booking.validate()?;
        self.repo.save_booking(&booking).await.map_err(repo_err)?;
        info!(code = %booking.confirmation_code, total = %booking.total_amount, "booking created");

        let event = BookingCreatedEvent {
            booking_id: booking.id,
            confirmation_code: booking.confirmation_code.clone(),
            flight_id: booking.flight.id,
            user_id: booking.user_id,
            total_amount: booking.total_amount,
            timestamp: now.timestamp(),
        };
        Ok((booking, event))
    }

    /// Mark a booking paid and confirmed. Callers validate the payment first.
    pub async fn confirm(
        &self,
        confirmation_code: &str,
        payment_reference: Option<String>,
    ) -> Result<(Booking, BookingConfirmedEvent), BookingError> {
        let now = self.clock.now();
        let lifecycle = &self.lifecycle;
        let booking = self
            .modify(confirmation_code, Box::new(move |booking: &mut Booking| {
                lifecycle.confirm(booking);
                if payment_reference.is_some() {
                    booking.payment_reference = payment_reference;
                }
                booking.touch(now);
            }))
            .await?;
        info!(code = %booking.confirmation_code, "booking confirmed");

        let event = BookingConfirmedEvent {
            booking_id: booking.id,
            confirmation_code: booking.confirmation_code.clone(),
            payment_reference: booking.payment_reference.clone(),
            total_amount: booking.total_amount,
            timestamp: now.timestamp(),
        };
        Ok((booking, event))
    }

    /// Cancel a booking and record the refund owed at this instant
    pub async fn cancel(
        &self,
        confirmation_code: &str,
    ) -> Result<CancellationOutcome, BookingError> {
        let now = self.clock.now();
        let lifecycle = &self.lifecycle;
        let mut refund = RefundQuote::none(0);
        let refund_slot = &mut refund;

        let booking = self
            .modify(confirmation_code, Box::new(move |booking: &mut Booking| {
                // Quote first: once cancelled the booking is no longer refundable
                let quote = lifecycle.quote_refund(booking, now);
                lifecycle.cancel(booking);
                if quote.amount > Decimal::ZERO {
                    booking.payment_status = if quote.amount >= booking.total_amount {
                        PaymentStatus::Refunded
                    } else {
                        PaymentStatus::PartiallyRefunded
                    };
                }
                booking.touch(now);
                *refund_slot = quote;
            }))
            .await?;
        info!(
            code = %booking.confirmation_code,
            refund = %refund.amount,
            payment_status = %booking.payment_status,
            "booking cancelled"
        );

        let event = BookingCancelledEvent {
            booking_id: booking.id,
            confirmation_code: booking.confirmation_code.clone(),
            refund_amount: refund.amount,
            hours_until_departure: refund.hours_until_departure,
            timestamp: now.timestamp(),
        };
        Ok(CancellationOutcome { booking, refund, event })
    }

    pub async fn refund_quote(&self, confirmation_code: &str) -> Result<RefundQuote, BookingError> {
        let booking = self.load(confirmation_code).await?;
        Ok(self.lifecycle.quote_refund(&booking, self.clock.now()))
    }

    pub async fn can_modify(&self, confirmation_code: &str) -> Result<bool, BookingError> {
        let booking = self.load(confirmation_code).await?;
        Ok(self.lifecycle.can_be_modified(&booking, self.clock.now()))
    }

    pub async fn bookings_for_user(&self, user_id: Uuid) -> Result<Vec<Booking>, BookingError> {
        self.repo.list_bookings_for_user(user_id).await.map_err(repo_err)
    }

    async fn modify<'a>(
        &'a self,
        confirmation_code: &'a str,
        change: Box<dyn FnOnce(&mut Booking) + Send + 'a>,
    ) -> Result<Booking, BookingError> {
        self.repo
            .modify_booking(confirmation_code, change)
            .await
            .map_err(repo_err)?
            .ok_or_else(|| BookingError::NotFound(confirmation_code.to_string()))
    }

    async fn load(&self, confirmation_code: &str) -> Result<Booking, BookingError> {
        self.repo
            .get_booking(confirmation_code)
            .await
            .map_err(repo_err)?
            .ok_or_else(|| BookingError::NotFound(confirmation_code.to_string()))
    }

    async fn allocate_code(&self) -> Result<String, BookingError> {
        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = self.codes.generate();
            if !self.repo.exists(&code).await.map_err(repo_err)? {
                return Ok(code);
            }
            tracing::debug!(code = %code, "confirmation code collision, retrying");
        }
        Err(BookingError::DuplicateCode(MAX_CODE_ATTEMPTS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
    use rust_decimal_macros::dec;
    use smartwings_core::{BookingStatus, FixedClock};
    use smartwings_store::InMemoryBookingRepository;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, 3, 6, 0, 0).unwrap()
    }

    fn service() -> BookingService {
        BookingService::new(
            Arc::new(InMemoryBookingRepository::new()),
            Arc::new(FixedClock::at(now())),
            &Config::default(),
        )
    }

    fn draft(departs_in: Duration) -> BookingDraft {
        let dob = NaiveDate::from_ymd_opt(1979, 12, 1).unwrap();
        BookingDraft {
            flight: FlightRef::new("SW102", now() + departs_in),
            user_id: None,
            contact_email: "lee@example.com".to_string(),
            contact_phone: None,
            travel_class: "economy".to_string(),
            fare_per_passenger: dec!(349),
            passengers: vec![Passenger::new("Mx", "Lee", "Park", dob, "X")],
            payment_method: Some("card".to_string()),
            special_requests: None,
        }
    }

    #[tokio::test]
    async fn test_create_prices_and_stores_pending_booking() {
        let svc = service();
        let (booking, event) = svc.create_booking(draft(Duration::days(10))).await.unwrap();

        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.num_passengers, 1);
        // 349 + 52 tax (52.35 rounded)
        assert_eq!(booking.total_amount, dec!(401));
        assert!(booking.confirmation_code.starts_with("SW"));
        assert_eq!(event.confirmation_code, booking.confirmation_code);
        assert_eq!(event.timestamp, now().timestamp());
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_draft() {
        let svc = service();
        let mut bad = draft(Duration::days(10));
        bad.contact_email = "nobody".to_string();
        bad.passengers.clear();

        let err = svc.create_booking(bad).await.unwrap_err();
        assert!(matches!(err, BookingError::Core(CoreError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_unknown_code_is_not_found() {
        let svc = service();
        assert!(matches!(svc.cancel("SWNOPE00").await, Err(BookingError::NotFound(_))));
        assert!(matches!(svc.refund_quote("SWNOPE00").await, Err(BookingError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_cancel_records_partial_refund() {
        let svc = service();
        let (booking, _) = svc.create_booking(draft(Duration::hours(49))).await.unwrap();
        svc.confirm(&booking.confirmation_code, Some("pay_123".to_string())).await.unwrap();

        let outcome = svc.cancel(&booking.confirmation_code).await.unwrap();
        assert_eq!(outcome.refund.amount, dec!(300.75));
        assert_eq!(outcome.booking.status, BookingStatus::Cancelled);
        assert_eq!(outcome.booking.payment_status, PaymentStatus::PartiallyRefunded);
        assert_eq!(outcome.event.hours_until_departure, 49);
    }

    #[tokio::test]
    async fn test_cancel_pending_booking_refunds_nothing() {
        let svc = service();
        let (booking, _) = svc.create_booking(draft(Duration::days(10))).await.unwrap();

        let outcome = svc.cancel(&booking.confirmation_code).await.unwrap();
        assert_eq!(outcome.refund.amount, Decimal::ZERO);
        assert_eq!(outcome.booking.status, BookingStatus::Cancelled);
        assert_eq!(outcome.booking.payment_status, PaymentStatus::Pending);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_cancels_refund_once() {
        let svc = Arc::new(service());
        let (booking, _) = svc.create_booking(draft(Duration::days(10))).await.unwrap();
        let code = booking.confirmation_code;
        svc.confirm(&code, None).await.unwrap();

        let tasks: Vec<_> = (0..20)
            .map(|_| {
                let svc = svc.clone();
                let code = code.clone();
                tokio::spawn(async move { svc.cancel(&code).await.unwrap() })
            })
            .collect();

        let mut refunded = 0;
        for task in tasks {
            let outcome = task.await.unwrap();
            assert_eq!(outcome.booking.status, BookingStatus::Cancelled);
            if outcome.refund.cancellable {
                refunded += 1;
            }
        }
        assert_eq!(refunded, 1);

        let stored = svc.refund_quote(&code).await.unwrap();
        assert!(!stored.cancellable);
    }
}
