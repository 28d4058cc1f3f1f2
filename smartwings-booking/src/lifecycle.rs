use crate::refund::{RefundPolicy, RefundQuote};
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use smartwings_core::{Booking, BookingStatus, PaymentStatus};

/// Status transitions and refund rules for a single booking.
///
/// Every time-dependent check takes `now` explicitly. The transitions are
/// permissive: `confirm` and `cancel` apply from any status.
#[derive(Debug, Clone, Default)]
pub struct BookingLifecycle {
    policy: RefundPolicy,
}

impl BookingLifecycle {
    pub fn new(policy: RefundPolicy) -> Self {
        Self { policy }
    }

    /// Confirmed and departing strictly later than the cancellation cutoff
    pub fn can_be_cancelled(&self, booking: &Booking, now: DateTime<Utc>) -> bool {
        booking.status == BookingStatus::Confirmed
            && departs_after(booking, now, self.policy.cancellation_cutoff())
    }

    /// Confirmed and departing strictly later than the modification cutoff
    pub fn can_be_modified(&self, booking: &Booking, now: DateTime<Utc>) -> bool {
        booking.status == BookingStatus::Confirmed
            && departs_after(booking, now, self.policy.modification_cutoff())
    }

    /// Transition: any → Confirmed, payment → Completed
    pub fn confirm(&self, booking: &mut Booking) {
        booking.status = BookingStatus::Confirmed;
        booking.payment_status = PaymentStatus::Completed;
    }

    /// Transition: any → Cancelled. Payment status is left alone.
    pub fn cancel(&self, booking: &mut Booking) {
        booking.status = BookingStatus::Cancelled;
    }

    /// Whole hours until departure, truncated
    pub fn hours_until_departure(&self, booking: &Booking, now: DateTime<Utc>) -> i64 {
        (booking.departure_time() - now).num_hours()
    }

    pub fn quote_refund(&self, booking: &Booking, now: DateTime<Utc>) -> RefundQuote {
        let hours = self.hours_until_departure(booking, now);
        if !self.can_be_cancelled(booking, now) {
            return RefundQuote::none(hours);
        }

        let rate = self.policy.rate_for(hours);
        let amount = booking.total_amount * rate;
        tracing::debug!(
            code = %booking.confirmation_code,
            hours,
            rate = %rate,
            amount = %amount,
            "refund tier selected"
        );

        RefundQuote {
            cancellable: true,
            hours_until_departure: hours,
            rate,
            amount,
        }
    }

    pub fn calculate_refund_amount(&self, booking: &Booking, now: DateTime<Utc>) -> Decimal {
        self.quote_refund(booking, now).amount
    }
}

// A limit past the end of the calendar is never reached.
fn departs_after(booking: &Booking, now: DateTime<Utc>, cutoff: Duration) -> bool {
    now.checked_add_signed(cutoff)
        .is_some_and(|limit| booking.departure_time() > limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use smartwings_core::FlightRef;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 14, 8, 30, 0).unwrap()
    }

    fn booking_departing_in(offset: Duration, status: BookingStatus) -> Booking {
        let mut booking = Booking::new(
            "SW7QX2LM".to_string(),
            FlightRef::new("SW101", now() + offset),
            "traveller@example.com".to_string(),
            "economy".to_string(),
            2,
            dec!(1000.00),
            now(),
        );
        booking.status = status;
        booking
    }

    fn confirmed_in_hours(hours: i64) -> Booking {
        booking_departing_in(Duration::hours(hours), BookingStatus::Confirmed)
    }

    #[test]
    fn test_only_confirmed_bookings_are_cancellable_or_modifiable() {
        let lifecycle = BookingLifecycle::default();
        for status in [
            BookingStatus::Pending,
            BookingStatus::Cancelled,
            BookingStatus::Completed,
            BookingStatus::NoShow,
        ] {
            let booking = booking_departing_in(Duration::days(30), status);
            assert!(!lifecycle.can_be_cancelled(&booking, now()), "{status}");
            assert!(!lifecycle.can_be_modified(&booking, now()), "{status}");
            assert_eq!(lifecycle.calculate_refund_amount(&booking, now()), Decimal::ZERO);
        }
    }

    #[test]
    fn test_cancellation_cutoff_is_strict() {
        let lifecycle = BookingLifecycle::default();
        assert!(!lifecycle.can_be_cancelled(&confirmed_in_hours(24), now()));
        let just_outside = booking_departing_in(
            Duration::hours(24) + Duration::seconds(1),
            BookingStatus::Confirmed,
        );
        assert!(lifecycle.can_be_cancelled(&just_outside, now()));
    }

    #[test]
    fn test_modification_cutoff_is_strict() {
        let lifecycle = BookingLifecycle::default();
        assert!(!lifecycle.can_be_modified(&confirmed_in_hours(2), now()));
        assert!(lifecycle.can_be_modified(&confirmed_in_hours(3), now()));
        // Modifiable but no longer cancellable
        assert!(!lifecycle.can_be_cancelled(&confirmed_in_hours(3), now()));
    }

    #[test]
    fn test_refund_tiers() {
        let lifecycle = BookingLifecycle::default();
        let cases = [
            (25, dec!(500.00)),
            (48, dec!(500.00)),
            (49, dec!(750.00)),
            (168, dec!(750.00)),
            (169, dec!(900.00)),
        ];
        for (hours, expected) in cases {
            let refund = lifecycle.calculate_refund_amount(&confirmed_in_hours(hours), now());
            assert_eq!(refund, expected, "departure in {hours}h");
        }
    }

    #[test]
    fn test_hours_are_truncated_not_rounded() {
        let lifecycle = BookingLifecycle::default();
        // 168h 59m counts as 168 whole hours: 75% tier
        let booking = booking_departing_in(
            Duration::hours(168) + Duration::minutes(59),
            BookingStatus::Confirmed,
        );
        assert_eq!(lifecycle.hours_until_departure(&booking, now()), 168);
        assert_eq!(lifecycle.calculate_refund_amount(&booking, now()), dec!(750.00));
    }

    #[test]
    fn test_within_cutoff_refunds_nothing() {
        let lifecycle = BookingLifecycle::default();
        let quote = lifecycle.quote_refund(&confirmed_in_hours(10), now());
        assert!(!quote.cancellable);
        assert_eq!(quote.hours_until_departure, 10);
        assert_eq!(quote.amount, Decimal::ZERO);
    }

    #[test]
    fn test_refund_is_exact_decimal() {
        let lifecycle = BookingLifecycle::default();
        let mut booking = confirmed_in_hours(100);
        booking.total_amount = dec!(333.33);
        // 333.33 * 0.75 with no binary rounding
        assert_eq!(lifecycle.calculate_refund_amount(&booking, now()), dec!(249.9975));
    }

    #[test]
    fn test_confirm_then_cancel_keeps_payment_completed() {
        let lifecycle = BookingLifecycle::default();
        let mut booking = booking_departing_in(Duration::days(3), BookingStatus::Pending);

        lifecycle.confirm(&mut booking);
        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert_eq!(booking.payment_status, PaymentStatus::Completed);

        lifecycle.cancel(&mut booking);
        assert_eq!(booking.status, BookingStatus::Cancelled);
        assert_eq!(booking.payment_status, PaymentStatus::Completed);
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let lifecycle = BookingLifecycle::default();
        let mut booking = booking_departing_in(Duration::days(3), BookingStatus::Confirmed);
        lifecycle.cancel(&mut booking);
        assert_eq!(booking.status, BookingStatus::Cancelled);
        lifecycle.cancel(&mut booking);
        assert_eq!(booking.status, BookingStatus::Cancelled);
    }

    #[test]
    fn test_end_of_calendar_does_not_panic() {
        let lifecycle = BookingLifecycle::default();
        let late = DateTime::<Utc>::MAX_UTC - Duration::hours(1);
        let mut booking = confirmed_in_hours(30);
        booking.flight.departure_time = DateTime::<Utc>::MAX_UTC;

        assert!(!lifecycle.can_be_cancelled(&booking, late));
        assert!(!lifecycle.can_be_modified(&booking, late));
        assert_eq!(lifecycle.calculate_refund_amount(&booking, late), Decimal::ZERO);
    }

    #[test]
    fn test_saturated_cutoff_never_cancellable() {
        let lifecycle = BookingLifecycle::new(RefundPolicy::new(i64::MAX, 2, vec![], dec!(0.50)));
        assert!(!lifecycle.can_be_cancelled(&confirmed_in_hours(10_000), now()));
        assert_eq!(
            lifecycle.calculate_refund_amount(&confirmed_in_hours(10_000), now()),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_custom_policy() {
        let policy = RefundPolicy::new(72, 6, vec![], dec!(0.25));
        let lifecycle = BookingLifecycle::new(policy);
        assert!(!lifecycle.can_be_cancelled(&confirmed_in_hours(72), now()));
        assert!(!lifecycle.can_be_modified(&confirmed_in_hours(6), now()));
        assert_eq!(
            lifecycle.calculate_refund_amount(&confirmed_in_hours(500), now()),
            dec!(250.00)
        );
    }
}
