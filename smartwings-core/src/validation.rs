//! Field constraints for bookings, passengers and users.
//!
//! Every violated constraint is reported, not just the first one.

use crate::models::{Booking, Passenger, User};
use crate::{CoreError, CoreResult};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

pub const MAX_CONFIRMATION_CODE_LEN: usize = 20;
pub const MAX_PHONE_LEN: usize = 20;
pub const MAX_SPECIAL_REQUESTS_LEN: usize = 1000;
pub const MIN_PASSWORD_LEN: usize = 8;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Accumulates constraint violations for one record
#[derive(Debug, Default)]
struct Violations(Vec<String>);

impl Violations {
    fn require(&mut self, value: &str, message: &str) {
        if value.trim().is_empty() {
            self.0.push(message.to_string());
        }
    }

    fn max_len(&mut self, value: Option<&str>, max: usize, message: &str) {
        if value.is_some_and(|v| v.chars().count() > max) {
            self.0.push(message.to_string());
        }
    }

    fn check(&mut self, ok: bool, message: &str) {
        if !ok {
            self.0.push(message.to_string());
        }
    }

    fn finish(self, record: &str) -> CoreResult<()> {
        if self.0.is_empty() {
            return Ok(());
        }
        tracing::warn!(record, violations = ?self.0, "validation rejected record");
        Err(CoreError::ValidationError(self.0.join("; ")))
    }
}

impl Booking {
    pub fn validate(&self) -> CoreResult<()> {
        let mut v = Violations::default();

        v.require(&self.confirmation_code, "Confirmation code is required");
        v.max_len(
            Some(self.confirmation_code.as_str()),
            MAX_CONFIRMATION_CODE_LEN,
            "Confirmation code must be at most 20 characters",
        );

        if self.contact_email.trim().is_empty() {
            v.0.push("Contact email is required".to_string());
        } else {
            v.check(is_valid_email(&self.contact_email), "Invalid email format");
        }

        v.max_len(
            self.contact_phone.as_deref(),
            MAX_PHONE_LEN,
            "Contact phone must be at most 20 characters",
        );
        v.require(&self.travel_class, "Travel class is required");
        v.check(self.num_passengers >= 1, "Number of passengers must be at least 1");
        v.check(self.total_amount > Decimal::ZERO, "Total amount must be greater than 0");
        v.max_len(
            self.special_requests.as_deref(),
            MAX_SPECIAL_REQUESTS_LEN,
            "Special requests must be at most 1000 characters",
        );

        for (idx, passenger) in self.passengers.iter().enumerate() {
            if let Err(CoreError::ValidationError(msg)) = passenger.validate() {
                v.0.push(format!("Passenger {}: {}", idx + 1, msg));
            }
        }

        v.finish("booking")
    }
}

impl Passenger {
    pub fn validate(&self) -> CoreResult<()> {
        let mut v = Violations::default();
        v.require(&self.title, "Title is required");
        v.require(&self.first_name, "First name is required");
        v.require(&self.last_name, "Last name is required");
        v.require(&self.gender, "Gender is required");
        v.finish("passenger")
    }
}

impl User {
    pub fn validate(&self) -> CoreResult<()> {
        let mut v = Violations::default();

        if self.email.trim().is_empty() {
            v.0.push("Email is required".to_string());
        } else {
            v.check(is_valid_email(&self.email), "Invalid email format");
        }

        let password = self.password_hash.expose();
        v.require(password, "Password is required");
        v.check(
            password.chars().count() >= MIN_PASSWORD_LEN,
            "Password must be at least 8 characters",
        );
        v.require(&self.first_name, "First name is required");
        v.require(&self.last_name, "Last name is required");
        v.finish("user")
    }
}
