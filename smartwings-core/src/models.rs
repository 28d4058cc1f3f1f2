use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smartwings_shared::Masked;
use std::fmt;
use std::hash::{Hash, Hasher};
use uuid::Uuid;

/// Booking status in the lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
    Completed,
    NoShow,
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::Cancelled => "CANCELLED",
            BookingStatus::Completed => "COMPLETED",
            BookingStatus::NoShow => "NO_SHOW",
        };
        f.write_str(s)
    }
}

/// Payment status, tracked independently of the booking status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
    Refunded,
    PartiallyRefunded,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Processing => "PROCESSING",
            PaymentStatus::Completed => "COMPLETED",
            PaymentStatus::Failed => "FAILED",
            PaymentStatus::Refunded => "REFUNDED",
            PaymentStatus::PartiallyRefunded => "PARTIALLY_REFUNDED",
        };
        f.write_str(s)
    }
}

/// Read-only view of the flight a booking is for.
///
/// The booking never owns the schedule; whoever loads the booking resolves
/// the flight and hands over its departure time here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FlightRef {
    pub id: Uuid,
    pub flight_number: String,
    pub departure_time: DateTime<Utc>,
}

impl FlightRef {
    pub fn new(flight_number: impl Into<String>, departure_time: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            flight_number: flight_number.into(),
            departure_time,
        }
    }
}

/// A reservation on one flight for one or more passengers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub confirmation_code: String,
    pub flight: FlightRef,
    pub user_id: Option<Uuid>,
    pub contact_email: String,
    pub contact_phone: Option<String>,
    /// Fare tier as entered by the customer (economy, business, ...)
    pub travel_class: String,
    pub num_passengers: u32,
    pub total_amount: Decimal,
    #[serde(default)]
    pub status: BookingStatus,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    pub payment_method: Option<String>,
    pub payment_reference: Option<String>,
    pub special_requests: Option<String>,
    pub booking_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub passengers: Vec<Passenger>,
}

impl Booking {
    pub fn new(
        confirmation_code: String,
        flight: FlightRef,
        contact_email: String,
        travel_class: String,
        num_passengers: u32,
        total_amount: Decimal,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            confirmation_code,
            flight,
            user_id: None,
            contact_email,
            contact_phone: None,
            travel_class,
            num_passengers,
            total_amount,
            status: BookingStatus::Pending,
            payment_status: PaymentStatus::Pending,
            payment_method: None,
            payment_reference: None,
            special_requests: None,
            booking_date: now,
            created_at: now,
            updated_at: now,
            passengers: Vec::new(),
        }
    }

    pub fn departure_time(&self) -> DateTime<Utc> {
        self.flight.departure_time
    }

    /// Attach a passenger, binding it to this booking
    pub fn add_passenger(&mut self, mut passenger: Passenger) {
        passenger.booking_id = Some(self.id);
        self.passengers.push(passenger);
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

// Bookings are identified by their confirmation code.
impl PartialEq for Booking {
    fn eq(&self, other: &Self) -> bool {
        self.confirmation_code == other.confirmation_code
    }
}

impl Eq for Booking {}

impl Hash for Booking {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.confirmation_code.hash(state);
    }
}

impl fmt::Display for Booking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Booking {{ id: {}, confirmation_code: {}, contact_email: {}, num_passengers: {}, total_amount: {}, status: {} }}",
            self.id,
            self.confirmation_code,
            self.contact_email,
            self.num_passengers,
            self.total_amount,
            self.status
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Passenger {
    pub id: Uuid,
    pub booking_id: Option<Uuid>,
    pub title: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: String,
    pub nationality: Option<String>,
    pub passport_number: Option<Masked<String>>,
    pub passport_expiry: Option<NaiveDate>,
    pub seat_number: Option<String>,
    pub special_requests: Option<String>,
}

impl Passenger {
    pub fn new(
        title: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        date_of_birth: NaiveDate,
        gender: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            booking_id: None,
            title: title.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            date_of_birth,
            gender: gender.into(),
            nationality: None,
            passport_number: None,
            passport_expiry: None,
            seat_number: None,
            special_requests: None,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {} {}", self.title, self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    #[default]
    User,
    Admin,
    Staff,
}

/// Account that owns bookings (linked through `Booking::user_id`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: Masked<String>,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl User {
    pub fn new(
        email: impl Into<String>,
        password_hash: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            password_hash: Masked::new(password_hash.into()),
            first_name: first_name.into(),
            last_name: last_name.into(),
            phone: None,
            role: UserRole::User,
            is_active: true,
            created_at: now,
        }
    }
}
