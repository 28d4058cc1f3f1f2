use rust_decimal::Decimal;
use uuid::Uuid;

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct BookingCreatedEvent {
    pub booking_id: Uuid,
    pub confirmation_code: String,
    pub flight_id: Uuid,
    pub user_id: Option<Uuid>,
    pub total_amount: Decimal,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct BookingConfirmedEvent {
    pub booking_id: Uuid,
    pub confirmation_code: String,
    pub payment_reference: Option<String>,
    pub total_amount: Decimal,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct BookingCancelledEvent {
    pub booking_id: Uuid,
    pub confirmation_code: String,
    pub refund_amount: Decimal,
    pub hours_until_departure: i64,
    pub timestamp: i64,
}
