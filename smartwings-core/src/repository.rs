use async_trait::async_trait;
use uuid::Uuid;
use crate::models::Booking;

/// Repository trait for booking storage.
///
/// Lifecycle changes go through `modify_booking`, which applies the change
/// while the implementation holds the booking exclusively. Reading with
/// `get_booking` and writing back later is not atomic.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn save_booking(
        &self,
        booking: &Booking,
    ) -> Result<Uuid, Box<dyn std::error::Error + Send + Sync>>;

    async fn get_booking(
        &self,
        confirmation_code: &str,
    ) -> Result<Option<Booking>, Box<dyn std::error::Error + Send + Sync>>;

    /// Apply `change` to the stored booking and return the result,
    /// or `None` when no booking has this code.
    async fn modify_booking<'a>(
        &'a self,
        confirmation_code: &'a str,
        change: Box<dyn for<'b> FnOnce(&'b mut Booking) + Send + 'a>,
    ) -> Result<Option<Booking>, Box<dyn std::error::Error + Send + Sync>>;

    async fn list_bookings_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<Booking>, Box<dyn std::error::Error + Send + Sync>>;

    async fn exists(
        &self,
        confirmation_code: &str,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;
}
