use async_trait::async_trait;
use smartwings_core::repository::BookingRepository;
use smartwings_core::Booking;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Booking store keyed by confirmation code.
///
/// `modify_booking` holds the write lock while the change runs, so
/// concurrent lifecycle calls on one booking never lose an update.
#[derive(Default)]
pub struct InMemoryBookingRepository {
    bookings: RwLock<HashMap<String, Booking>>,
}

impl InMemoryBookingRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookingRepository for InMemoryBookingRepository {
    async fn save_booking(
        &self,
        booking: &Booking,
    ) -> Result<Uuid, Box<dyn std::error::Error + Send + Sync>> {
        let mut bookings = self.bookings.write().await;
        if bookings.contains_key(&booking.confirmation_code) {
            return Err(format!(
                "Confirmation code already in use: {}",
                booking.confirmation_code
            )
            .into());
        }
        bookings.insert(booking.confirmation_code.clone(), booking.clone());
        tracing::debug!(code = %booking.confirmation_code, "booking stored");
        Ok(booking.id)
    }

    async fn get_booking(
        &self,
        confirmation_code: &str,
    ) -> Result<Option<Booking>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.bookings.read().await.get(confirmation_code).cloned())
    }

    async fn modify_booking<'a>(
        &'a self,
        confirmation_code: &'a str,
        change: Box<dyn for<'b> FnOnce(&'b mut Booking) + Send + 'a>,
    ) -> Result<Option<Booking>, Box<dyn std::error::Error + Send + Sync>> {
        let mut bookings = self.bookings.write().await;
        Ok(bookings.get_mut(confirmation_code).map(|booking| {
            change(booking);
            booking.clone()
        }))
    }

    async fn list_bookings_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<Booking>, Box<dyn std::error::Error + Send + Sync>> {
        let bookings = self.bookings.read().await;
        let mut owned: Vec<Booking> = bookings
            .values()
            .filter(|b| b.user_id == Some(user_id))
            .cloned()
            .collect();
        owned.sort_by_key(|b| b.booking_date);
        Ok(owned)
    }

    async fn exists(
        &self,
        confirmation_code: &str,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.bookings.read().await.contains_key(confirmation_code))
    }
}
