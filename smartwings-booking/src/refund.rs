use chrono::Duration;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smartwings_store::app_config::RefundRules;

/// One step of the refund schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundTier {
    /// Applies when whole hours until departure is strictly greater than this
    pub min_hours: i64,
    pub rate: Decimal,
}

/// Cancellation windows plus the tiered refund schedule.
///
/// Default: cancellable more than 24h out, modifiable more than 2h out,
/// 90% refund beyond 168h, 75% beyond 48h, 50% otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct RefundPolicy {
    cancellation_cutoff: Duration,
    modification_cutoff: Duration,
    // Sorted by min_hours, highest first
    tiers: Vec<RefundTier>,
    fallback_rate: Decimal,
}

impl RefundPolicy {
    pub fn new(
        cancellation_cutoff_hours: i64,
        modification_cutoff_hours: i64,
        mut tiers: Vec<RefundTier>,
        fallback_rate: Decimal,
    ) -> Self {
        tiers.sort_by(|a, b| b.min_hours.cmp(&a.min_hours));
        Self {
            cancellation_cutoff: cutoff(cancellation_cutoff_hours),
            modification_cutoff: cutoff(modification_cutoff_hours),
            tiers,
            fallback_rate,
        }
    }

    pub fn cancellation_cutoff(&self) -> Duration {
        self.cancellation_cutoff
    }

    pub fn modification_cutoff(&self) -> Duration {
        self.modification_cutoff
    }

    pub fn tiers(&self) -> &[RefundTier] {
        &self.tiers
    }

    /// First tier whose threshold is strictly below `hours_until_departure`
    pub fn rate_for(&self, hours_until_departure: i64) -> Decimal {
        self.tiers
            .iter()
            .find(|tier| hours_until_departure > tier.min_hours)
            .map(|tier| tier.rate)
            .unwrap_or(self.fallback_rate)
    }
}

// Out-of-range cutoffs saturate: the window never opens.
fn cutoff(hours: i64) -> Duration {
    Duration::try_hours(hours).unwrap_or(Duration::MAX)
}

impl Default for RefundPolicy {
    fn default() -> Self {
        Self::from(&RefundRules::default())
    }
}

impl From<&RefundRules> for RefundPolicy {
    fn from(rules: &RefundRules) -> Self {
        Self::new(
            rules.cancellation_cutoff_hours,
            rules.modification_cutoff_hours,
            rules
                .tiers
                .iter()
                .map(|t| RefundTier { min_hours: t.min_hours, rate: t.rate })
                .collect(),
            rules.fallback_rate,
        )
    }
}

/// Refund breakdown for one booking at one instant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefundQuote {
    pub cancellable: bool,
    pub hours_until_departure: i64,
    /// Rate applied; zero when the booking cannot be cancelled
    pub rate: Decimal,
    pub amount: Decimal,
}

impl RefundQuote {
    pub fn none(hours_until_departure: i64) -> Self {
        Self {
            cancellable: false,
            hours_until_departure,
            rate: Decimal::ZERO,
            amount: Decimal::ZERO,
        }
    }
}
