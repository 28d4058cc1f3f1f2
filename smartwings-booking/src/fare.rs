use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Price breakdown shown before payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FareQuote {
    pub passengers: u32,
    pub base_fare: Decimal,
    pub taxes: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone)]
pub struct FareCalculator {
    tax_rate: Decimal,
}

impl FareCalculator {
    pub fn new(tax_rate: Decimal) -> Self {
        Self { tax_rate }
    }

    /// Taxes are rounded to whole currency units
    pub fn quote(&self, fare_per_passenger: Decimal, passengers: u32) -> FareQuote {
        let base_fare = fare_per_passenger * Decimal::from(passengers);
        let taxes = (base_fare * self.tax_rate)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        FareQuote {
            passengers,
            base_fare,
            taxes,
            total: base_fare + taxes,
        }
    }
}
