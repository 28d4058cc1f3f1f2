use rust_decimal::Decimal;
use serde::Deserialize;
use std::env;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub business_rules: BusinessRules,
    #[serde(default)]
    pub refund: RefundRules,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct BusinessRules {
    #[serde(default = "default_tax_rate")]
    pub tax_rate: Decimal,
    #[serde(default = "default_code_prefix")]
    pub confirmation_code_prefix: String,
}

fn default_tax_rate() -> Decimal { Decimal::new(15, 2) }
fn default_code_prefix() -> String { "SW".to_string() }

impl Default for BusinessRules {
    fn default() -> Self {
        Self {
            tax_rate: default_tax_rate(),
            confirmation_code_prefix: default_code_prefix(),
        }
    }
}

/// Cancellation windows and refund tiers, all in whole hours before departure
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct RefundRules {
    #[serde(default = "default_cancellation_cutoff")]
    pub cancellation_cutoff_hours: i64,
    #[serde(default = "default_modification_cutoff")]
    pub modification_cutoff_hours: i64,
    /// Tier applies when hours until departure is strictly greater than `min_hours`
    #[serde(default = "default_tiers")]
    pub tiers: Vec<RefundTierConfig>,
    #[serde(default = "default_fallback_rate")]
    pub fallback_rate: Decimal,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct RefundTierConfig {
    pub min_hours: i64,
    pub rate: Decimal,
}

fn default_cancellation_cutoff() -> i64 { 24 }
fn default_modification_cutoff() -> i64 { 2 }
fn default_fallback_rate() -> Decimal { Decimal::new(50, 2) }

fn default_tiers() -> Vec<RefundTierConfig> {
    vec![
        RefundTierConfig { min_hours: 168, rate: Decimal::new(90, 2) },
        RefundTierConfig { min_hours: 48, rate: Decimal::new(75, 2) },
    ]
}

impl Default for RefundRules {
    fn default() -> Self {
        Self {
            cancellation_cutoff_hours: default_cancellation_cutoff(),
            modification_cutoff_hours: default_modification_cutoff(),
            tiers: default_tiers(),
            fallback_rate: default_fallback_rate(),
        }
    }
}

/// Ten years; anything longer is a typo, not a policy
pub const MAX_CUTOFF_HOURS: i64 = 24 * 366 * 10;

impl RefundRules {
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        let rates = self.tiers.iter().map(|t| t.rate).chain(std::iter::once(self.fallback_rate));
        for rate in rates {
            if rate < Decimal::ZERO || rate > Decimal::ONE {
                return Err(config::ConfigError::Message(format!(
                    "refund rate {} is outside 0..=1",
                    rate
                )));
            }
        }
        for hours in [self.cancellation_cutoff_hours, self.modification_cutoff_hours] {
            if !(0..=MAX_CUTOFF_HOURS).contains(&hours) {
                return Err(config::ConfigError::Message(format!(
                    "refund cutoff {}h is outside 0..={}",
                    hours, MAX_CUTOFF_HOURS
                )));
            }
        }
        Ok(())
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("config")
    }

    pub fn load_from(dir: impl AsRef<Path>) -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        Self::load_layered(dir, &run_mode, Self::environment())
    }

    /// Environment overrides, eg.. `SMARTWINGS__REFUND__FALLBACK_RATE=0.4`
    pub fn environment() -> config::Environment {
        config::Environment::with_prefix("SMARTWINGS").separator("__")
    }

    pub fn load_layered(
        dir: impl AsRef<Path>,
        run_mode: &str,
        environment: config::Environment,
    ) -> Result<Self, config::ConfigError> {
        let dir = dir.as_ref();
        let file = |name: &str| dir.join(name).to_string_lossy().into_owned();

        let s = config::Config::builder()
            .add_source(config::File::with_name(&file("default")))
            // Optional per-environment and untracked local overrides
            .add_source(config::File::with_name(&file(run_mode)).required(false))
            .add_source(config::File::with_name(&file("local")).required(false))
            .add_source(environment)
            .build()?;

        let cfg: Config = s.try_deserialize()?;
        cfg.refund.validate()?;
        tracing::debug!(run_mode, "configuration loaded");
        Ok(cfg)
    }
}
