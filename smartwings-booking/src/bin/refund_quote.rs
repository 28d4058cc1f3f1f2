//! Print the cancellation and refund position of a stored booking.
//!
//! Usage: refund-quote <booking.json> [--now <RFC 3339 timestamp>]

use anyhow::{bail, Context};
use chrono::{DateTime, Utc};
use serde::Serialize;
use smartwings_booking::{BookingLifecycle, RefundPolicy, RefundQuote};
use smartwings_core::{Booking, BookingStatus};
use smartwings_store::Config;
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Serialize)]
struct Report {
    confirmation_code: String,
    status: BookingStatus,
    evaluated_at: DateTime<Utc>,
    modifiable: bool,
    #[serde(flatten)]
    refund: RefundQuote,
}

#[derive(Debug)]
struct Args {
    path: String,
    now: Option<DateTime<Utc>>,
}

const CONFIG_DIR: &str = "config";
const DEFAULT_LOG_FILTER: &str = "refund_quote=info,smartwings_booking=info,smartwings_store=info";

fn parse_args(args: impl IntoIterator<Item = String>) -> anyhow::Result<Args> {
    let mut path = None;
    let mut now = None;
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--now" => {
                let raw = args.next().context("--now needs a timestamp")?;
                let parsed = DateTime::parse_from_rfc3339(&raw)
                    .with_context(|| format!("invalid --now timestamp: {}", raw))?;
                now = Some(parsed.with_timezone(&Utc));
            }
            other if path.is_none() => path = Some(other.to_string()),
            other => bail!("unexpected argument: {}", other),
        }
    }

    match path {
        Some(path) => Ok(Args { path, now }),
        None => bail!("usage: refund-quote <booking.json> [--now <rfc3339>]"),
    }
}

/// A missing config directory means built-in defaults; a broken one is an error.
fn load_config(dir: &Path) -> anyhow::Result<Config> {
    if !dir.is_dir() {
        tracing::warn!(dir = %dir.display(), "config directory not found, using built-in defaults");
        return Ok(Config::default());
    }
    Config::load_from(dir).context("loading configuration")
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = parse_args(std::env::args().skip(1))?;
    let config = load_config(Path::new(CONFIG_DIR))?;

    let raw = std::fs::read_to_string(&args.path)
        .with_context(|| format!("reading {}", args.path))?;
    let booking: Booking = serde_json::from_str(&raw)
        .with_context(|| format!("parsing booking from {}", args.path))?;

    let now = args.now.unwrap_or_else(Utc::now);
    let lifecycle = BookingLifecycle::new(RefundPolicy::from(&config.refund));
    tracing::info!(code = %booking.confirmation_code, %now, "evaluating booking");

    let report = Report {
        confirmation_code: booking.confirmation_code.clone(),
        status: booking.status,
        evaluated_at: now,
        modifiable: lifecycle.can_be_modified(&booking, now),
        refund: lifecycle.quote_refund(&booking, now),
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
