//! services/planner/src/telemetry.rs
//!
//! Logging setup for hosts embedding a planner session.

use crate::{config::Config, error::PlannerError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Installs a `fmt` subscriber filtered at the configured level.
///
/// Uses `try_init`, so a second call (or a host that already installed its
/// own subscriber) reports an error instead of panicking.
pub fn init_tracing(config: &Config) -> Result<(), PlannerError> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .map_err(|e| PlannerError::Telemetry(e.to_string()))
}
