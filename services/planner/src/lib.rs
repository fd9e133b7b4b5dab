pub mod adapters;
pub mod config;
pub mod error;
pub mod session;
pub mod telemetry;

pub use config::{Config, ConfigError};
pub use error::{ErrorSource, PlannerError};
pub use session::{
    ActiveView, EditAction, InitOutcome, PendingError, PlannerSession, SessionState,
    SquareCommand, SquareTrigger, StoreSetup,
};
