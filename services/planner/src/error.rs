//! services/planner/src/error.rs
//!
//! Defines the primary error type for the planner service.

use crate::config::ConfigError;
use floorplan_core::{GridError, InvalidProduct, ParseError, PortError, ProductId};
use serde::Serialize;
use std::fmt;

/// The operation a surfaced error came from. Shown next to the message in
/// the error banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorSource {
    Initialize,
    SaveLayout,
    AddProduct,
    UpdateProduct,
    RemoveProduct,
}

impl ErrorSource {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorSource::Initialize => "initialize",
            ErrorSource::SaveLayout => "saveLayout",
            ErrorSource::AddProduct => "addProduct",
            ErrorSource::UpdateProduct => "updateProduct",
            ErrorSource::RemoveProduct => "removeProduct",
        }
    }
}

impl fmt::Display for ErrorSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The primary error type for the `planner` service.
#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A persisted layout could not be read.
    #[error("Layout parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Grid error: {0}")]
    Grid(#[from] GridError),

    /// A layout could not be turned into its persisted text.
    #[error("Layout serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A backend or identity-provider call failed.
    #[error("Remote error in {source_tag}: {error}")]
    Remote {
        source_tag: ErrorSource,
        #[source]
        error: PortError,
    },

    /// The store has no persisted id and creating it failed.
    #[error("Store is not ready: {0}")]
    StoreNotReady(String),

    /// An operation ran before `initialize` produced a store.
    #[error("No store is loaded for this session")]
    NotInitialized,

    /// `reset` ran while `initialize` was still loading.
    #[error("The session was reset before loading finished")]
    SessionReset,

    #[error("No user is signed in")]
    NotSignedIn,

    #[error("Unknown product: {0}")]
    UnknownProduct(ProductId),

    #[error("Invalid product: {0}")]
    InvalidProduct(#[from] InvalidProduct),

    #[error("No square is selected")]
    NoSquareSelected,

    #[error("Square ({row}, {col}) does not hold products")]
    NotAProductSquare { row: usize, col: usize },

    #[error("Layout must be between {min} and {max} squares per side, got {rows}x{cols}")]
    DimensionsOutOfRange {
        rows: usize,
        cols: usize,
        min: usize,
        max: usize,
    },

    #[error("Store {0} is required")]
    MissingField(&'static str),

    #[error("Failed to install the tracing subscriber: {0}")]
    Telemetry(String),
}

impl PlannerError {
    pub fn remote(source_tag: ErrorSource, error: PortError) -> Self {
        Self::Remote { source_tag, error }
    }
}
