//! Typed failures of the analytics core.
//!
//! Every operation in [`crate::graph`] reports problems through [`GraphError`].
//! Degenerate-but-valid inputs (e.g. assortativity on a graph with a single
//! edge) are *not* errors: they surface as `None` in the result types.

use thiserror::Error;

use crate::graph::models::Metric;

/// Errors raised by graph construction, analysis and export.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GraphError {
    /// The record source produced zero rows.
    #[error("edge list is empty: at least one record is required")]
    EmptyInput,

    /// A record had no usable source or target identifier.
    #[error("row {row}: missing {side} identifier")]
    MissingIdentifier { row: usize, side: EndpointSide },

    /// A subgraph size outside `1..=available` was requested.
    #[error("requested {requested} nodes but the graph has {available}")]
    Range { requested: usize, available: usize },

    /// A direction-only operation was invoked on an undirected graph.
    #[error("{operation} requires a directed graph")]
    DirectionMismatch { operation: &'static str },

    /// Power iteration exhausted its budget without meeting the tolerance.
    #[error("eigenvector iteration did not converge after {iterations} iterations (last change {last_delta:e})")]
    NonConvergent { iterations: usize, last_delta: f64 },

    /// A budgeted computation ran past its wall-clock allowance.
    #[error("computation exceeded its budget of {budget_ms} ms")]
    Timeout { budget_ms: u64 },

    /// A node id that does not exist in the graph was referenced.
    #[error("unknown node: {0}")]
    UnknownNode(String),

    /// A metric was needed (e.g. for node sizing) but not computed.
    #[error("metric '{0}' was not computed")]
    MissingMetric(Metric),
}

/// Which endpoint of a record was missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointSide {
    Source,
    Target,
}

impl std::fmt::Display for EndpointSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Source => write!(f, "source"),
            Self::Target => write!(f, "target"),
        }
    }
}

/// Result alias for the analytics core.
pub type Result<T> = std::result::Result<T, GraphError>;
