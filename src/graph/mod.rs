//! Graph analytics core.
//!
//! Builds an immutable graph from tabular edge records and computes
//! structural statistics, components and centralities over it. All analysis
//! is synchronous and read-only; derived graphs are fresh copies.
//!
//! ## Architecture
//!
//! ```text
//! EdgeRecord[] ──► builder ──► Graph ◄──────────────┐
//!                                │                  │
//!              ┌─────────────────┼──────────────┐   │
//!              ▼                 ▼              ▼   │
//!           metrics         components     centrality
//!              │                 │              │   │
//!              └──────► engine ◄─┘──────────────┘   │
//!                          │                        │
//!                      subgraph ────────────────────┘
//!                          │
//!                       export ──► ViewModel (JSON for the renderer)
//! ```
//!
//! ## Modules
//!
//! - [`models`]: graph, attribute, score and config types
//! - [`builder`]: edge records → [`Graph`]
//! - [`metrics`]: density, assortativity, transitivity, clustering
//! - [`components`]: weak (BFS) and strong (Tarjan) components
//! - [`centrality`]: degree, closeness, betweenness (Brandes), eigenvector
//! - [`subgraph`]: top-N by degree and component extraction
//! - [`export`]: renderer view model with sized nodes
//! - [`engine`]: [`GraphAnalyticsEngine`] orchestrating a run
//! - [`budget`]: wall-clock limit for runs on the blocking pool

pub mod budget;
pub mod builder;
pub mod centrality;
pub mod components;
pub mod engine;
pub mod export;
pub mod metrics;
pub mod models;
pub mod subgraph;

// Re-export primary types for convenience
pub use builder::build;
pub use engine::GraphAnalyticsEngine;
pub use export::{export, export_with, ExportOptions, SizeScale, ViewEdge, ViewModel, ViewNode};
pub use models::{
    AnalyticsConfig, Attributes, CentralityResult, CentralityScores, Component, ComponentInfo,
    Edge, EdgeRecord, Graph, GraphAnalytics, Metric, Node, NodeId, Scalar, StructuralSummary,
};
