//! Analytics engine: orchestrates one analysis run.
//!
//! A run over a single [`Graph`] produces:
//!
//! 1. **Summary**: whole-graph statistics ([`metrics::compute`])
//! 2. **Components**: weak, plus strong for directed graphs
//! 3. **Centrality**: only the metrics the caller asked for
//!
//! The engine owns the [`AnalyticsConfig`] and is the only place where the
//! eigenvector → degree fallback policy is applied.

use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::budget::run_with_budget;
use super::centrality;
use super::components::{component_infos, strong_components, weak_components};
use super::metrics;
use super::models::{AnalyticsConfig, CentralityScores, Graph, GraphAnalytics, Metric};
use crate::error::{GraphError, Result};

/// Runs summary, component and centrality analysis with a fixed config.
#[derive(Debug, Clone, Default)]
pub struct GraphAnalyticsEngine {
    config: AnalyticsConfig,
}

impl GraphAnalyticsEngine {
    pub fn new(config: AnalyticsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    /// Analyze a graph synchronously.
    pub fn analyze(&self, graph: &Graph, metrics: &[Metric]) -> Result<GraphAnalytics> {
        let start = Instant::now();

        let summary = metrics::compute(graph);
        let weak = component_infos(&weak_components(graph));
        let strong = if graph.is_directed() {
            Some(component_infos(&strong_components(graph)?))
        } else {
            None
        };
        let (centrality, eigenvector_fallback) = self.centrality(graph, metrics)?;

        let computation_ms = start.elapsed().as_millis() as u64;
        info!(
            nodes = summary.node_count,
            edges = summary.edge_count,
            directed = summary.directed,
            metrics = centrality.metrics().count(),
            computation_ms,
            "Graph analysis complete"
        );

        Ok(GraphAnalytics {
            summary,
            weak_components: weak,
            strong_components: strong,
            centrality,
            eigenvector_fallback,
            computation_ms,
            computed_at: Utc::now(),
        })
    }

    /// Analyze a shared graph, honouring `budget_ms` when configured.
    ///
    /// Without a budget the analysis still runs off the async executor.
    pub async fn analyze_shared(
        &self,
        graph: Arc<Graph>,
        metrics: Vec<Metric>,
    ) -> Result<GraphAnalytics> {
        let engine = self.clone();
        let job = move || engine.analyze(&graph, &metrics);

        match self.config.budget_ms {
            Some(ms) => {
                debug!(budget_ms = ms, "Running analysis under time budget");
                run_with_budget(Duration::from_millis(ms), job).await
            }
            None => tokio::task::spawn_blocking(job)
                .await
                .unwrap_or_else(|e| std::panic::resume_unwind(e.into_panic())),
        }
    }

    /// Requested centralities, with the optional degree stand-in for a
    /// non-convergent eigenvector run.
    fn centrality(&self, graph: &Graph, metrics: &[Metric]) -> Result<(CentralityScores, bool)> {
        match centrality::compute(graph, metrics, &self.config) {
            Err(GraphError::NonConvergent {
                iterations,
                last_delta,
            }) if self.config.eigenvector_degree_fallback => {
                warn!(
                    iterations,
                    last_delta,
                    "Eigenvector centrality did not converge, substituting degree centrality"
                );
                let rest: Vec<Metric> = metrics
                    .iter()
                    .copied()
                    .filter(|m| *m != Metric::Eigenvector)
                    .collect();
                let mut scores = centrality::compute(graph, &rest, &self.config)?;
                scores.insert(Metric::Eigenvector, centrality::degree_centrality(graph));
                Ok((scores, true))
            }
            other => other.map(|scores| (scores, false)),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
