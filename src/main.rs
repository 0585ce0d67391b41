//! graphscope - network analysis CLI
//!
//! Loads a CSV edge list, prints structural statistics and centralities, and
//! writes the renderer view model as JSON.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use graphscope::graph::{
    self, centrality, components, subgraph, ExportOptions, Graph, GraphAnalytics,
    GraphAnalyticsEngine, Metric,
};
use graphscope::source::{self, ColumnSelection, DatasetCache, Directedness};
use graphscope::Config;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "graphscope")]
#[command(about = "Network analysis for CSV edge lists")]
struct Cli {
    /// YAML config file (default: ./graphscope.yaml)
    #[arg(long, global = true, env = "GRAPHSCOPE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the structural summary and top-ranked nodes
    Analyze {
        #[command(flatten)]
        input: InputArgs,

        /// Centralities to compute (comma separated)
        #[arg(long, value_delimiter = ',', default_value = "degree,closeness,betweenness")]
        metrics: Vec<Metric>,

        /// Nodes listed per metric
        #[arg(short = 'k', long, default_value = "5")]
        top_k: usize,

        /// Print the full analysis as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List weak (and, for directed graphs, strong) components
    Components {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Summarize the subgraph of the N highest-degree nodes
    Top {
        #[command(flatten)]
        input: InputArgs,

        /// Number of nodes to keep
        #[arg(short = 'n')]
        n: usize,
    },

    /// Write the renderer view model as JSON
    Export {
        #[command(flatten)]
        input: InputArgs,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Metric that drives node size
        #[arg(long)]
        size_by: Option<Metric>,

        /// Restrict to the N highest-degree nodes first
        #[arg(long)]
        top: Option<usize>,

        /// Highlight the largest weak component
        #[arg(long)]
        largest_component: bool,
    },
}

/// Where the edges come from and how to read them.
#[derive(Args)]
struct InputArgs {
    /// CSV edge list
    path: PathBuf,

    /// Source column (default: a column named Source)
    #[arg(long)]
    source: Option<String>,

    /// Target column (default: a column named Target)
    #[arg(long)]
    target: Option<String>,

    /// Treat edges as directed
    #[arg(long, conflicts_with = "direction_column")]
    directed: bool,

    /// Column holding directed/undirected markers
    #[arg(long)]
    direction_column: Option<String>,
}

impl InputArgs {
    fn selection(&self) -> ColumnSelection {
        ColumnSelection {
            source: self.source.clone(),
            target: self.target.clone(),
            direction: match &self.direction_column {
                Some(column) => Directedness::Column(column.clone()),
                None => Directedness::Explicit(self.directed),
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,graphscope=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::from_yaml_and_env(cli.config.as_deref())?;
    let cache = DatasetCache::new(config.cache_capacity);

    match cli.command {
        Commands::Analyze {
            input,
            metrics,
            top_k,
            json,
        } => {
            let graph = load_graph(&cache, &input)?;
            let analytics = analyze(&config, graph, metrics).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&analytics)?);
            } else {
                print_summary(&analytics);
                print_rankings(&analytics, top_k);
            }
            Ok(())
        }
        Commands::Components { input } => {
            let graph = load_graph(&cache, &input)?;
            print_components("Weak", &components::weak_components(&graph));
            if graph.is_directed() {
                print_components("Strong", &components::strong_components(&graph)?);
            }
            Ok(())
        }
        Commands::Top { input, n } => {
            let graph = load_graph(&cache, &input)?;
            let sub = subgraph::top_n_by_degree(&graph, n)?;
            let analytics = analyze(&config, sub, vec![Metric::Degree]).await?;
            print_summary(&analytics);
            Ok(())
        }
        Commands::Export {
            input,
            output,
            size_by,
            top,
            largest_component,
        } => {
            let mut graph = load_graph(&cache, &input)?;
            if let Some(n) = top {
                graph = subgraph::top_n_by_degree(&graph, n)?;
            }
            run_export(&config, &graph, &output, size_by, largest_component)
        }
    }
}

fn load_graph(cache: &DatasetCache, input: &InputArgs) -> Result<Graph> {
    let dataset = cache.get_or_load(&input.path)?;
    let (records, directed) = source::prepare(&dataset, &input.selection())?;
    let graph = graph::build(&records, directed)
        .with_context(|| format!("Failed to build graph from {}", input.path.display()))?;
    tracing::info!(
        "Loaded {} nodes, {} edges ({})",
        graph.node_count(),
        graph.edge_count(),
        if directed { "directed" } else { "undirected" }
    );
    Ok(graph)
}

async fn analyze(config: &Config, graph: Graph, metrics: Vec<Metric>) -> Result<GraphAnalytics> {
    let engine = GraphAnalyticsEngine::new(config.analytics.clone());
    Ok(engine.analyze_shared(Arc::new(graph), metrics).await?)
}

fn run_export(
    config: &Config,
    graph: &Graph,
    output: &Path,
    size_by: Option<Metric>,
    largest_component: bool,
) -> Result<()> {
    let mut metrics = vec![Metric::Degree, Metric::Closeness, Metric::Betweenness];
    if graph.is_directed() {
        metrics.extend([Metric::InDegree, Metric::OutDegree]);
    }
    metrics.extend(size_by);
    let scores = centrality::compute(graph, &metrics, &config.analytics)?;

    let weak = components::weak_components(graph);
    let highlight = if largest_component {
        components::largest_component(&weak)
    } else {
        None
    };

    let view = graph::export_with(
        graph,
        Some(&scores),
        &ExportOptions {
            size_metric: size_by,
            scale: config.size_scale.clone(),
            highlight,
        },
    )?;
    std::fs::write(output, view.to_json()?)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    tracing::info!(
        "Wrote {} nodes, {} edges to {}",
        view.nodes.len(),
        view.edges.len(),
        output.display()
    );
    Ok(())
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.4}", v))
}

fn print_summary(analytics: &GraphAnalytics) {
    let s = &analytics.summary;
    println!("Nodes:                 {}", s.node_count);
    println!("Edges:                 {}", s.edge_count);
    println!("Directed:              {}", s.directed);
    println!("Density:               {:.4}", s.density);
    println!("Average degree:        {}", fmt_opt(s.average_degree));
    println!("Average clustering:    {:.4}", s.average_clustering);
    println!("Transitivity:          {:.4}", s.transitivity);
    println!("Assortativity:         {}", fmt_opt(s.assortativity));
    println!("Self-loops:            {}", s.self_loops);
    println!("Weak components:       {}", s.weak_component_count);
    if let Some(strong) = s.strong_component_count {
        println!("Strong components:     {}", strong);
    }
    if analytics.eigenvector_fallback {
        println!("(eigenvector scores are degree centrality: iteration did not converge)");
    }
}

fn print_rankings(analytics: &GraphAnalytics, top_k: usize) {
    for metric in analytics.centrality.metrics() {
        let Some(scores) = analytics.centrality.get(metric) else {
            continue;
        };
        let mut ranked: Vec<(&String, &f64)> = scores.iter().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(a.1).then_with(|| a.0.cmp(b.0)));

        println!();
        println!("Top {} by {}:", top_k.min(ranked.len()), metric);
        for (id, score) in ranked.into_iter().take(top_k) {
            println!("  {:<24} {:.4}", id, score);
        }
    }
}

fn print_components(kind: &str, found: &[graph::Component]) {
    println!("{} components: {}", kind, found.len());
    for (i, members) in found.iter().enumerate() {
        let ids: Vec<&str> = members.iter().map(String::as_str).collect();
        println!("  #{:<4} size {:<6} {}", i, members.len(), ids.join(", "));
    }
}
