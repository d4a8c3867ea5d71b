mod config;
mod generators;

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, ValueEnum};
use graph_steps_core::{Algorithm, Engine, Graph, StepKind};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Overrides;

/// Benchmark and trace driver for the graph-steps engine
#[derive(Parser, Debug)]
#[command(name = "graph-steps-bench")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Workload to run
    #[arg(value_enum, default_value_t = Mode::All)]
    mode: Mode,

    /// Nodes per generated graph
    #[arg(short, long, default_value_t = 400)]
    nodes: usize,

    /// Run only this algorithm (bfs, dfs, dijkstra, bellman-ford, astar)
    #[arg(short, long)]
    algorithm: Option<Algorithm>,

    /// Configuration file
    #[arg(short, long, default_value = "graph-steps.toml", env = "GRAPH_STEPS_CONFIG")]
    config: PathBuf,

    /// Override the A* heuristic divisor
    #[arg(long)]
    heuristic_scale: Option<f64>,

    /// Skip per-step snapshots of distances, visited set and frontier
    #[arg(long)]
    no_snapshots: bool,

    /// Start node for trace mode
    #[arg(long, default_value = "A")]
    start: String,

    /// End node for trace mode
    #[arg(long, default_value = "F")]
    end: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Every generator below
    All,
    /// Square lattice with diagonal shortcuts
    Grid,
    /// Erdos-Renyi uniform random edges (directed)
    Random,
    /// Watts-Strogatz ring lattice plus rewiring
    Smallworld,
    /// Two clusters joined by a thin bridge
    Barbell,
    /// Branching tree (directed, acyclic)
    Tree,
    /// Print the full step trace of one run over the sample graph as JSON
    Trace,
}

type Generator = fn(usize) -> graph_steps_core::Result<Graph>;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let overrides = Overrides {
        heuristic_scale: args.heuristic_scale,
        record_snapshots: args.no_snapshots.then_some(false),
    };
    let config = config::load(&args.config, &overrides)?;
    tracing::debug!(?config, "configuration loaded");
    let engine = Engine::new(config)?;

    if args.mode == Mode::Trace {
        let algorithm = args.algorithm.unwrap_or(Algorithm::Dijkstra);
        let result = engine.run(algorithm, &Graph::sample(), &args.start, Some(args.end.as_str()))?;
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    let generators: Vec<(&str, Generator)> = match args.mode {
        Mode::Grid => vec![("Grid lattice", generators::grid)],
        Mode::Random => vec![("Erdos-Renyi random", generators::random)],
        Mode::Smallworld => vec![("Small-world (Watts-Strogatz)", generators::small_world)],
        Mode::Barbell => vec![("Barbell (cluster-bridge-cluster)", generators::barbell)],
        Mode::Tree => vec![("Branching tree", generators::tree)],
        Mode::All | Mode::Trace => vec![
            ("Grid lattice", generators::grid as Generator),
            ("Erdos-Renyi random", generators::random),
            ("Small-world (Watts-Strogatz)", generators::small_world),
            ("Barbell (cluster-bridge-cluster)", generators::barbell),
            ("Branching tree", generators::tree),
        ],
    };
    let algorithms: Vec<Algorithm> = match args.algorithm {
        Some(algorithm) => vec![algorithm],
        None => Algorithm::ALL.to_vec(),
    };

    println!("graph-steps-bench");
    println!("=================");
    println!();

    for (name, generator) in generators {
        run_benchmark(&engine, name, generator, args.nodes, &algorithms)?;
    }
    Ok(())
}

fn run_benchmark(
    engine: &Engine,
    name: &str,
    generator: Generator,
    node_count: usize,
    algorithms: &[Algorithm],
) -> anyhow::Result<()> {
    println!("--- {} ---", name);

    let t = Instant::now();
    let graph = generator(node_count)?;
    println!(
        "Generated in {:.1}ms: {} nodes, {} edges, {}",
        t.elapsed().as_secs_f64() * 1000.0,
        graph.node_count(),
        graph.edge_count(),
        if graph.is_directed() { "directed" } else { "undirected" }
    );

    let (Some(first), Some(last)) = (graph.nodes().first(), graph.nodes().last()) else {
        println!("(empty graph)");
        println!();
        return Ok(());
    };
    let (start, end) = (first.id.as_str(), last.id.as_str());

    println!();
    println!(
        "{:>13} {:>8} {:>8} {:>8} {:>10} {:>10}",
        "algorithm", "steps", "visits", "relax", "cost", "time"
    );
    println!(
        "{:->13} {:->8} {:->8} {:->8} {:->10} {:->10}",
        "", "", "", "", "", ""
    );

    for &algorithm in algorithms {
        let t = Instant::now();
        let result = engine.run(algorithm, &graph, start, Some(end))?;
        let elapsed = t.elapsed();

        let cost = match &result.shortest_path {
            Some(path) => graph
                .path_cost(path)
                .map_or_else(|| "?".to_string(), |c| format!("{c}")),
            None if result.has_negative_cycle == Some(true) => "neg-cycle".to_string(),
            None => "-".to_string(),
        };
        println!(
            "{:>13} {:>8} {:>8} {:>8} {:>10} {:>8.1}ms",
            algorithm.name(),
            result.steps.len(),
            result.count(StepKind::Visit),
            result.count(StepKind::Relax),
            cost,
            elapsed.as_secs_f64() * 1000.0
        );
        if result.has_cycle == Some(true) {
            tracing::debug!(%algorithm, "cycle detected before reaching {end}");
        }
    }
    println!();
    Ok(())
}
