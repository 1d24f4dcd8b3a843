mod config;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use beep_core::{
    BeepError, EngineConfig, Genome, GenomeMutator, Graph, GraphBuilder, MutationConfig, NodeId,
    PropagationEngine,
};
use beep_sim::{standard_pool, stats, GenerationStats, Simulation, WorldState};
use clap::{Parser, Subcommand};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "beep")]
#[command(about = "Beep - evolve tiny signal graphs on a grid")]
struct Cli {
    /// Maximum log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info", global = true)]
    log_level: tracing::Level,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the generation loop
    Run {
        /// Config file (defaults to ~/.beep/config.toml)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Number of generations to run
        #[arg(long, default_value_t = 10)]
        generations: u64,
        /// Override the configured seed
        #[arg(long)]
        seed: Option<u64>,
        /// Write per-generation statistics as CSV
        #[arg(long)]
        stats_out: Option<PathBuf>,
    },
    /// Write a default config file
    InitConfig {
        /// Output path (defaults to ~/.beep/config.toml)
        output: Option<PathBuf>,
    },
    /// Print a random genome over the standard node pool as JSON
    RandomGenome {
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, default_value_t = 5)]
        genes: usize,
        #[arg(long, default_value_t = 3)]
        internal_nodes: usize,
    },
    /// Evaluate a genome for a single agent and print each tick's outputs
    Eval {
        /// Genome JSON file
        genome: PathBuf,
        /// Starting x position
        #[arg(long, default_value_t = 0)]
        x: usize,
        #[arg(long, default_value_t = 128)]
        grid_size: usize,
        #[arg(long, default_value_t = 3)]
        internal_nodes: usize,
        #[arg(long, default_value_t = 1)]
        ticks: usize,
        #[command(flatten)]
        engine: EngineConfig,
    },
}

fn run(
    config_path: Option<&Path>,
    generations: u64,
    seed: Option<u64>,
    stats_out: Option<&Path>,
) -> anyhow::Result<()> {
    let mut sim_config = config::load(config_path)?;
    if seed.is_some() {
        sim_config.seed = seed;
    }

    let mut sim = Simulation::new(sim_config)?;
    info!(seed = sim.seed(), generations, "Starting run");

    let history = sim.run(generations)?;

    for row in &history {
        println!("{}", summary_line(row));
    }

    if let Some(path) = stats_out {
        stats::export_csv(path, &history)
            .with_context(|| format!("writing stats to {}", path.display()))?;
        info!(path = %path.display(), rows = history.len(), "Stats exported");
    }
    Ok(())
}

fn summary_line(row: &GenerationStats) -> String {
    format!(
        "gen {:>4} | survivors {:>4}/{:<4} ({:>5.1}%) | non-viable {:>4} | mean x {:.3}",
        row.generation,
        row.survivors,
        row.population,
        row.survival_rate() * 100.0,
        row.non_viable,
        row.mean_x
    )
}

fn init_config(output: Option<PathBuf>) -> anyhow::Result<()> {
    let path = output.unwrap_or_else(config::default_config_path);
    if path.exists() {
        bail!("{} already exists", path.display());
    }
    config::save(&beep_sim::SimConfig::default(), &path)?;
    info!(path = %path.display(), "Default config written");
    Ok(())
}

fn random_genome(seed: Option<u64>, genes: usize, internal_nodes: usize) -> anyhow::Result<()> {
    let seed = seed.unwrap_or_else(|| rand::thread_rng().gen());
    let genome = seeded_genome(seed, genes, internal_nodes)?;
    println!("{}", genome.to_json()?);
    Ok(())
}

fn seeded_genome(seed: u64, genes: usize, internal_nodes: usize) -> Result<Genome, BeepError> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let (pool, _) = standard_pool(internal_nodes);
    let mutator = GenomeMutator::new(&pool, MutationConfig::default())?;
    if genes > mutator.link_capacity() {
        info!(
            requested = genes,
            capacity = mutator.link_capacity(),
            "Gene count capped at distinct link capacity"
        );
    }

    Ok(mutator.random_genome(&mut rng, genes))
}

fn eval(
    genome_path: &Path,
    x: usize,
    grid_size: usize,
    internal_nodes: usize,
    ticks: usize,
    engine: EngineConfig,
) -> anyhow::Result<()> {
    if x >= grid_size {
        bail!("x = {} is outside a grid of size {}", x, grid_size);
    }
    let text = fs::read_to_string(genome_path)
        .with_context(|| format!("reading genome {}", genome_path.display()))?;
    let genome = Genome::from_json(&text)?;

    let (pool, nodes) = standard_pool(internal_nodes);
    let mut graph = GraphBuilder::new(Arc::new(pool)).build(&genome)?;
    let engine = PropagationEngine::new(engine);

    let mut world = WorldState::new(grid_size, 1);
    world.try_move(0, x, 0);

    for line in eval_ticks(&engine, &mut graph, &mut world, nodes.move_east, ticks)? {
        println!("{line}");
    }
    Ok(())
}

/// One JSON object per tick for the single agent in `world`
fn eval_ticks(
    engine: &PropagationEngine,
    graph: &mut Graph<WorldState>,
    world: &mut WorldState,
    move_east: NodeId,
    ticks: usize,
) -> Result<Vec<serde_json::Value>, BeepError> {
    (0..ticks)
        .map(|tick| {
            let report = engine.evaluate(graph, world)?;
            Ok(serde_json::json!({
                "tick": tick,
                "steps": report.steps,
                "settled": report.settled,
                "move_east": report.output(move_east),
                "x": world.position(0).map(|p| p.x),
            }))
        })
        .collect()
}

fn main() {
    let cli = Cli::parse();

    // Also installs the log bridge, so engine diagnostics reach the same sink
    if let Err(e) = tracing_subscriber::fmt()
        .json()
        .with_max_level(cli.log_level)
        .try_init()
    {
        eprintln!("failed to install log subscriber: {e}");
    }

    let result = match cli.command {
        Commands::Run {
            config,
            generations,
            seed,
            stats_out,
        } => run(config.as_deref(), generations, seed, stats_out.as_deref()),
        Commands::InitConfig { output } => init_config(output),
        Commands::RandomGenome {
            seed,
            genes,
            internal_nodes,
        } => random_genome(seed, genes, internal_nodes),
        Commands::Eval {
            genome,
            x,
            grid_size,
            internal_nodes,
            ticks,
            engine,
        } => eval(&genome, x, grid_size, internal_nodes, ticks, engine),
    };

    if let Err(e) = result {
        error!(error = %e, "Fatal Error");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beep_core::Gene;

    fn single_agent(grid_size: usize, x: usize) -> WorldState {
        let mut world = WorldState::new(grid_size, 1);
        world.try_move(0, x, 0);
        world
    }

    #[test]
    fn eval_reports_each_tick_and_moves_the_agent() {
        let (pool, nodes) = standard_pool(1);
        let genome = Genome::new(vec![Gene::new(nodes.x_position, nodes.move_east, 10.0)]);
        let mut graph = GraphBuilder::new(Arc::new(pool)).build(&genome).unwrap();
        let mut world = single_agent(10, 5);

        let lines = eval_ticks(
            &PropagationEngine::default(),
            &mut graph,
            &mut world,
            nodes.move_east,
            2,
        )
        .unwrap();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["tick"], 0);
        assert_eq!(lines[0]["steps"], 1);
        assert_eq!(lines[0]["settled"], true);
        assert_eq!(lines[0]["x"], 6);
        // 0.5 * 10 on the first tick, then 0.6 * 10 after the move
        assert!((lines[0]["move_east"].as_f64().unwrap() - 5.0).abs() < 1e-5);
        assert!((lines[1]["move_east"].as_f64().unwrap() - 6.0).abs() < 1e-5);
        assert_eq!(lines[1]["x"], 7);
    }

    #[test]
    fn eval_surfaces_budget_failures() {
        let (pool, nodes) = standard_pool(2);
        let (n1, n2) = (nodes.internal[0], nodes.internal[1]);
        let genome = Genome::new(vec![
            Gene::new(nodes.x_position, n1, 1.0),
            Gene::new(n2, n1, 1.0),
            Gene::new(n1, nodes.move_east, 1.0),
        ]);
        let mut graph = GraphBuilder::new(Arc::new(pool)).build(&genome).unwrap();
        let mut world = single_agent(10, 3);
        let engine = PropagationEngine::new(EngineConfig {
            max_steps_per_tick: 16,
        });

        let err = eval_ticks(&engine, &mut graph, &mut world, nodes.move_east, 1).unwrap_err();
        assert!(err.is_recoverable());
        assert_eq!(world.position(0).unwrap().x, 3);
    }

    #[test]
    fn seeded_genomes_are_reproducible_and_well_formed() {
        let a = seeded_genome(42, 5, 3).unwrap();
        let b = seeded_genome(42, 5, 3).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 5);

        let (pool, _) = standard_pool(3);
        assert!(GraphBuilder::new(Arc::new(pool)).build(&a).is_ok());
        assert_eq!(Genome::from_json(&a.to_json().unwrap()).unwrap(), a);
    }

    #[test]
    fn seeded_genome_is_capped_by_pool_size() {
        // 2 emitters (sensor + internal) x 2 receivers (internal + effector)
        let genome = seeded_genome(1, 50, 1).unwrap();
        assert_eq!(genome.len(), 4);
    }

    #[test]
    fn run_writes_one_csv_row_per_generation() {
        let dir = std::env::temp_dir().join(format!("beep-run-{}", std::process::id()));
        let config_path = dir.join("config.toml");
        let stats_path = dir.join("stats.csv");
        let sim_config = beep_sim::SimConfig {
            grid_size: 8,
            population: 6,
            steps_per_generation: 3,
            ..beep_sim::SimConfig::default()
        };
        config::save(&sim_config, &config_path).unwrap();

        run(Some(&config_path), 3, Some(17), Some(&stats_path)).unwrap();

        let csv = fs::read_to_string(&stats_path).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("generation,population,survivors"));
        assert!(lines[1].starts_with("0,6,"));
        assert!(lines[3].starts_with("2,6,"));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn summary_line_shows_survival_percentage() {
        let row = GenerationStats {
            generation: 3,
            population: 8,
            survivors: 2,
            non_viable: 1,
            mean_x: 0.5,
            traversal_steps: 40,
        };
        assert_eq!(
            summary_line(&row),
            "gen    3 | survivors    2/8    ( 25.0%) | non-viable    1 | mean x 0.500"
        );
    }
}
