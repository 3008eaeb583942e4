use std::fs::File;
use std::io;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use grid_map::config::{GridConfig, DEFAULT_CURVATURE};
use grid_map::environment::GridEnv;
use grid_map::policy::{HumanControlPolicy, Policy, RandomPolicy};
use grid_map::rl::{self, EpsilonGreedy, LearningParams};

#[derive(Parser)]
#[command(name = "grid_map", about = "Tabular grid world for reinforcement learning")]
struct Cli {
    /// Number of rows
    #[arg(long, default_value_t = 19)]
    height: usize,

    /// Number of columns
    #[arg(long, default_value_t = 10)]
    width: usize,

    /// Seed for the reward field and the agents
    #[arg(long)]
    seed: Option<u64>,

    /// Middle control point weight of the suggested path
    #[arg(long, default_value_t = DEFAULT_CURVATURE, allow_hyphen_values = true)]
    curvature: f64,

    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the map with the suggested path
    Map,
    /// Run one episode with uniformly random moves
    Random {
        #[arg(long, default_value_t = 1000)]
        max_moves: usize,
    },
    /// Move the agent from stdin: w/a/s/d, x to stay
    Play {
        #[arg(long, default_value_t = 1000)]
        max_moves: usize,
    },
    /// Train with Q-learning, then run the greedy policy
    Learn {
        #[arg(long, default_value_t = 2000)]
        episodes: usize,
        #[arg(long, default_value_t = 0.5)]
        alpha: f64,
        #[arg(long, default_value_t = 0.9)]
        gamma: f64,
        #[arg(long, default_value_t = 0.1)]
        epsilon: f64,
        #[arg(long, default_value_t = 500)]
        max_moves: usize,
        /// Write per-episode returns here
        #[arg(long)]
        csv: Option<String>,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let seed = cli.seed.unwrap_or_else(rand::random);
    let config = GridConfig::new(cli.height, cli.width)
        .with_seed(seed)
        .with_curvature(cli.curvature);
    let mut env = GridEnv::with_config(&config)?;
    info!(seed, goal = %env.goal(), "Grid {}x{}", env.height(), env.width());

    let drives_episodes = !matches!(cli.command, Command::Map);
    if drives_episodes && !env.can_terminate() {
        bail!(
            "a {}x{} grid has no reachable termination cell, pass a square grid such as --height {} --width {}",
            env.height(),
            env.width(),
            env.width(),
            env.width()
        );
    }

    match cli.command {
        Command::Map => {
            println!("----------- MAP {}x{} ----------", env.height(), env.width());
            print!("{}", env.map().as_str());
        }
        Command::Random { max_moves } => {
            let episode = RandomPolicy::new(seed).solve(&mut env, max_moves);
            println!("Finished with result {} after {} moves", episode.total_reward, episode.moves);
        }
        Command::Play { max_moves } => {
            let stdin = io::stdin();
            let episode = HumanControlPolicy::new(stdin.lock()).solve(&mut env, max_moves);
            println!("{}", env.render());
            println!("Finished with result {} after {} moves", episode.total_reward, episode.moves);
        }
        Command::Learn { episodes, alpha, gamma, epsilon, max_moves, csv } => {
            let params = LearningParams {
                episodes,
                step_size: alpha,
                discount: gamma,
                max_moves,
            };
            let mut strategy = EpsilonGreedy::new(epsilon, seed);
            let (mut policy, stats) = rl::q_learning(&mut env, &mut strategy, &params);
            if let Some(path) = csv {
                rl::write_stats(File::create(&path)?, &stats)?;
                info!(%path, "Wrote training returns");
            }
            let episode = policy.solve(&mut env, max_moves);
            println!("{}", env.render());
            println!(
                "Greedy policy: result {} after {} moves (goal reached: {})",
                episode.total_reward, episode.moves, episode.reached_goal
            );
        }
    }
    Ok(())
}
