use std::cmp::Reverse;
use std::collections::HashMap;
use std::io;

use csv::Writer;
use ordered_float::NotNan;
use rand::prelude::*;
use tracing::{debug, info};

use crate::agent::Agent;
use crate::environment::{GridEnv, Movement, Pos};
use crate::error::Result;
use crate::policy::DetPolicy;

pub type QTable = HashMap<(Pos, Movement), f64>;

pub trait ExplorationStrategy {
    fn next_move(&mut self, state: Pos, state_value: &QTable) -> Movement;
}

pub struct EpsilonGreedy {
    epsilon: f64,
    rng: StdRng,
}

impl EpsilonGreedy {
    pub fn new(epsilon: f64, seed: u64) -> Self {
        EpsilonGreedy {
            epsilon,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl ExplorationStrategy for EpsilonGreedy {
    fn next_move(&mut self, state: Pos, state_value: &QTable) -> Movement {
        if self.rng.gen::<f64>() < self.epsilon {
            return self.rng.gen::<Movement>();
        }
        max_value_next_action(state, state_value)
    }
}

/// Greedy action; ties go to the earliest action index.
pub fn max_value_next_action(state: Pos, state_value: &QTable) -> Movement {
    Movement::actions()
        .into_iter()
        .min_by_key(|a| {
            let value = state_value.get(&(state, *a)).copied().unwrap_or(0.0);
            Reverse(NotNan::new(value).ok())
        })
        .unwrap_or(Movement::Stay)
}

#[derive(Debug, Clone, Copy)]
pub struct LearningParams {
    pub episodes: usize,
    pub step_size: f64,
    pub discount: f64,
    /// Episodes that have not reached the goal after this many moves are cut.
    pub max_moves: usize,
}

impl Default for LearningParams {
    fn default() -> Self {
        Self {
            episodes: 2000,
            step_size: 0.5,
            discount: 0.9,
            max_moves: 500,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeStats {
    pub episode: usize,
    pub total_reward: f64,
    pub moves: usize,
    pub reached_goal: bool,
}

/// Tabular Q-learning over `env`. Returns the greedy policy and one record
/// per training episode.
pub fn q_learning(env: &mut GridEnv, strategy: &mut dyn ExplorationStrategy, params: &LearningParams)
                  -> (DetPolicy, Vec<EpisodeStats>)
{
    let mut state_value: QTable = HashMap::new();
    // Initialize Q-map
    for pos in env.iter_all_coordinates() {
        for action in Movement::actions() {
            state_value.insert((pos, action), 0.0);
        }
    }

    let mut stats = Vec::with_capacity(params.episodes);
    for episode in 0..params.episodes {
        let mut agent = Agent::new(env);
        let mut reached_goal = false;

        // Run a full episode, ie until the agent reaches the goal
        while agent.moves < params.max_moves {
            let s = agent.pos;
            let a = strategy.next_move(s, &state_value);
            let before = agent.reward;
            let done = agent.r#move(env, a).is_some();
            let r = agent.reward - before;
            let s_p = agent.pos;

            let future = if done {
                0.0
            } else {
                state_value[&(s_p, max_value_next_action(s_p, &state_value))]
            };
            // Temporal difference
            let t_d = r + params.discount * future - state_value[&(s, a)];
            state_value.insert((s, a), state_value[&(s, a)] + params.step_size * t_d);

            if done {
                reached_goal = true;
                break;
            }
        }

        if episode % 500 == 0 {
            debug!(episode, total_reward = agent.reward, moves = agent.moves, "Training progress");
        }
        stats.push(EpisodeStats {
            episode,
            total_reward: agent.reward,
            moves: agent.moves,
            reached_goal,
        });
    }

    let solved = stats.iter().filter(|s| s.reached_goal).count();
    info!(episodes = params.episodes, solved, "Q-learning finished");
    (policy_from_hashmap(&state_value, env), stats)
}

fn policy_from_hashmap(state_value_map: &QTable, env: &GridEnv) -> DetPolicy {
    let mut policy = DetPolicy::new();
    for state in env.iter_all_coordinates() {
        policy.policy.insert(state, max_value_next_action(state, state_value_map));
    }
    policy
}

/// Write one CSV row per training episode.
pub fn write_stats<W: io::Write>(writer: W, stats: &[EpisodeStats]) -> Result<()> {
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record(&["episode", "total_reward", "moves", "reached_goal"])?;
    for s in stats {
        wtr.write_record(&[
            s.episode.to_string(),
            s.total_reward.to_string(),
            s.moves.to_string(),
            s.reached_goal.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}
