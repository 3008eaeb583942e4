use std::collections::HashMap;
use std::io::BufRead;

use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::{debug, info};

use crate::agent::Agent;
use crate::environment::{GridEnv, Movement, Pos};

/// How an episode ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Episode {
    pub total_reward: f64,
    pub moves: usize,
    pub reached_goal: bool,
}

pub trait Policy
{
    /// Next move from `pos`, `None` to give up the episode.
    fn next_move(&mut self, env: &GridEnv, pos: Pos) -> Option<Movement>;

    /// Run one episode from the start, at most `max_moves` moves long.
    fn solve(&mut self, env: &mut GridEnv, max_moves: usize) -> Episode {
        let mut agent = Agent::new(env);
        let mut reached_goal = false;
        while agent.moves < max_moves {
            let movement = match self.next_move(env, agent.pos) {
                Some(movement) => movement,
                None => break,
            };
            let done = agent.r#move(env, movement);
            debug!("{} => {:?} {}", movement, done, agent.pos);
            if done.is_some() {
                reached_goal = true;
                break;
            }
        }
        let episode = Episode {
            total_reward: agent.reward,
            moves: agent.moves,
            reached_goal,
        };
        info!(?episode, "Episode finished");
        episode
    }
}

pub struct RandomPolicy {
    rng: StdRng,
}

impl RandomPolicy {
    pub fn new(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }
}

impl Policy for RandomPolicy
{
    fn next_move(&mut self, _env: &GridEnv, _pos: Pos) -> Option<Movement> {
        Some(self.rng.gen())
    }
}

/// Reads moves line by line: `w`/`a`/`s`/`d`, `x` to stay, or a full action
/// name. Any other line is ignored. The map is printed after each move.
pub struct HumanControlPolicy<R> {
    input: R,
}

impl<R: BufRead> HumanControlPolicy<R> {
    pub fn new(input: R) -> Self {
        Self { input }
    }
}

fn parse_key(line: &str) -> Option<Movement> {
    match line.trim() {
        "w" => Some(Movement::Up),
        "s" => Some(Movement::Down),
        "a" => Some(Movement::Left),
        "d" => Some(Movement::Right),
        "x" => Some(Movement::Stay),
        other => other.parse().ok(),
    }
}

impl<R: BufRead> Policy for HumanControlPolicy<R>
{
    fn next_move(&mut self, env: &GridEnv, _pos: Pos) -> Option<Movement> {
        println!("{}", env.render());
        let mut line = String::new();
        loop {
            line.clear();
            match self.input.read_line(&mut line) {
                Ok(0) | Err(_) => return None,
                Ok(_) => {
                    if let Some(movement) = parse_key(&line) {
                        return Some(movement);
                    }
                }
            }
        }
    }
}

// Represents deterministic policy
#[derive(Debug, Clone, Default)]
pub struct DetPolicy {
    pub policy: HashMap<Pos, Movement>,
}

impl DetPolicy {
    pub fn new() -> Self {
        Self { policy: HashMap::new() }
    }

    // Initializes the deterministic policy to always stay
    pub fn initialize(&mut self, env: &GridEnv) {
        for pos in env.iter_all_coordinates() {
            self.policy.insert(pos, Movement::Stay);
        }
    }
}

impl Policy for DetPolicy
{
    fn next_move(&mut self, _env: &GridEnv, pos: Pos) -> Option<Movement> {
        self.policy.get(&pos).copied()
    }
}
