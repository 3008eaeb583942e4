use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;

use rand::{
    distributions::{Distribution, Standard},
    rngs::StdRng,
    Rng, SeedableRng,
};
use tracing::{debug, info, trace, warn};

use crate::config::GridConfig;
use crate::error::{GridError, Result};
use crate::path::bezier_curve;
use crate::render::{self, MapBuffer};
use crate::reward::RewardField;

/// Reward for a move that would leave the grid.
pub const OUT_OF_MAP_REWARD: f64 = -100.0;
/// Reward for the move that reaches the goal.
pub const GOAL_REACHED_REWARD: f64 = 10.0;

// Action
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Movement {
    Right,
    Down,
    Left,
    Up,
    Stay,
}

impl Movement {
    /// `(row, col)` delta
    pub fn into_vector(self) -> (isize, isize) {
        match self {
            Movement::Right => ( 0, 1),
            Movement::Down  => ( 1, 0),
            Movement::Left  => ( 0,-1),
            Movement::Up    => (-1, 0),
            Movement::Stay  => ( 0, 0),
        }
    }

    /// All actions, ordered by action index.
    pub fn actions() -> Vec<Movement> {
        vec![Movement::Right, Movement::Down, Movement::Left, Movement::Up, Movement::Stay]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Movement::Right => "right",
            Movement::Down => "down",
            Movement::Left => "left",
            Movement::Up => "up",
            Movement::Stay => "stay",
        }
    }
}

impl TryFrom<usize> for Movement {
    type Error = GridError;

    fn try_from(index: usize) -> Result<Self> {
        Movement::actions()
            .get(index)
            .copied()
            .ok_or_else(|| GridError::InvalidAction(format!("{} (expected 0..=4)", index)))
    }
}

impl FromStr for Movement {
    type Err = GridError;

    fn from_str(token: &str) -> Result<Self> {
        match token.to_ascii_lowercase().as_str() {
            "right" => Ok(Movement::Right),
            "down" => Ok(Movement::Down),
            "left" => Ok(Movement::Left),
            "up" => Ok(Movement::Up),
            "stay" => Ok(Movement::Stay),
            _ => Err(GridError::InvalidAction(token.to_string())),
        }
    }
}

impl fmt::Display for Movement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Distribution<Movement> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Movement {
        match rng.gen_range(0, 5) {
            0 => Movement::Right,
            1 => Movement::Down,
            2 => Movement::Left,
            3 => Movement::Up,
            _ => Movement::Stay,
        }
    }
}

/// Grid cell, `(row, col)`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pos {
    pub row: usize,
    pub col: usize,
}

impl Pos {
    pub fn new(row: usize, col: usize) -> Self {
        Pos { row, col }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Diagnostics attached to a step. Currently carries nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepInfo {}

/// Outcome of [`GridEnv::step`].
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub position: Pos,
    pub reward: f64,
    pub done: bool,
    pub info: StepInfo,
}

/// The grid world.
///
/// Rows run along `height`, columns along `width`; the reward field and the
/// map are both `height x width`. The start is `(0, 0)` and the goal the
/// opposite corner `(height - 1, width - 1)`.
///
/// A step terminates when the candidate cell equals `(width - 1, height - 1)`
/// and is rejected when `row >= width` or `col >= height`. Both rules compare
/// against the transposed extent, so they only agree with the goal on square
/// grids. Candidates outside the reward field are rejected as well.
#[derive(Debug, Clone)]
pub struct GridEnv {
    height: usize,
    width: usize,
    rewards: RewardField,
    path: Vec<Pos>,
    map: MapBuffer,
    goal: Pos,
    position: Pos,
    step_count: usize,
}

impl GridEnv {
    pub fn new(height: usize, width: usize) -> Result<Self> {
        Self::with_config(&GridConfig::new(height, width))
    }

    pub fn with_config(config: &GridConfig) -> Result<Self> {
        let seed = config.seed.unwrap_or_else(rand::random);
        let mut rng = StdRng::seed_from_u64(seed);
        Self::with_rng(config.height, config.width, config.curvature, &mut rng)
    }

    /// Build the world drawing the reward field from `rng`.
    pub fn with_rng<R: Rng + ?Sized>(height: usize, width: usize, curvature: f64, rng: &mut R) -> Result<Self> {
        if height == 0 || width == 0 {
            return Err(GridError::InvalidDimensions { height, width });
        }
        let start = Pos::new(0, 0);
        let mid = Pos::new(height / 2, width / 2);
        let goal = Pos::new(height - 1, width - 1);

        let path = bezier_curve(start, mid, goal, curvature, height, width);
        let rewards = RewardField::generate(height, width, rng, goal, &path);
        let map = MapBuffer::new(height, width, &path);
        info!(height, width, path_len = path.len(), "Grid map setup");
        if height != width {
            warn!(
                height,
                width,
                "Termination cell ({}, {}) is unreachable on a non-square grid, episodes never end",
                width - 1,
                height - 1
            );
        }

        let mut env = Self {
            height,
            width,
            rewards,
            path,
            map,
            goal,
            position: start,
            step_count: 0,
        };
        env.reset();
        Ok(env)
    }

    pub fn reset(&mut self) -> Pos {
        self.position = Pos::new(0, 0);
        self.step_count = 0;
        debug!("Episode reset");
        self.position
    }

    pub fn step(&mut self, movement: Movement) -> Step {
        let (d_row, d_col) = movement.into_vector();
        let row = self.position.row as isize + d_row;
        let col = self.position.col as isize + d_col;
        let (height, width) = (self.height as isize, self.width as isize);

        let reaches_goal = row == width - 1 && col == height - 1;
        let out_of_map = row < 0 || col < 0
            || row >= width || col >= height
            || row >= height || col >= width;

        self.step_count += 1;

        let (reward, done) = if out_of_map {
            debug!(%movement, position = %self.position, "Move out of the map rejected");
            (OUT_OF_MAP_REWARD, false)
        } else {
            let candidate = Pos::new(row as usize, col as usize);
            self.position = candidate;
            if reaches_goal {
                debug!(steps = self.step_count, "Goal reached");
                (GOAL_REACHED_REWARD, true)
            } else {
                (self.rewards.values()[[candidate.row, candidate.col]], false)
            }
        };
        trace!(%movement, position = %self.position, reward, done, "step");

        Step {
            position: self.position,
            reward,
            done,
            info: StepInfo::default(),
        }
    }

    /// Step with a raw action index, rejecting anything outside `0..=4`
    /// before the state is touched.
    pub fn step_index(&mut self, action: usize) -> Result<Step> {
        let movement = Movement::try_from(action)?;
        Ok(self.step(movement))
    }

    /// Current frame of the map with the agent drawn in.
    pub fn render(&self) -> String {
        render::draw(&self.map, self.position)
    }

    pub fn position(&self) -> Pos { self.position }

    pub fn step_count(&self) -> usize { self.step_count }

    pub fn goal(&self) -> Pos { self.goal }

    /// Whether any step can return `done`. Only square grids terminate.
    pub fn can_terminate(&self) -> bool {
        self.height == self.width
    }

    pub fn height(&self) -> usize { self.height }

    pub fn width(&self) -> usize { self.width }

    pub fn rewards(&self) -> &RewardField { &self.rewards }

    pub fn path(&self) -> &[Pos] { &self.path }

    pub fn map(&self) -> &MapBuffer { &self.map }

    /// Number of discrete observations, one per cell.
    pub fn observation_count(&self) -> usize {
        self.height * self.width
    }

    pub fn iter_all_coordinates(&self) -> EnvIter {
        EnvIter::new(self.height, self.width)
    }
}

/// Row-major walk over every cell.
pub struct EnvIter {
    next: Option<Pos>,
    height: usize,
    width: usize,
}

impl EnvIter {
    fn new(height: usize, width: usize) -> EnvIter {
        let next = if height > 0 && width > 0 { Some(Pos::new(0, 0)) } else { None };
        EnvIter { next, height, width }
    }
}

impl Iterator for EnvIter {
    type Item = Pos;

    fn next(&mut self) -> Option<Pos> {
        let current = self.next?;
        self.next = if current.col + 1 < self.width {
            Some(Pos::new(current.row, current.col + 1))
        } else if current.row + 1 < self.height {
            Some(Pos::new(current.row + 1, 0))
        } else {
            None
        };
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reward::PATH_REWARD;

    fn seeded(height: usize, width: usize) -> GridEnv {
        GridEnv::with_config(&GridConfig::new(height, width).with_seed(17)).unwrap()
    }

    #[test]
    fn in_bounds_moves_apply_their_delta() {
        let mut env = seeded(5, 5);
        for start in env.iter_all_coordinates().collect::<Vec<_>>() {
            for movement in Movement::actions() {
                let (dr, dc) = movement.into_vector();
                let (row, col) = (start.row as isize + dr, start.col as isize + dc);
                if row < 0 || col < 0 || row >= 5 || col >= 5 {
                    continue;
                }
                env.position = start;
                let step = env.step(movement);
                assert_eq!(step.position, Pos::new(row as usize, col as usize), "{} from {}", movement, start);
                assert_eq!(env.position(), step.position);
            }
        }
    }

    #[test]
    fn moves_off_the_grid_are_rejected() {
        let mut env = seeded(4, 4);
        let edges = [
            (Pos::new(0, 2), Movement::Up),
            (Pos::new(3, 1), Movement::Down),
            (Pos::new(2, 0), Movement::Left),
            (Pos::new(1, 3), Movement::Right),
        ];
        for &(start, movement) in edges.iter() {
            env.position = start;
            let step = env.step(movement);
            assert_eq!(step.position, start);
            assert_eq!(step.reward, OUT_OF_MAP_REWARD);
            assert!(!step.done);
        }
    }

    #[test]
    fn up_from_origin_is_rejected() {
        for &(h, w) in &[(1, 1), (3, 3), (19, 10), (2, 7)] {
            let mut env = seeded(h, w);
            let step = env.step(Movement::Up);
            assert_eq!(step.position, Pos::new(0, 0));
            assert_eq!(step.reward, -100.0);
            assert!(!step.done);
        }
    }

    #[test]
    fn three_by_three_episode_reaches_goal() {
        let mut env = seeded(3, 3);
        assert_eq!(env.reset(), Pos::new(0, 0));
        let moves = [Movement::Right, Movement::Down, Movement::Right];
        for movement in moves.iter() {
            assert!(!env.step(*movement).done);
        }
        let last = env.step(Movement::Down);
        assert_eq!(last.position, Pos::new(2, 2));
        assert_eq!(last.position, env.goal());
        assert!(last.done);
        assert_eq!(last.reward, 10.0);
        assert_eq!(last.info, StepInfo::default());
    }

    #[test]
    fn goal_reward_overrides_cell_value() {
        let mut env = seeded(3, 3);
        assert_eq!(env.rewards().get(env.goal()), Some(PATH_REWARD));
        env.position = Pos::new(2, 1);
        assert_eq!(env.step(Movement::Right).reward, GOAL_REACHED_REWARD);
    }

    #[test]
    fn reward_comes_from_the_entered_cell() {
        let mut env = seeded(6, 6);
        let expected = env.rewards().get(Pos::new(0, 1)).unwrap();
        assert_eq!(env.step(Movement::Right).reward, expected);
        let expected = env.rewards().get(Pos::new(0, 1)).unwrap();
        assert_eq!(env.step(Movement::Stay).reward, expected);
    }

    #[test]
    fn path_cells_pay_the_path_bonus() {
        let env = seeded(19, 10);
        assert!(!env.path().is_empty());
        for cell in env.path() {
            assert_eq!(env.rewards().get(*cell), Some(PATH_REWARD));
        }
    }

    #[test]
    fn step_count_includes_rejected_moves() {
        let mut env = seeded(3, 3);
        env.step(Movement::Up);
        env.step(Movement::Left);
        env.step(Movement::Right);
        env.step(Movement::Stay);
        assert_eq!(env.step_count(), 4);
    }

    #[test]
    fn reset_restores_start() {
        let mut env = seeded(3, 3);
        env.step(Movement::Down);
        env.step(Movement::Down);
        env.step(Movement::Right);
        env.step(Movement::Right);
        assert_eq!(env.reset(), Pos::new(0, 0));
        assert_eq!(env.position(), Pos::new(0, 0));
        assert_eq!(env.step_count(), 0);
    }

    #[test]
    fn stepping_after_done_keeps_evaluating() {
        let mut env = seeded(2, 2);
        env.step(Movement::Right);
        assert!(env.step(Movement::Down).done);

        let stay = env.step(Movement::Stay);
        assert!(stay.done);
        assert_eq!(stay.reward, GOAL_REACHED_REWARD);

        let left = env.step(Movement::Left);
        assert!(!left.done);
        assert_eq!(left.position, Pos::new(1, 0));
        assert_eq!(env.step_count(), 4);
    }

    #[test]
    fn invalid_action_index_is_rejected_before_mutation() {
        let mut env = seeded(3, 3);
        env.step(Movement::Right);
        let err = env.step_index(5).unwrap_err();
        assert!(matches!(err, GridError::InvalidAction(_)));
        assert_eq!(env.position(), Pos::new(0, 1));
        assert_eq!(env.step_count(), 1);

        assert_eq!(env.step_index(1).unwrap().position, Pos::new(1, 1));
    }

    #[test]
    fn movement_tokens() {
        assert_eq!("right".parse::<Movement>().unwrap(), Movement::Right);
        assert_eq!("Stay".parse::<Movement>().unwrap(), Movement::Stay);
        assert!("jump".parse::<Movement>().is_err());
        for (i, movement) in Movement::actions().into_iter().enumerate() {
            assert_eq!(movement.index(), i);
            assert_eq!(Movement::try_from(i).unwrap(), movement);
        }
    }

    #[test]
    fn zero_extent_is_an_error() {
        assert!(matches!(
            GridEnv::new(0, 3),
            Err(GridError::InvalidDimensions { height: 0, width: 3 })
        ));
        assert!(GridEnv::new(3, 0).is_err());
    }

    #[test]
    fn transposed_termination_on_non_square_grid() {
        // 2 rows, 3 columns: the termination cell (2, 1) lies below the grid.
        let mut env = seeded(2, 3);
        env.step(Movement::Down);
        let step = env.step(Movement::Right);
        assert_eq!(step.position, Pos::new(1, 1));
        assert!(!step.done);
        let step = env.step(Movement::Down);
        assert_eq!(step.position, Pos::new(1, 1));
        assert_eq!(step.reward, OUT_OF_MAP_REWARD);
        assert!(!step.done);

        // 3 rows, 2 columns: rows are limited by the width.
        let mut env = seeded(3, 2);
        env.step(Movement::Down);
        let step = env.step(Movement::Down);
        assert_eq!(step.position, Pos::new(1, 0));
        assert_eq!(step.reward, OUT_OF_MAP_REWARD);
    }

    #[test]
    fn non_square_grid_rejects_in_field_moves_past_the_transposed_extent() {
        // 2 rows, 3 columns: columns are limited by the height.
        let mut env = seeded(2, 3);
        let reachable: Vec<Pos> = env.iter_all_coordinates().filter(|p| p.col < 2).collect();
        for &start in reachable.iter() {
            for movement in Movement::actions() {
                let (dr, dc) = movement.into_vector();
                let (row, col) = (start.row as isize + dr, start.col as isize + dc);
                if row < 0 || col < 0 || row >= 2 || col >= 3 {
                    continue;
                }
                env.position = start;
                let step = env.step(movement);
                if col == 2 {
                    assert_eq!(step.position, start, "{} from {}", movement, start);
                    assert_eq!(step.reward, OUT_OF_MAP_REWARD);
                } else {
                    assert_eq!(step.position, Pos::new(row as usize, col as usize));
                }
                assert!(!step.done);
            }
        }
    }

    #[test]
    fn only_square_grids_terminate() {
        assert!(seeded(3, 3).can_terminate());
        assert!(!seeded(2, 3).can_terminate());
        assert!(!seeded(19, 10).can_terminate());
    }

    #[test]
    fn default_grid_never_reaches_goal() {
        let mut env = GridEnv::with_config(&GridConfig::default().with_seed(1)).unwrap();
        for _ in 0..30 {
            env.step(Movement::Down);
        }
        for _ in 0..30 {
            assert!(!env.step(Movement::Right).done);
        }
        assert_eq!(env.position(), Pos::new(9, 9));
        assert_eq!(env.goal(), Pos::new(18, 9));
    }

    #[test]
    fn same_seed_same_world() {
        let a = seeded(7, 5);
        let b = seeded(7, 5);
        assert_eq!(a.rewards().values(), b.rewards().values());
        assert_eq!(a.map(), b.map());
    }

    #[test]
    fn render_marks_agent() {
        let mut env = seeded(2, 2);
        env.step(Movement::Right);
        assert_eq!(env.render(), "+---+---+\n| O | @ |\n+---+---+\n| X | O |\n+---+---+\n");
    }

    #[test]
    fn iterates_every_cell_row_major() {
        let env = seeded(2, 3);
        let cells: Vec<Pos> = env.iter_all_coordinates().collect();
        assert_eq!(cells.len(), env.observation_count());
        assert_eq!(cells[0], Pos::new(0, 0));
        assert_eq!(cells[3], Pos::new(1, 0));
        assert_eq!(cells[5], Pos::new(1, 2));
    }
}
