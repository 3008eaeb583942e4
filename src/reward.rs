//! Per-cell reward field.

use ndarray::Array2;
use rand::distributions::StandardNormal;
use rand::Rng;

use crate::environment::Pos;

/// Base value of the goal cell.
pub const GOAL_REWARD: f64 = 2.0;
/// Value of every cell on the suggested path.
pub const PATH_REWARD: f64 = 1.0;

#[derive(Debug, Clone)]
pub struct RewardField {
    values: Array2<f64>,
}

impl RewardField {
    /// Fill a `height x width` field with standard normal samples, then force
    /// the goal to [`GOAL_REWARD`] and each path cell to [`PATH_REWARD`].
    ///
    /// The path is applied last, so a path crossing the goal leaves it at 1.
    pub fn generate<R: Rng + ?Sized>(height: usize, width: usize, rng: &mut R, goal: Pos, path: &[Pos]) -> Self {
        let mut values = Array2::<f64>::zeros((height, width));
        for v in values.iter_mut() {
            *v = rng.sample(StandardNormal);
        }
        values[[goal.row, goal.col]] = GOAL_REWARD;
        for cell in path {
            values[[cell.row, cell.col]] = PATH_REWARD;
        }
        Self { values }
    }

    pub fn get(&self, pos: Pos) -> Option<f64> {
        self.values.get((pos.row, pos.col)).copied()
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }
}
