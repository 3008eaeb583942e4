//! Construction parameters for a [`GridEnv`](crate::environment::GridEnv).

/// Curvature weight of the decorative path through the map.
pub const DEFAULT_CURVATURE: f64 = -0.9;

#[derive(Debug, Clone, PartialEq)]
pub struct GridConfig {
    /// Number of rows
    pub height: usize,
    /// Number of columns
    pub width: usize,
    /// Seed for the reward field; `None` draws one from the thread rng
    pub seed: Option<u64>,
    /// Middle control point weight of the path curve
    pub curvature: f64,
}

impl GridConfig {
    pub fn new(height: usize, width: usize) -> Self {
        Self {
            height,
            width,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_curvature(mut self, curvature: f64) -> Self {
        self.curvature = curvature;
        self
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            height: 19,
            width: 10,
            seed: None,
            curvature: DEFAULT_CURVATURE,
        }
    }
}
