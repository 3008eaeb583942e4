//! # grid_map
//!
//! A tabular grid world for reinforcement learning. The agent starts in the
//! top-left corner and is rewarded for reaching the bottom-right one:
//!
//! ```text
//!            ________
//!           | @ |  O |
//!     begin |___|____|
//!           | X |  O |
//!           |___|____| end
//! ```
//!
//! Every cell carries a fixed reward drawn from a standard normal, cells on a
//! decorative Bézier path pay `1`, leaving the grid costs `-100` and reaching
//! the goal pays `10`.

pub mod agent;
pub mod config;
pub mod environment;
pub mod error;
pub mod path;
pub mod policy;
pub mod render;
pub mod reward;
pub mod rl;

pub use config::GridConfig;
pub use environment::{GridEnv, Movement, Pos, Step, StepInfo};
pub use error::{GridError, Result};
