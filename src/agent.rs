use crate::environment::{GridEnv, Movement, Pos};

pub struct Agent {
    pub pos: Pos,
    pub reward: f64,
    pub moves: usize,
}

impl Agent {
    /// Start a new episode: the environment is reset.
    pub fn new(env: &mut GridEnv) -> Self
    {
        Self {
            pos: env.reset(),
            reward: 0.0,
            moves: 0,
        }
    }

    /// Returns the episode return once the goal is reached.
    pub fn r#move(&mut self, env: &mut GridEnv, movement: Movement) -> Option<f64>
    {
        let step = env.step(movement);
        self.reward += step.reward;
        self.pos = step.position;
        self.moves += 1;

        if step.done {
            Some(self.reward)
        } else {
            None
        }
    }
}
