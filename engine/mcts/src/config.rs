//! MCTS configuration parameters.

/// Configuration for Monte Carlo Tree Search.
#[derive(Debug, Clone, PartialEq)]
pub struct MctsConfig {
    /// Number of simulations to run per `action_probabilities` call.
    /// A budget of zero is treated as one so the root is always expanded.
    pub num_simulations: u32,

    /// Exploration constant for the PUCT formula.
    /// Higher values encourage exploration, lower values favor exploitation.
    pub c_puct: f32,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            num_simulations: 25,
            c_puct: 1.0,
        }
    }
}

impl MctsConfig {
    /// Config used during self-play.
    pub fn for_training() -> Self {
        Self::default()
    }

    /// Config for evaluation matches against baselines.
    pub fn for_evaluation() -> Self {
        Self {
            num_simulations: 50,
            c_puct: 1.0,
        }
    }

    /// Create a fast config for testing.
    pub fn for_testing() -> Self {
        Self {
            num_simulations: 16,
            c_puct: 1.0,
        }
    }

    /// Builder pattern: set number of simulations.
    pub fn with_simulations(mut self, n: u32) -> Self {
        self.num_simulations = n;
        self
    }

    /// Builder pattern: set c_puct exploration constant.
    pub fn with_c_puct(mut self, c: f32) -> Self {
        self.c_puct = c;
        self
    }
}
