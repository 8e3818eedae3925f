//! Per-state search statistics.
//!
//! Each record holds everything the search knows about one canonical state:
//! its terminal status, the masked prior, the legal mask and the per-edge
//! visit counts and mean values.

use engine_core::{ActionMask, Outcome};

/// Index into the node arena. Using a newtype for type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

/// Statistics of one edge `(s, a)`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EdgeStats {
    /// N(s,a)
    pub visits: u32,
    /// Q(s,a), meaningful only when `visits > 0`.
    pub q: f32,
}

impl EdgeStats {
    /// Fold `value` into the running mean.
    #[inline]
    pub fn update(&mut self, value: f32) {
        let n = self.visits as f32;
        self.q = (n * self.q + value) / (n + 1.0);
        self.visits += 1;
    }
}

/// Statistics of one canonical state.
#[derive(Debug, Clone)]
pub struct NodeStats {
    /// Game result from the mover's perspective, cached on first visit.
    pub terminal: Outcome,

    /// Set once, when the prior and mask are stored.
    pub expanded: bool,

    /// N(s)
    pub visits: u32,

    /// Masked, normalised prior P(s). Empty until expanded.
    pub priors: Vec<f32>,

    /// Legal actions. Empty until expanded.
    pub legal: ActionMask,

    /// One entry per action index. Empty until expanded.
    pub edges: Vec<EdgeStats>,
}

impl NodeStats {
    pub fn new(terminal: Outcome) -> Self {
        Self {
            terminal,
            expanded: false,
            visits: 0,
            priors: Vec::new(),
            legal: ActionMask::none(0),
            edges: Vec::new(),
        }
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.terminal.is_terminal()
    }

    /// Store prior and mask. Only the first call has an effect.
    pub fn expand(&mut self, priors: Vec<f32>, legal: ActionMask) {
        if self.expanded {
            return;
        }
        self.edges = vec![EdgeStats::default(); priors.len()];
        self.priors = priors;
        self.legal = legal;
        self.visits = 0;
        self.expanded = true;
    }

    /// PUCT score of a legal action.
    #[inline]
    pub fn puct(&self, action: usize, c_puct: f32, sqrt_visits: f32) -> f32 {
        const EPS: f32 = 1e-8;
        let edge = &self.edges[action];
        let prior = self.priors[action];
        if edge.visits > 0 {
            edge.q + c_puct * prior * sqrt_visits / (1.0 + edge.visits as f32)
        } else {
            c_puct * prior * (self.visits as f32 + EPS).sqrt()
        }
    }

    /// Legal action with the highest PUCT score; ties go to the lowest index.
    pub fn select_action(&self, c_puct: f32) -> Option<usize> {
        let sqrt_visits = (self.visits as f32).sqrt();
        let mut best: Option<(usize, f32)> = None;
        for action in self.legal.legal_actions() {
            let u = self.puct(action, c_puct, sqrt_visits);
            match best {
                Some((_, best_u)) if u <= best_u => {}
                _ => best = Some((action, u)),
            }
        }
        best.map(|(a, _)| a)
    }

    /// Record a backed-up value through `action`.
    pub fn backup(&mut self, action: usize, value: f32) {
        self.edges[action].update(value);
        self.visits += 1;
    }

    /// Visit counts per action index.
    pub fn visit_counts(&self) -> Vec<u32> {
        self.edges.iter().map(|e| e.visits).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expanded(priors: Vec<f32>, legal: Vec<bool>) -> NodeStats {
        let mut node = NodeStats::new(Outcome::Ongoing);
        node.expand(priors, ActionMask::new(legal));
        node
    }

    #[test]
    fn test_edge_running_mean() {
        let mut edge = EdgeStats::default();
        edge.update(1.0);
        edge.update(-1.0);
        edge.update(1.0);
        assert_eq!(edge.visits, 3);
        assert!((edge.q - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_expand_only_once() {
        let mut node = expanded(vec![0.5, 0.5], vec![true, true]);
        node.backup(0, 1.0);
        node.expand(vec![1.0, 0.0], ActionMask::new(vec![true, false]));
        assert_eq!(node.priors, vec![0.5, 0.5]);
        assert_eq!(node.visits, 1);
    }

    #[test]
    fn test_select_prefers_highest_prior_when_unvisited() {
        let node = expanded(vec![0.2, 0.5, 0.3], vec![true, true, true]);
        assert_eq!(node.select_action(1.0), Some(1));
    }

    #[test]
    fn test_select_ties_go_to_lowest_index() {
        let node = expanded(vec![0.0, 0.25, 0.25, 0.25, 0.25], vec![false, true, true, true, true]);
        assert_eq!(node.select_action(1.0), Some(1));
    }

    #[test]
    fn test_select_skips_illegal_actions() {
        let node = expanded(vec![0.9, 0.1], vec![false, true]);
        assert_eq!(node.select_action(1.0), Some(1));
    }

    #[test]
    fn test_select_none_without_legal_actions() {
        let node = NodeStats::new(Outcome::Ongoing);
        assert_eq!(node.select_action(1.0), None);
    }

    #[test]
    fn test_visits_equal_edge_sum() {
        let mut node = expanded(vec![0.5, 0.5], vec![true, true]);
        node.backup(0, 1.0);
        node.backup(1, -1.0);
        node.backup(1, 0.0);
        let edge_sum: u32 = node.visit_counts().iter().sum();
        assert_eq!(node.visits, edge_sum);
    }
}
