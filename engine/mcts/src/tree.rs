//! Transposition cache with arena allocation.
//!
//! Node records live in a contiguous Vec and are referenced by NodeId
//! indices; a hash map from board fingerprint to NodeId makes transpositions
//! share one record.

use std::collections::HashMap;

use engine_core::Fingerprint;

use crate::node::{NodeId, NodeStats};

/// Statistics about the cache contents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStats {
    pub nodes: usize,
    pub expanded: usize,
    pub terminal: usize,
    pub total_visits: u64,
}

/// Fingerprint-keyed store of node statistics.
#[derive(Debug, Default)]
pub struct SearchCache {
    index: HashMap<Fingerprint, NodeId>,
    nodes: Vec<NodeStats>,
}

impl SearchCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the record for a fingerprint.
    #[inline]
    pub fn lookup(&self, fingerprint: &Fingerprint) -> Option<NodeId> {
        self.index.get(fingerprint).copied()
    }

    /// Allocate a record for a fingerprint not yet in the cache.
    pub fn insert(&mut self, fingerprint: Fingerprint, node: NodeStats) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        self.index.insert(fingerprint, id);
        id
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> &NodeStats {
        &self.nodes[id.0 as usize]
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut NodeStats {
        &mut self.nodes[id.0 as usize]
    }

    /// Record for a fingerprint, if present.
    pub fn node(&self, fingerprint: &Fingerprint) -> Option<&NodeStats> {
        self.lookup(fingerprint).map(|id| self.get(id))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn clear(&mut self) {
        self.index.clear();
        self.nodes.clear();
    }

    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats {
            nodes: self.nodes.len(),
            ..Default::default()
        };
        for node in &self.nodes {
            if node.expanded {
                stats.expanded += 1;
            }
            if node.is_terminal() {
                stats.terminal += 1;
            }
            stats.total_visits += node.visits as u64;
        }
        stats
    }

    /// Check the bookkeeping invariants of every record, returning a
    /// description of the first violation.
    ///
    /// - `N(s)` equals the sum of `N(s,a)`
    /// - the prior sums to 1 over legal actions and is zero elsewhere
    /// - no illegal edge has visits
    /// - terminal records are never expanded
    pub fn check_invariants(&self) -> Result<(), String> {
        for (i, node) in self.nodes.iter().enumerate() {
            if node.is_terminal() {
                if node.expanded {
                    return Err(format!("node {i}: terminal node was expanded"));
                }
                continue;
            }
            if !node.expanded {
                continue;
            }
            let edge_sum: u32 = node.edges.iter().map(|e| e.visits).sum();
            if edge_sum != node.visits {
                return Err(format!(
                    "node {i}: N(s)={} but sum N(s,a)={edge_sum}",
                    node.visits
                ));
            }
            let mut legal_mass = 0.0f32;
            for (a, (&p, edge)) in node.priors.iter().zip(&node.edges).enumerate() {
                if node.legal.is_legal(a) {
                    legal_mass += p;
                } else if p != 0.0 || edge.visits != 0 {
                    return Err(format!("node {i}: illegal action {a} has prior or visits"));
                }
            }
            if (legal_mass - 1.0).abs() > 1e-4 {
                return Err(format!("node {i}: prior sums to {legal_mass}"));
            }
        }
        Ok(())
    }
}
