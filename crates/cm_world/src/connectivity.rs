//! Territory connectivity used by the Move rule.
//!
//! The map's move graph is supplied from outside; eligibility only asks
//! whether an ordered pair of territories is adjacent.

use bevy::prelude::*;
use cm_core::TerritoryId;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Adjacency check for an ordered territory pair.
pub trait Connectivity {
    fn adjacent(&self, from: TerritoryId, to: TerritoryId) -> bool;
}

impl<F> Connectivity for F
where
    F: Fn(TerritoryId, TerritoryId) -> bool,
{
    fn adjacent(&self, from: TerritoryId, to: TerritoryId) -> bool {
        self(from, to)
    }
}

/// Every pair is adjacent; the base-to-frontier clause still applies.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unrestricted;

impl Connectivity for Unrestricted {
    fn adjacent(&self, from: TerritoryId, to: TerritoryId) -> bool {
        from != to
    }
}

/// Undirected edge list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjacencyTable {
    pub edges: Vec<(TerritoryId, TerritoryId)>,
    #[serde(skip)]
    neighbors: HashMap<TerritoryId, HashSet<TerritoryId>>,
}

impl AdjacencyTable {
    pub fn new(edges: Vec<(TerritoryId, TerritoryId)>) -> Self {
        let mut table = Self {
            edges,
            neighbors: HashMap::new(),
        };
        table.rebuild();
        table
    }

    /// Rebuild the lookup after deserializing.
    pub fn rebuild(&mut self) {
        self.neighbors.clear();
        for &(a, b) in &self.edges {
            if a == b {
                continue;
            }
            self.neighbors.entry(a).or_default().insert(b);
            self.neighbors.entry(b).or_default().insert(a);
        }
    }
}

impl Connectivity for AdjacencyTable {
    fn adjacent(&self, from: TerritoryId, to: TerritoryId) -> bool {
        self.neighbors
            .get(&from)
            .is_some_and(|set| set.contains(&to))
    }
}

/// Move graph resource used by the running map.
#[derive(Resource, Debug, Clone, Default)]
pub enum TerritoryGraph {
    /// No adjacency data was supplied.
    #[default]
    Unrestricted,
    Table(AdjacencyTable),
}

impl Connectivity for TerritoryGraph {
    fn adjacent(&self, from: TerritoryId, to: TerritoryId) -> bool {
        match self {
            Self::Unrestricted => Unrestricted.adjacent(from, to),
            Self::Table(table) => table.adjacent(from, to),
        }
    }
}
