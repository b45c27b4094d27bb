//! Clans: player factions, each with a home base territory.

use cm_core::{ClanId, TerritoryId};
use serde::{Deserialize, Serialize};

/// A player faction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clan {
    pub id: ClanId,
    pub name: String,
    /// Home base. Units heal here and may only move to or from it.
    pub base_territory: TerritoryId,
}

impl Clan {
    pub fn new(id: ClanId, name: impl Into<String>, base_territory: TerritoryId) -> Self {
        Self {
            id,
            name: name.into(),
            base_territory,
        }
    }
}

/// The latest clan catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClanCatalog {
    pub clans: Vec<Clan>,
}

impl ClanCatalog {
    pub fn new(clans: Vec<Clan>) -> Self {
        Self { clans }
    }

    pub fn get(&self, id: ClanId) -> Option<&Clan> {
        self.clans.iter().find(|c| c.id == id)
    }

    /// Home territory of `clan`, if the clan is known.
    pub fn home_of(&self, clan: Option<ClanId>) -> Option<TerritoryId> {
        clan.and_then(|id| self.get(id)).map(|c| c.base_territory)
    }

    /// Display name for a governing clan, "Neutral zone" when unclaimed or unknown.
    pub fn governance_name(&self, clan: Option<ClanId>) -> &str {
        clan.and_then(|id| self.get(id))
            .map(|c| c.name.as_str())
            .unwrap_or("Neutral zone")
    }

    pub fn len(&self) -> usize {
        self.clans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clans.is_empty()
    }
}
