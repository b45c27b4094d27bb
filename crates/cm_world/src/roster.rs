//! The connected player's owned units.

use crate::unit::Unit;
use cm_core::{TerritoryId, UnitId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One owned NFT.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub unit: Unit,
    /// Display name of the token, e.g. "SamuraiWarrior #12".
    #[serde(default)]
    pub token_name: String,
}

impl RosterEntry {
    pub fn new(unit: Unit) -> Self {
        let token_name = format!("SamuraiWarrior {}", unit.id);
        Self { unit, token_name }
    }
}

/// All units owned by the connected player. Replaced wholesale on refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    pub entries: Vec<RosterEntry>,
}

/// The player's units on one territory, grouped the way the land panel lists them.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct UnitsAtTerritory<'a> {
    /// Present and not camped.
    pub available: Vec<&'a RosterEntry>,
    pub camped: Vec<&'a RosterEntry>,
    pub deployed: Vec<&'a RosterEntry>,
}

impl Roster {
    pub fn new(entries: Vec<RosterEntry>) -> Self {
        Self { entries }
    }

    pub fn get(&self, id: UnitId) -> Option<&RosterEntry> {
        self.entries.iter().find(|e| e.unit.id == id)
    }

    /// Replace the stored record for `unit`. Returns false if the unit is not owned.
    pub fn replace_unit(&mut self, unit: Unit) -> bool {
        match self.entries.iter_mut().find(|e| e.unit.id == unit.id) {
            Some(entry) => {
                entry.unit = unit;
                true
            }
            None => false,
        }
    }

    /// Group the units standing on `territory`.
    ///
    /// A deployed unit appears under `deployed` and also under `available`
    /// when it is not camped, matching the land panel's two independent lists.
    pub fn at_territory(&self, territory: TerritoryId) -> UnitsAtTerritory<'_> {
        let mut grouped = UnitsAtTerritory::default();
        for entry in self.entries.iter().filter(|e| e.unit.is_at(territory)) {
            if entry.unit.is_camped() {
                grouped.camped.push(entry);
            } else {
                grouped.available.push(entry);
            }
            if entry.unit.is_deployed() {
                grouped.deployed.push(entry);
            }
        }
        grouped
    }

    /// Territories hosting at least one owned unit.
    pub fn occupied_territories(&self) -> HashSet<TerritoryId> {
        self.entries.iter().map(|e| e.unit.current_territory).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RosterEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(id: u64, land: u32) -> Unit {
        Unit::new(UnitId(id), "0xabc", TerritoryId(land))
    }

    #[test]
    fn groups_units_by_state() {
        let mut camped = unit(2, 5);
        camped.camp_start_time = 10;
        let mut deployed = unit(3, 5);
        deployed.deployment_start_time = 20;
        let roster = Roster::new(vec![
            RosterEntry::new(unit(1, 5)),
            RosterEntry::new(camped),
            RosterEntry::new(deployed),
            RosterEntry::new(unit(4, 6)),
        ]);

        let grouped = roster.at_territory(TerritoryId(5));
        let ids = |list: &[&RosterEntry]| list.iter().map(|e| e.unit.id.0).collect::<Vec<_>>();
        assert_eq!(ids(&grouped.available), vec![1, 3]);
        assert_eq!(ids(&grouped.camped), vec![2]);
        assert_eq!(ids(&grouped.deployed), vec![3]);
    }

    #[test]
    fn replace_unit_only_touches_owned() {
        let mut roster = Roster::new(vec![RosterEntry::new(unit(1, 5))]);
        let mut moved = unit(1, 8);
        moved.attack = 3;
        assert!(roster.replace_unit(moved));
        assert_eq!(roster.get(UnitId(1)).map(|e| e.unit.current_territory), Some(TerritoryId(8)));
        assert!(!roster.replace_unit(unit(9, 1)));
    }

    #[test]
    fn occupied_territories_are_unique() {
        let roster = Roster::new(vec![
            RosterEntry::new(unit(1, 5)),
            RosterEntry::new(unit(2, 5)),
            RosterEntry::new(unit(3, 7)),
        ]);
        let occupied = roster.occupied_territories();
        assert_eq!(occupied.len(), 2);
        assert!(occupied.contains(&TerritoryId(7)));
    }
}
