//! Session selection state.
//!
//! The selected territory and the selected unit are independent axes. Ids
//! are kept across catalog refreshes; the resolved records follow whatever
//! catalog arrived last and are `None` while it is still pending.

use bevy::prelude::*;
use cm_core::{ClanId, CommandSet, TerritoryId, UnitId};
use cm_world::{
    ClanCatalog, Connectivity, EligibilityContext, Roster, Territory, TerritoryCatalog, Unit, eligible,
};

/// Selection plus the catalogs it is resolved against.
#[derive(Resource, Debug, Default)]
pub struct SelectionStore {
    territory_id: Option<TerritoryId>,
    territory: Option<Territory>,
    unit_id: Option<UnitId>,
    unit: Option<Unit>,
    detail_open: bool,
    territories: TerritoryCatalog,
    clans: ClanCatalog,
    roster: Roster,
}

impl SelectionStore {
    /// Handle a pick result. Returns whether anything changed.
    pub fn on_territory_picked(&mut self, id: Option<TerritoryId>) -> bool {
        match id {
            Some(id) => {
                if self.territory_id == Some(id) {
                    return false;
                }
                self.territory_id = Some(id);
                self.territory = self.territories.get(id).cloned();
                self.detail_open = true;
                true
            }
            None => {
                let changed = self.territory_id.is_some() || self.territory.is_some() || self.detail_open;
                self.territory_id = None;
                self.territory = None;
                self.detail_open = false;
                changed
            }
        }
    }

    /// Replace both catalogs and re-resolve the selected territory.
    pub fn on_catalog_refreshed(&mut self, territories: TerritoryCatalog, clans: ClanCatalog) -> bool {
        let clans_changed = self.clans != clans;
        self.clans = clans;
        self.on_territories_refreshed(territories) || clans_changed
    }

    /// Replace the territory catalog only.
    pub fn on_territories_refreshed(&mut self, territories: TerritoryCatalog) -> bool {
        self.territories = territories;
        let resolved = self.territory_id.and_then(|id| self.territories.get(id).cloned());
        let changed = resolved != self.territory;
        self.territory = resolved;
        changed
    }

    /// Replace the clan catalog only.
    pub fn on_clans_refreshed(&mut self, clans: ClanCatalog) -> bool {
        let changed = self.clans != clans;
        self.clans = clans;
        changed
    }

    /// Select one of the player's units.
    pub fn on_unit_selected(&mut self, id: UnitId) -> bool {
        let resolved = self.roster.get(id).map(|e| e.unit.clone());
        let changed = self.unit_id != Some(id) || self.unit != resolved;
        self.unit_id = Some(id);
        self.unit = resolved;
        changed
    }

    /// Replace the roster and re-resolve the selected unit.
    pub fn on_roster_refreshed(&mut self, roster: Roster) -> bool {
        self.roster = roster;
        let resolved = self
            .unit_id
            .and_then(|id| self.roster.get(id))
            .map(|e| e.unit.clone());
        let changed = resolved != self.unit;
        self.unit = resolved;
        changed
    }

    /// Apply the live record of a unit. Ignored unless it is the selected one.
    pub fn on_unit_detail(&mut self, unit: Unit) -> bool {
        if self.unit_id != Some(unit.id) {
            return false;
        }
        self.roster.replace_unit(unit.clone());
        let changed = self.unit.as_ref() != Some(&unit);
        self.unit = Some(unit);
        changed
    }

    /// Hide the land panel without dropping the selection.
    pub fn close_detail(&mut self) -> bool {
        std::mem::replace(&mut self.detail_open, false)
    }

    pub fn territory_id(&self) -> Option<TerritoryId> {
        self.territory_id
    }

    /// Resolved record; `None` while the catalog is pending.
    pub fn territory(&self) -> Option<&Territory> {
        self.territory.as_ref()
    }

    pub fn unit_id(&self) -> Option<UnitId> {
        self.unit_id
    }

    /// Resolved record; `None` while the roster is pending or the unit is not owned.
    pub fn unit(&self) -> Option<&Unit> {
        self.unit.as_ref()
    }

    pub fn detail_open(&self) -> bool {
        self.detail_open
    }

    pub fn territories(&self) -> &TerritoryCatalog {
        &self.territories
    }

    pub fn clans(&self) -> &ClanCatalog {
        &self.clans
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Commands enabled for the current selection.
    pub fn eligible_commands<C: Connectivity + ?Sized>(
        &self,
        player_clan: Option<ClanId>,
        connectivity: &C,
    ) -> CommandSet {
        let ctx = EligibilityContext::new(&self.clans, player_clan, connectivity);
        eligible(self.unit(), self.territory(), &ctx)
    }
}
