//! Systems feeding picks, unit choices and fetched data into the store.

use bevy::prelude::*;
use cm_core::{SelectionChanged, TerritoryPicked, UnitSelected};
use cm_map::OccupiedTerritories;
use cm_world::{ClanCatalog, Roster, TerritoryCatalog, Unit};

use crate::store::SelectionStore;

/// Fresh data delivered by a completed fetch.
#[derive(Event, Debug, Clone)]
pub enum CatalogUpdate {
    Territories(TerritoryCatalog),
    Clans(ClanCatalog),
    Roster(Roster),
    UnitDetail(Unit),
}

fn announce(store: &SelectionStore, changed: &mut EventWriter<SelectionChanged>) {
    changed.send(SelectionChanged {
        territory: store.territory_id(),
        unit: store.unit_id(),
    });
}

/// Apply data updates first so picks in the same frame resolve against them.
pub fn apply_catalog_updates(
    mut updates: EventReader<CatalogUpdate>,
    mut store: ResMut<SelectionStore>,
    mut occupied: ResMut<OccupiedTerritories>,
    mut changed: EventWriter<SelectionChanged>,
) {
    let mut any = false;
    for update in updates.read() {
        any |= match update.clone() {
            CatalogUpdate::Territories(territories) => store.on_territories_refreshed(territories),
            CatalogUpdate::Clans(clans) => store.on_clans_refreshed(clans),
            CatalogUpdate::Roster(roster) => {
                occupied.0 = roster.occupied_territories();
                store.on_roster_refreshed(roster)
            }
            CatalogUpdate::UnitDetail(unit) => store.on_unit_detail(unit),
        };
    }
    if any {
        announce(&store, &mut changed);
    }
}

pub fn apply_picks(
    mut picks: EventReader<TerritoryPicked>,
    mut store: ResMut<SelectionStore>,
    mut changed: EventWriter<SelectionChanged>,
) {
    let mut any = false;
    for TerritoryPicked(id) in picks.read() {
        any |= store.on_territory_picked(*id);
    }
    if any {
        debug!("territory selection is now {:?}", store.territory_id());
        announce(&store, &mut changed);
    }
}

pub fn apply_unit_selection(
    mut selected: EventReader<UnitSelected>,
    mut store: ResMut<SelectionStore>,
    mut changed: EventWriter<SelectionChanged>,
) {
    let mut any = false;
    for UnitSelected(id) in selected.read() {
        any |= store.on_unit_selected(*id);
    }
    if any {
        debug!("unit selection is now {:?}", store.unit_id());
        announce(&store, &mut changed);
    }
}
