use bevy::prelude::*;
use cm_core::MapSystems;

pub mod store;
pub mod systems;

pub use store::SelectionStore;
pub use systems::CatalogUpdate;

/// Selection plugin for clanmap.
/// Turns picks, unit choices and fetched catalogs into one selection state.
pub struct CmSelectionPlugin;

impl Plugin for CmSelectionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SelectionStore>()
            .add_event::<CatalogUpdate>()
            .add_systems(Update, (
                systems::apply_catalog_updates,
                systems::apply_picks,
                systems::apply_unit_selection,
            ).chain().in_set(MapSystems::Selection));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::state::app::StatesPlugin;
    use cm_core::{CmCorePlugin, SelectionChanged, TerritoryId, TerritoryPicked, UnitId};
    use cm_map::OccupiedTerritories;
    use cm_world::{Roster, RosterEntry, Territory, TerritoryCatalog, Unit};

    /// Every `SelectionChanged` seen by a reader since the last `take`.
    #[derive(Resource, Default)]
    struct Announced(Vec<SelectionChanged>);

    fn record(mut changes: EventReader<SelectionChanged>, mut announced: ResMut<Announced>) {
        announced.0.extend(changes.read().copied());
    }

    fn app() -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, StatesPlugin, CmCorePlugin, CmSelectionPlugin))
            .init_resource::<OccupiedTerritories>()
            .init_resource::<Announced>()
            .add_systems(Update, record.after(MapSystems::Selection));
        app
    }

    fn take(app: &mut App) -> Vec<SelectionChanged> {
        std::mem::take(&mut app.world_mut().resource_mut::<Announced>().0)
    }

    #[test]
    fn repeated_pick_announces_once() {
        let mut app = app();
        app.world_mut().send_event(TerritoryPicked(Some(TerritoryId(2))));
        app.update();
        assert_eq!(take(&mut app).len(), 1);

        app.world_mut().send_event(TerritoryPicked(Some(TerritoryId(2))));
        app.update();
        app.update();
        assert!(take(&mut app).is_empty());

        app.world_mut().send_event(TerritoryPicked(Some(TerritoryId(5))));
        app.update();
        assert_eq!(
            take(&mut app),
            vec![SelectionChanged { territory: Some(TerritoryId(5)), unit: None }]
        );
    }

    #[test]
    fn update_and_pick_in_same_frame_resolve() {
        let mut app = app();
        let catalog = TerritoryCatalog::new(vec![Territory::new(TerritoryId(2), "Nara")]);
        app.world_mut().send_event(CatalogUpdate::Territories(catalog));
        app.world_mut().send_event(TerritoryPicked(Some(TerritoryId(2))));
        app.update();

        let store = app.world().resource::<SelectionStore>();
        assert_eq!(store.territory().map(|t| t.name.as_str()), Some("Nara"));
        assert_eq!(
            take(&mut app).last().copied(),
            Some(SelectionChanged { territory: Some(TerritoryId(2)), unit: None })
        );
    }

    #[test]
    fn roster_update_marks_occupied_lands() {
        let mut app = app();
        let roster = Roster::new(vec![RosterEntry::new(Unit::new(UnitId(3), "0xabc", TerritoryId(9)))]);
        app.world_mut().send_event(CatalogUpdate::Roster(roster));
        app.update();

        let occupied = app.world().resource::<OccupiedTerritories>();
        assert!(occupied.0.contains(&TerritoryId(9)));
    }
}
