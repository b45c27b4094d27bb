use bevy::prelude::*;

pub mod command;
pub mod events;
pub mod ids;
pub mod phase;

pub use command::{CommandKind, CommandSet};
pub use events::{CommandRequested, SelectionChanged, TerritoryPicked, UnitSelected};
pub use ids::{ClanId, TerritoryId, UnitId};
pub use phase::{MapPhase, MapPhaseChanged, log_phase_changes};

/// Ordering of the map's per-frame work.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapSystems {
    /// Pointer and keyboard input, including picking.
    Input,
    /// Applying finished catalog and roster fetches.
    Fetch,
    /// Selection state transitions.
    Selection,
    /// Highlight, HUD and other consumers of the selection.
    Presentation,
}

/// Core plugin providing the shared vocabulary for clanmap.
/// Registers the map phase state and the events exchanged between the
/// picking, selection and HUD crates.
pub struct CmCorePlugin;

impl Plugin for CmCorePlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<MapPhase>()
            .add_event::<MapPhaseChanged>()
            .add_event::<TerritoryPicked>()
            .add_event::<UnitSelected>()
            .add_event::<SelectionChanged>()
            .add_event::<CommandRequested>()
            .configure_sets(Update, (
                MapSystems::Input,
                MapSystems::Fetch,
                MapSystems::Selection,
                MapSystems::Presentation,
            ).chain())
            .add_systems(Update, log_phase_changes);
    }
}
