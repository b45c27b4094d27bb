use bevy::prelude::*;

pub mod clan;
pub mod connectivity;
pub mod eligibility;
pub mod roster;
pub mod territory;
pub mod unit;

pub use clan::{Clan, ClanCatalog};
pub use connectivity::{AdjacencyTable, Connectivity, TerritoryGraph, Unrestricted};
pub use eligibility::{EligibilityContext, eligible};
pub use roster::{Roster, RosterEntry, UnitsAtTerritory};
pub use territory::{Territory, TerritoryCatalog};
pub use unit::{ChainUnitRecord, Unit, UnitRecordError, UnitStatus};

/// The connected player: wallet address and clan membership.
///
/// The clan decides which territory is "home" and which lands the player's
/// units may collect from.
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerProfile {
    pub address: String,
    pub clan: Option<cm_core::ClanId>,
}

/// World plugin for clanmap.
/// Owns the player profile and the move graph used by eligibility checks.
pub struct CmWorldPlugin;

impl Plugin for CmWorldPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PlayerProfile>()
            .init_resource::<TerritoryGraph>();
    }
}
