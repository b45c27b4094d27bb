use bevy::prelude::*;
use cm_core::MapSystems;

pub mod config;
pub mod error;
pub mod fetch;
pub mod ron_io;
pub mod source;

pub use config::{CONFIG_PATH, MapConfig};
pub use error::CatalogError;
pub use fetch::{
    CatalogHandle, FetchFailed, FetchKind, FetchRequest, FetchStatus, Fetched, PendingFetches, UnitRefreshTimer,
    run_fetch,
};
pub use source::{CatalogSource, RonCatalogSource};

/// Catalog plugin for clanmap.
/// Reads territories, clans, adjacency and the player's units through a
/// [`CatalogHandle`] and feeds them to the selection store.
pub struct CmCatalogPlugin;

impl Plugin for CmCatalogPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PendingFetches>()
            .init_resource::<FetchStatus>()
            .init_resource::<UnitRefreshTimer>()
            .add_event::<FetchRequest>()
            .add_event::<FetchFailed>()
            .add_systems(Startup, fetch::request_catalogs)
            .add_systems(Update, (
                fetch::request_selected_unit,
                fetch::tick_unit_refresh,
                fetch::refresh_after_command,
                fetch::spawn_fetches,
                fetch::poll_fetches,
                fetch::record_fetch_failures,
            ).chain().in_set(MapSystems::Fetch));
    }
}
