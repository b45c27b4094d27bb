use bevy::prelude::*;
use cm_core::{MapPhase, MapSystems};

pub mod harvest;
pub mod highlight;
pub mod index;
pub mod picking;

pub use harvest::{HarvestReport, SceneNode, TerritoryNode, WorldScene, bind_scene_nodes, spawn_world_scene};
pub use highlight::{
    HighlightController, HighlightPlan, HighlightStyle, OccupiedTerritories, SelectionMarker, Treatment,
};
pub use index::{SurfaceBounds, TerritoryIndex, TerritoryMeshBinding, TerritorySurface};
pub use picking::{
    AabbCaster, MeshSurfaceCaster, PickCamera, PickingService, PointerOverUi, SurfaceCaster, SurfaceHit,
    Viewport, pick,
};

/// Map plugin for clanmap.
/// Owns the territory index, pointer picking and the selection highlight.
pub struct CmMapPlugin;

impl Plugin for CmMapPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TerritoryIndex>()
            .init_resource::<PickingService>()
            .init_resource::<PointerOverUi>()
            .init_resource::<HighlightController>()
            .init_resource::<HighlightStyle>()
            .init_resource::<OccupiedTerritories>()
            .add_systems(Startup, highlight::setup_highlight_assets)
            .add_systems(Update, picking::pick_on_click
                .run_if(in_state(MapPhase::Ready))
                .in_set(MapSystems::Input))
            .add_systems(Update, (
                highlight::apply_highlight,
                highlight::lift_occupied,
            ).chain().in_set(MapSystems::Presentation));
    }
}
