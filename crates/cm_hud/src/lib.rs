use bevy::prelude::*;
use bevy_egui::EguiPlugin;
use cm_core::MapSystems;

pub mod ui;
pub mod view;

pub use view::{LandPanel, LandPanelView, UnitButton, UnitCard, WarView, format_elapsed, roster_buttons};

/// HUD plugin for clanmap.
/// Draws the land panel, the unit roster and the status line with egui.
pub struct CmHudPlugin;

impl Plugin for CmHudPlugin {
    fn build(&self, app: &mut App) {
        if !app.is_plugin_added::<EguiPlugin>() {
            app.add_plugins(EguiPlugin);
        }

        app.add_systems(Update, ui::close_on_escape.in_set(MapSystems::Input))
            .add_systems(Update, (
                ui::status_line_system,
                ui::roster_bar_system,
                ui::land_panel_system,
                ui::track_pointer_over_ui,
            ).chain().in_set(MapSystems::Presentation));
    }
}
