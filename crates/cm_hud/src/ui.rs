use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};
use cm_catalog::FetchStatus;
use cm_core::{CommandRequested, MapPhase, UnitSelected};
use cm_map::PointerOverUi;
use cm_selection::SelectionStore;
use cm_world::{PlayerProfile, TerritoryGraph};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::view::{LandPanel, LandPanelView, UnitButton, UnitCard, roster_buttons};

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

fn unit_list(ui: &mut egui::Ui, title: &str, buttons: &[UnitButton], selected: &mut EventWriter<UnitSelected>) {
    ui.label(format!("{} ({})", title, buttons.len()));
    ui.horizontal_wrapped(|ui| {
        for button in buttons {
            if ui.selectable_label(button.selected, button.label.as_str()).clicked() {
                selected.send(UnitSelected(button.id));
            }
        }
    });
}

fn land_panel_body(
    ui: &mut egui::Ui,
    panel: &LandPanel,
    store: &SelectionStore,
    selected: &mut EventWriter<UnitSelected>,
    requested: &mut EventWriter<CommandRequested>,
) {
    if !panel.description.is_empty() {
        ui.label(panel.description.as_str());
    }
    ui.label(format!("Resource: {}", panel.resource_value));
    ui.label(format!("Status: {}", panel.status));
    ui.label(format!("Governance: {}", panel.governance));

    if let Some(war) = &panel.war {
        ui.separator();
        ui.label(format!("Defender: {} ({})", war.defender, war.defenders_power));
        ui.label(format!("Attacker: {} ({})", war.attacker, war.attackers_power));
        if let Some(banner) = &war.banner {
            ui.small(banner.as_str());
        }
    }

    ui.separator();
    unit_list(ui, "Available", &panel.available, selected);
    unit_list(ui, "Camped", &panel.camped, selected);
    unit_list(ui, "Deployed", &panel.deployed, selected);

    ui.separator();
    let Some(unit) = store.unit_id() else {
        ui.label("Select a unit to see commands");
        return;
    };
    if panel.commands.is_empty() {
        ui.label("No commands available here");
    }
    ui.horizontal_wrapped(|ui| {
        for kind in &panel.commands {
            if ui.button(kind.label()).clicked() {
                requested.send(CommandRequested {
                    kind: *kind,
                    unit,
                    territory: panel.territory,
                });
            }
        }
    });
}

/// Right-hand panel for the selected territory.
pub fn land_panel_system(
    mut contexts: EguiContexts,
    mut store: ResMut<SelectionStore>,
    profile: Res<PlayerProfile>,
    graph: Res<TerritoryGraph>,
    mut selected: EventWriter<UnitSelected>,
    mut requested: EventWriter<CommandRequested>,
) {
    let view = LandPanelView::build(&store, profile.clan, &*graph);
    if view == LandPanelView::Hidden {
        return;
    }

    let mut close = false;
    egui::SidePanel::right("land_panel")
        .default_width(240.0)
        .show(contexts.ctx_mut(), |ui| {
            ui.horizontal(|ui| {
                match &view {
                    LandPanelView::Ready(panel) => ui.heading(panel.name.as_str()),
                    _ => ui.heading("Loading..."),
                };
                if ui.small_button("x").clicked() {
                    close = true;
                }
            });
            ui.separator();
            match &view {
                LandPanelView::Ready(panel) => {
                    land_panel_body(ui, panel, &store, &mut selected, &mut requested);
                }
                LandPanelView::Pending(id) => {
                    ui.label(format!("Waiting for {}", id));
                }
                LandPanelView::Hidden => {}
            }
        });

    if close {
        store.close_detail();
    }
}

/// Card for the selected unit plus one button per owned unit.
pub fn roster_bar_system(
    mut contexts: EguiContexts,
    store: Res<SelectionStore>,
    mut selected: EventWriter<UnitSelected>,
) {
    let buttons = roster_buttons(store.roster(), store.unit_id());
    let card = store.unit().map(|unit| UnitCard::build(unit, unix_now()));

    egui::TopBottomPanel::bottom("roster_bar").show(contexts.ctx_mut(), |ui| {
        if let Some(card) = &card {
            ui.horizontal(|ui| {
                ui.strong(card.title.as_str());
                ui.label(format!("at {}", card.location));
                ui.label(format!("Stamina {}", card.stamina));
                ui.label(card.health);
                ui.label(card.status);
                if let Some(elapsed) = &card.elapsed {
                    ui.label(format!("for {}", elapsed));
                }
                ui.label(card.stats.as_str());
            });
            ui.separator();
        } else if let Some(id) = store.unit_id() {
            ui.label(format!("SamuraiWarrior {} is not in your roster", id));
            ui.separator();
        }

        ui.horizontal_wrapped(|ui| {
            if buttons.is_empty() {
                ui.label("No units owned");
            }
            for button in &buttons {
                if ui.selectable_label(button.selected, button.label.as_str()).clicked() {
                    selected.send(UnitSelected(button.id));
                }
            }
        });
    });
}

/// Top strip with load state and the last fetch failure.
pub fn status_line_system(
    mut contexts: EguiContexts,
    phase: Res<State<MapPhase>>,
    status: Res<FetchStatus>,
    profile: Res<PlayerProfile>,
) {
    egui::TopBottomPanel::top("status_line").show(contexts.ctx_mut(), |ui| {
        ui.horizontal(|ui| {
            ui.label(format!("Map: {}", phase.get().name()));
            ui.separator();
            if profile.address.is_empty() {
                ui.label("No wallet connected");
            } else {
                ui.label(profile.address.as_str());
            }
            if let Some(failure) = &status.last_failure {
                ui.separator();
                ui.colored_label(
                    egui::Color32::from_rgb(220, 80, 60),
                    format!("Failed to load {}: {}", failure.kind, failure.message),
                );
            }
        });
    });
}

/// Stop clicks on panels from reaching the 3D picker.
pub fn track_pointer_over_ui(mut contexts: EguiContexts, mut over_ui: ResMut<PointerOverUi>) {
    let ctx = contexts.ctx_mut();
    let over = ctx.is_pointer_over_area() || ctx.wants_pointer_input();
    if over_ui.0 != over {
        over_ui.0 = over;
    }
}

/// Escape hides the land panel.
pub fn close_on_escape(keys: Res<ButtonInput<KeyCode>>, mut store: ResMut<SelectionStore>) {
    if keys.just_pressed(KeyCode::Escape) && store.detail_open() {
        store.close_detail();
    }
}
