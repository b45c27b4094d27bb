//! Visual emphasis of the selected territory.
//!
//! Exactly one territory carries the active material and the marker at any
//! time. The marker is despawned before a new one is placed so repeated
//! selections never accumulate markers.

use bevy::math::primitives::Cone;
use bevy::prelude::*;
use cm_core::{SelectionChanged, TerritoryId};
use std::collections::{HashMap, HashSet};

use crate::harvest::TerritoryNode;
use crate::index::TerritoryIndex;

/// Colours and marker placement for the highlight.
#[derive(Resource, Debug, Clone)]
pub struct HighlightStyle {
    pub active_color: Color,
    pub default_color: Color,
    pub marker_color: Color,
    /// Offset of the marker from the territory centroid.
    pub marker_offset: Vec3,
    pub marker_radius: f32,
    pub marker_height: f32,
    /// How far a territory hosting one of the player's units is raised.
    pub occupied_lift: f32,
}

impl Default for HighlightStyle {
    fn default() -> Self {
        Self {
            active_color: Color::srgb(0.2, 0.0, 0.0),
            default_color: Color::srgb(65.0 / 255.0, 116.0 / 255.0, 29.0 / 255.0),
            marker_color: Color::srgb(1.0, 0.0, 0.0),
            marker_offset: Vec3::new(10.0, 15.0, 0.0),
            marker_radius: 10.0,
            marker_height: 20.0,
            occupied_lift: 0.5,
        }
    }
}

/// Material and mesh handles shared by every highlight update.
#[derive(Resource, Debug, Clone)]
pub struct HighlightAssets {
    pub active: Handle<StandardMaterial>,
    pub default: Handle<StandardMaterial>,
    pub marker_mesh: Handle<Mesh>,
    pub marker_material: Handle<StandardMaterial>,
}

/// The transient marker above the selected territory.
#[derive(Component, Debug, Clone, Copy)]
pub struct SelectionMarker {
    pub territory: TerritoryId,
}

/// Treatment a territory surface should get.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Treatment {
    Active,
    Default,
}

/// What to change after a selection moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightPlan {
    pub target: Option<TerritoryId>,
}

impl HighlightPlan {
    pub fn treatment_for(&self, id: TerritoryId) -> Treatment {
        if self.target == Some(id) {
            Treatment::Active
        } else {
            Treatment::Default
        }
    }

    /// World position of the new marker, if the target is in the index.
    /// `raised` adds the occupied lift the territory currently carries.
    pub fn marker_position(&self, index: &TerritoryIndex, style: &HighlightStyle, raised: bool) -> Option<Vec3> {
        let binding = index.lookup(self.target?)?;
        let lift = if raised { style.occupied_lift } else { 0.0 };
        Some(binding.centroid + style.marker_offset + Vec3::Y * lift)
    }
}

/// Tracks which territory is emphasized and whether the scene shows it.
#[derive(Resource, Debug, Default)]
pub struct HighlightController {
    active: Option<TerritoryId>,
    /// False until the plan for `active` has been drawn on a ready index.
    applied: bool,
}

impl HighlightController {
    /// Plan a switch to `target`; `None` when it is already emphasized.
    pub fn retarget(&mut self, target: Option<TerritoryId>) -> Option<HighlightPlan> {
        if self.applied && self.active == target {
            return None;
        }
        self.active = target;
        self.applied = true;
        Some(HighlightPlan { target })
    }

    /// Plan for a target that was requested but never drawn.
    pub fn pending(&mut self) -> Option<HighlightPlan> {
        if self.applied {
            return None;
        }
        self.applied = true;
        Some(HighlightPlan { target: self.active })
    }

    pub fn active(&self) -> Option<TerritoryId> {
        self.active
    }

    /// Mark the emphasis as not drawn, e.g. when the world is reloaded.
    /// The target is kept and drawn again by `pending`.
    pub fn reset(&mut self) {
        self.applied = false;
    }
}

/// Startup system creating the highlight materials from the style.
pub fn setup_highlight_assets(
    mut commands: Commands,
    style: Res<HighlightStyle>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut meshes: ResMut<Assets<Mesh>>,
) {
    commands.insert_resource(HighlightAssets {
        active: materials.add(StandardMaterial {
            base_color: style.active_color,
            unlit: true,
            ..default()
        }),
        default: materials.add(StandardMaterial {
            base_color: style.default_color,
            unlit: true,
            ..default()
        }),
        marker_mesh: meshes.add(Cone {
            radius: style.marker_radius,
            height: style.marker_height,
        }),
        marker_material: materials.add(StandardMaterial {
            base_color: style.marker_color,
            unlit: true,
            ..default()
        }),
    });
}

/// System applying the latest selection to territory materials and the marker.
///
/// A selection that arrives before the index is ready is held back and drawn
/// on the first frame the index is ready, as is the initial all-default state.
#[allow(clippy::too_many_arguments)]
pub fn apply_highlight(
    mut events: EventReader<SelectionChanged>,
    mut controller: ResMut<HighlightController>,
    index: Res<TerritoryIndex>,
    style: Res<HighlightStyle>,
    assets: Option<Res<HighlightAssets>>,
    mut surfaces: Query<&mut MeshMaterial3d<StandardMaterial>>,
    markers: Query<Entity, With<SelectionMarker>>,
    lifted: Query<&TerritoryNode, With<Lifted>>,
    mut commands: Commands,
) {
    let plan = match events.read().last() {
        Some(latest) => controller.retarget(latest.territory),
        None if index.is_ready() => controller.pending(),
        None => None,
    };
    let Some(plan) = plan else { return };
    let Some(assets) = assets.filter(|_| index.is_ready()) else {
        controller.reset();
        return;
    };

    for binding in index.all() {
        let material = match plan.treatment_for(binding.id) {
            Treatment::Active => &assets.active,
            Treatment::Default => &assets.default,
        };
        for surface in &binding.surfaces {
            if let Ok(mut current) = surfaces.get_mut(surface.entity) {
                current.0 = material.clone();
            }
        }
    }

    for marker in &markers {
        commands.entity(marker).despawn_recursive();
    }
    let raised = plan.target.is_some_and(|target| lifted.iter().any(|node| node.id == target));
    if let (Some(target), Some(position)) = (plan.target, plan.marker_position(&index, &style, raised)) {
        commands.spawn((
            Mesh3d(assets.marker_mesh.clone()),
            MeshMaterial3d(assets.marker_material.clone()),
            // Tip pointing down at the land.
            Transform::from_translation(position)
                .with_rotation(Quat::from_rotation_x(std::f32::consts::PI)),
            SelectionMarker { territory: target },
        ));
    }
}

/// Territories hosting at least one of the player's units.
#[derive(Resource, Debug, Default, Clone, PartialEq, Eq)]
pub struct OccupiedTerritories(pub HashSet<TerritoryId>);

/// Tag on territory nodes currently raised.
#[derive(Component)]
pub struct Lifted;

/// System raising occupied territories and lowering vacated ones.
/// A marker above a territory moves with it.
pub fn lift_occupied(
    occupied: Res<OccupiedTerritories>,
    index: Res<TerritoryIndex>,
    style: Res<HighlightStyle>,
    mut nodes: Query<(Entity, &TerritoryNode, &mut Transform, Has<Lifted>)>,
    mut markers: Query<(&SelectionMarker, &mut Transform), Without<TerritoryNode>>,
    mut commands: Commands,
) {
    if !occupied.is_changed() && !index.is_changed() {
        return;
    }
    let mut moved: HashMap<TerritoryId, f32> = HashMap::new();
    for (entity, node, mut transform, lifted) in &mut nodes {
        let wanted = occupied.0.contains(&node.id);
        let delta = if wanted && !lifted {
            commands.entity(entity).insert(Lifted);
            style.occupied_lift
        } else if !wanted && lifted {
            commands.entity(entity).remove::<Lifted>();
            -style.occupied_lift
        } else {
            continue;
        };
        transform.translation.y += delta;
        // Several nodes may share one territory; the marker moves once.
        moved.entry(node.id).or_insert(delta);
    }
    for (marker, mut transform) in &mut markers {
        if let Some(delta) = moved.get(&marker.territory) {
            transform.translation.y += delta;
        }
    }
}
