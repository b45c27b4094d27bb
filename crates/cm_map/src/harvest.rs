//! Harvesting territory bindings out of the loaded world scene.
//!
//! Scene nodes whose name carries a territory id become bindings; every
//! mesh underneath such a node becomes one of its pickable surfaces.
//! Nodes with other names are skipped, never a load failure.

use bevy::prelude::*;
use bevy::render::mesh::MeshAabb;
use bevy::scene::SceneInstanceReady;
use cm_core::{MapPhase, MapPhaseChanged, TerritoryId};
use std::collections::HashMap;

use crate::index::{SurfaceBounds, TerritoryIndex};

/// Marker on the root entity of the world scene.
#[derive(Component)]
pub struct WorldScene;

/// Tag on the scene node bound to a territory.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerritoryNode {
    pub id: TerritoryId,
}

/// A scene node flattened for binding. Parents must precede children.
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub entity: Entity,
    pub parent: Option<Entity>,
    pub name: Option<String>,
    /// World-space translation of the node.
    pub translation: Vec3,
    pub has_mesh: bool,
    /// World-space bounds of the node's mesh, if it has one.
    pub bounds: Option<SurfaceBounds>,
}

/// Outcome of binding a scene.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct HarvestReport {
    pub registered: usize,
    pub surfaces: usize,
    /// Names of meshes that could not be tied to any territory.
    pub skipped: Vec<String>,
}

/// Register every territory found in `nodes` into `index`.
pub fn bind_scene_nodes(nodes: &[SceneNode], index: &mut TerritoryIndex) -> HarvestReport {
    let mut report = HarvestReport::default();
    let mut owner: HashMap<Entity, TerritoryId> = HashMap::new();

    for node in nodes {
        let own = node.name.as_deref().and_then(TerritoryId::from_node_name);
        let territory = match own {
            Some(id) => {
                index.register(id, node.entity, node.translation);
                report.registered += 1;
                Some(id)
            }
            None => node.parent.and_then(|p| owner.get(&p).copied()),
        };

        if let Some(id) = territory {
            owner.insert(node.entity, id);
        }

        if !node.has_mesh {
            continue;
        }
        match territory {
            Some(id) => {
                if index.attach_surface(id, node.entity, node.bounds) {
                    report.surfaces += 1;
                }
            }
            None => {
                if let Some(name) = &node.name {
                    report.skipped.push(name.clone());
                }
            }
        }
    }

    report
}

/// World-space bounds of a mesh under `transform`.
fn mesh_bounds(mesh: &Mesh, transform: &GlobalTransform) -> Option<SurfaceBounds> {
    let aabb = mesh.compute_aabb()?;
    let center = Vec3::from(aabb.center);
    let half = Vec3::from(aabb.half_extents);
    let corners = (0..8).map(|i| {
        let sign = Vec3::new(
            if i & 1 == 0 { -1.0 } else { 1.0 },
            if i & 2 == 0 { -1.0 } else { 1.0 },
            if i & 4 == 0 { -1.0 } else { 1.0 },
        );
        transform.transform_point(center + half * sign)
    });
    SurfaceBounds::from_points(corners)
}

/// Observer run when the world scene has been instantiated.
///
/// Global transforms of freshly spawned scene entities are not propagated
/// yet, so world transforms are accumulated while walking down from the root.
#[allow(clippy::too_many_arguments)]
pub fn harvest_world_scene(
    trigger: Trigger<SceneInstanceReady>,
    roots: Query<&GlobalTransform, With<WorldScene>>,
    children: Query<&Children>,
    nodes: Query<(Option<&Name>, &Transform, Option<&Mesh3d>)>,
    meshes: Res<Assets<Mesh>>,
    mut index: ResMut<TerritoryIndex>,
    mut commands: Commands,
    phase: Res<State<MapPhase>>,
    mut next_phase: ResMut<NextState<MapPhase>>,
    mut phase_events: EventWriter<MapPhaseChanged>,
) {
    let root = trigger.entity();
    let Ok(root_transform) = roots.get(root) else {
        return;
    };

    let mut flat = Vec::new();
    let mut stack: Vec<(Entity, Option<Entity>, GlobalTransform)> = children
        .get(root)
        .map(|kids| kids.iter().rev().map(|&kid| (kid, None, *root_transform)).collect())
        .unwrap_or_default();

    while let Some((entity, parent, parent_global)) = stack.pop() {
        let Ok((name, transform, mesh)) = nodes.get(entity) else {
            continue;
        };
        let global = parent_global.mul_transform(*transform);
        let bounds = mesh
            .and_then(|m| meshes.get(&m.0))
            .and_then(|m| mesh_bounds(m, &global));
        flat.push(SceneNode {
            entity,
            parent,
            name: name.map(|n| n.as_str().to_string()),
            translation: global.translation(),
            has_mesh: mesh.is_some(),
            bounds,
        });
        if let Ok(kids) = children.get(entity) {
            stack.extend(kids.iter().rev().map(|&kid| (kid, Some(entity), global)));
        }
    }

    index.clear();
    let report = bind_scene_nodes(&flat, &mut index);
    index.finish();

    for binding in index.all() {
        commands
            .entity(binding.handle)
            .insert(TerritoryNode { id: binding.id });
    }
    for name in &report.skipped {
        debug!("World mesh '{}' is not a territory, skipped", name);
    }
    info!(
        "World harvested: {} territories, {} surfaces, {} skipped meshes",
        index.len(),
        report.surfaces,
        report.skipped.len()
    );

    // Set unconditionally so a reload requested this frame is overridden.
    next_phase.set(MapPhase::Ready);
    if *phase.get() != MapPhase::Ready {
        phase_events.send(MapPhaseChanged {
            from: *phase.get(),
            to: MapPhase::Ready,
        });
    }
}

/// Spawn the world scene and harvest it once instantiated.
pub fn spawn_world_scene(commands: &mut Commands, scene: Handle<Scene>) -> Entity {
    commands
        .spawn((SceneRoot(scene), WorldScene))
        .observe(harvest_world_scene)
        .id()
}
