//! Pointer to territory resolution.
//!
//! A click is turned into a ray through the camera, intersected with the
//! scene, and the nearest hit on a registered territory surface wins.
//! Unregistered geometry (markers, water, clouds) is never a target.

use bevy::math::bounding::RayCast3d;
use bevy::picking::mesh_picking::ray_cast::{MeshRayCast, RayCastSettings};
use bevy::prelude::*;
use cm_core::TerritoryId;

use crate::index::{SurfaceBounds, TerritoryIndex};

/// Screen rectangle the camera renders into, in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Viewport {
    pub fn new(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }

    pub fn from_rect(rect: Rect) -> Self {
        Self {
            origin: rect.min,
            size: rect.size(),
        }
    }

    /// Normalized device coordinates for a pointer position, y up.
    /// `None` for a degenerate viewport or a pointer outside it.
    pub fn to_ndc(&self, pointer: Vec2) -> Option<Vec2> {
        if self.size.x <= 0.0 || self.size.y <= 0.0 {
            return None;
        }
        let local = (pointer - self.origin) / self.size;
        if !(0.0..=1.0).contains(&local.x) || !(0.0..=1.0).contains(&local.y) {
            return None;
        }
        Some(Vec2::new(local.x * 2.0 - 1.0, 1.0 - local.y * 2.0))
    }
}

/// Snapshot of the camera matrices used to unproject a pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickCamera {
    pub world_from_view: Mat4,
    pub clip_from_view: Mat4,
}

impl PickCamera {
    pub fn new(world_from_view: Mat4, clip_from_view: Mat4) -> Self {
        Self {
            world_from_view,
            clip_from_view,
        }
    }

    /// Ray from the near plane through `ndc`.
    ///
    /// Projections use reversed depth, so the near plane sits at z = 1; a
    /// second point at z = 0.5 stays finite for infinite perspective.
    pub fn ray_through(&self, ndc: Vec2) -> Option<Ray3d> {
        let world_from_ndc = self.world_from_view * self.clip_from_view.inverse();
        let near = world_from_ndc.project_point3(ndc.extend(1.0));
        let far = world_from_ndc.project_point3(ndc.extend(0.5));
        if !near.is_finite() || !far.is_finite() {
            return None;
        }
        let direction = Dir3::new(far - near).ok()?;
        Some(Ray3d {
            origin: near,
            direction,
        })
    }
}

/// One intersection reported by a caster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    pub entity: Entity,
    pub distance: f32,
}

/// The renderer's ray intersection primitive.
pub trait SurfaceCaster {
    /// All surfaces hit by `ray`, in any order.
    fn cast(&mut self, ray: Ray3d) -> Vec<SurfaceHit>;
}

/// Casts against axis-aligned boxes. Used headless and as a coarse fallback.
#[derive(Debug, Clone, Default)]
pub struct AabbCaster {
    pub surfaces: Vec<(Entity, SurfaceBounds)>,
}

impl AabbCaster {
    /// Boxes of every registered surface that has bounds.
    pub fn from_index(index: &TerritoryIndex) -> Self {
        let surfaces = index
            .all()
            .flat_map(|b| b.surfaces.iter())
            .filter_map(|s| s.bounds.map(|bounds| (s.entity, bounds)))
            .collect();
        Self { surfaces }
    }

    pub fn with_surface(mut self, entity: Entity, bounds: SurfaceBounds) -> Self {
        self.surfaces.push((entity, bounds));
        self
    }
}

impl SurfaceCaster for AabbCaster {
    fn cast(&mut self, ray: Ray3d) -> Vec<SurfaceHit> {
        let cast = RayCast3d::from_ray(ray, f32::MAX);
        self.surfaces
            .iter()
            .filter_map(|(entity, bounds)| {
                cast.aabb_intersection_at(&bounds.to_aabb())
                    .map(|distance| SurfaceHit {
                        entity: *entity,
                        distance,
                    })
            })
            .collect()
    }
}

/// Mesh-accurate caster backed by bevy's mesh ray casting.
pub struct MeshSurfaceCaster<'a, 'w, 's> {
    ray_cast: &'a mut MeshRayCast<'w, 's>,
}

impl<'a, 'w, 's> MeshSurfaceCaster<'a, 'w, 's> {
    pub fn new(ray_cast: &'a mut MeshRayCast<'w, 's>) -> Self {
        Self { ray_cast }
    }
}

impl SurfaceCaster for MeshSurfaceCaster<'_, '_, '_> {
    fn cast(&mut self, ray: Ray3d) -> Vec<SurfaceHit> {
        let settings = RayCastSettings::default().never_early_exit();
        self.ray_cast
            .cast_ray(ray, &settings)
            .iter()
            .map(|(entity, hit)| SurfaceHit {
                entity: *entity,
                distance: hit.distance,
            })
            .collect()
    }
}

/// Resolve a pointer position to the nearest territory under it.
pub fn pick(
    pointer: Vec2,
    viewport: &Viewport,
    camera: &PickCamera,
    index: &TerritoryIndex,
    caster: &mut impl SurfaceCaster,
) -> Option<TerritoryId> {
    let ndc = viewport.to_ndc(pointer)?;
    let ray = camera.ray_through(ndc)?;
    nearest_territory(caster.cast(ray), index)
}

/// Nearest hit that lands on a node bound in the index.
pub fn nearest_territory(hits: Vec<SurfaceHit>, index: &TerritoryIndex) -> Option<TerritoryId> {
    hits.into_iter()
        .filter(|hit| hit.distance.is_finite() && hit.distance >= 0.0)
        .filter_map(|hit| index.lookup_handle(hit.entity).map(|id| (hit.distance, id)))
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, id)| id)
}

/// Owned picking state: the viewport and camera of the map view.
///
/// Refreshed from the active camera before each pick; nothing is read from
/// ambient globals.
#[derive(Resource, Default, Debug, Clone)]
pub struct PickingService {
    viewport: Option<Viewport>,
    camera: Option<PickCamera>,
}

impl PickingService {
    pub fn new(viewport: Viewport, camera: PickCamera) -> Self {
        Self {
            viewport: Some(viewport),
            camera: Some(camera),
        }
    }

    pub fn update(&mut self, viewport: Viewport, camera: PickCamera) {
        self.viewport = Some(viewport);
        self.camera = Some(camera);
    }

    /// Refresh from a bevy camera. Returns false when the camera has no
    /// viewport yet.
    pub fn sync_camera(&mut self, camera: &Camera, transform: &GlobalTransform) -> bool {
        let Some(rect) = camera.logical_viewport_rect() else {
            return false;
        };
        self.update(
            Viewport::from_rect(rect),
            PickCamera::new(transform.compute_matrix(), camera.clip_from_view()),
        );
        true
    }

    pub fn is_ready(&self) -> bool {
        self.viewport.is_some() && self.camera.is_some()
    }

    /// Territory under `pointer`, `None` on a miss or before the camera is known.
    pub fn pick(
        &self,
        pointer: Vec2,
        index: &TerritoryIndex,
        caster: &mut impl SurfaceCaster,
    ) -> Option<TerritoryId> {
        let (viewport, camera) = (self.viewport.as_ref()?, self.camera.as_ref()?);
        pick(pointer, viewport, camera, index, caster)
    }
}

/// Set by the HUD each frame when the pointer hovers a panel.
#[derive(Resource, Default, Debug, Clone, Copy)]
pub struct PointerOverUi(pub bool);

/// System turning left clicks on the map into `TerritoryPicked` events.
///
/// Only scheduled once the map is ready; clicks over HUD panels are ignored.
pub fn pick_on_click(
    mouse: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window>,
    cameras: Query<(&Camera, &GlobalTransform), With<Camera3d>>,
    index: Res<TerritoryIndex>,
    over_ui: Res<PointerOverUi>,
    mut service: ResMut<PickingService>,
    mut ray_cast: MeshRayCast,
    mut picked: EventWriter<cm_core::TerritoryPicked>,
) {
    if !mouse.just_pressed(MouseButton::Left) || over_ui.0 || !index.is_ready() {
        return;
    }
    let Ok(window) = windows.get_single() else { return };
    let Some(pointer) = window.cursor_position() else { return };
    let Ok((camera, transform)) = cameras.get_single() else { return };
    if !service.sync_camera(camera, transform) {
        return;
    }

    let result = service.pick(pointer, &index, &mut MeshSurfaceCaster::new(&mut ray_cast));
    match result {
        Some(id) => debug!("Picked {}", id),
        None => debug!("Pick missed all territories"),
    }
    picked.send(cm_core::TerritoryPicked(result));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(n: u32) -> Entity {
        Entity::from_raw(n)
    }

    /// Camera at (0, 10, 0) looking straight down.
    fn top_down() -> PickCamera {
        let world_from_view = Transform::from_xyz(0.0, 10.0, 0.0)
            .looking_at(Vec3::ZERO, Vec3::NEG_Z)
            .compute_matrix();
        let clip_from_view = Mat4::perspective_infinite_reverse_rh(std::f32::consts::FRAC_PI_2, 1.0, 0.1);
        PickCamera::new(world_from_view, clip_from_view)
    }

    fn viewport() -> Viewport {
        Viewport::new(Vec2::ZERO, Vec2::new(100.0, 100.0))
    }

    /// Two flat tiles side by side on the ground, each 4 units wide.
    fn two_tiles() -> (TerritoryIndex, AabbCaster) {
        let mut index = TerritoryIndex::default();
        let west = SurfaceBounds::new(Vec3::new(-4.0, -0.1, -2.0), Vec3::new(0.0, 0.0, 2.0));
        let east = SurfaceBounds::new(Vec3::new(0.0, -0.1, -2.0), Vec3::new(4.0, 0.0, 2.0));
        index.register(TerritoryId(1), entity(1), Vec3::ZERO);
        index.attach_surface(TerritoryId(1), entity(11), Some(west));
        index.register(TerritoryId(2), entity(2), Vec3::ZERO);
        index.attach_surface(TerritoryId(2), entity(12), Some(east));
        index.finish();
        let caster = AabbCaster::from_index(&index);
        (index, caster)
    }

    #[test]
    fn ndc_covers_viewport_corners() {
        let vp = viewport();
        assert_eq!(vp.to_ndc(Vec2::ZERO), Some(Vec2::new(-1.0, 1.0)));
        assert_eq!(vp.to_ndc(Vec2::new(100.0, 100.0)), Some(Vec2::new(1.0, -1.0)));
        assert_eq!(vp.to_ndc(Vec2::new(50.0, 50.0)), Some(Vec2::ZERO));
    }

    #[test]
    fn ndc_respects_viewport_origin() {
        let vp = Viewport::new(Vec2::new(200.0, 0.0), Vec2::new(100.0, 100.0));
        assert_eq!(vp.to_ndc(Vec2::new(250.0, 50.0)), Some(Vec2::ZERO));
        assert_eq!(vp.to_ndc(Vec2::new(50.0, 50.0)), None);
    }

    #[test]
    fn degenerate_viewport_has_no_ndc() {
        let vp = Viewport::new(Vec2::ZERO, Vec2::new(0.0, 100.0));
        assert_eq!(vp.to_ndc(Vec2::ZERO), None);
    }

    #[test]
    fn centre_ray_points_down() {
        let ray = top_down().ray_through(Vec2::ZERO).unwrap();
        assert!((ray.direction.as_vec3() - Vec3::NEG_Y).length() < 1e-4);
        assert!((ray.origin.x).abs() < 1e-4 && (ray.origin.z).abs() < 1e-4);
        assert!(ray.origin.y < 10.0 && ray.origin.y > 9.0);
    }

    #[test]
    fn picks_tile_under_pointer() {
        let (index, mut caster) = two_tiles();
        let service = PickingService::new(viewport(), top_down());
        // x grows to the right on screen and in world space for this camera.
        assert_eq!(service.pick(Vec2::new(40.0, 50.0), &index, &mut caster), Some(TerritoryId(1)));
        assert_eq!(service.pick(Vec2::new(60.0, 50.0), &index, &mut caster), Some(TerritoryId(2)));
    }

    #[test]
    fn miss_returns_none() {
        let (index, mut caster) = two_tiles();
        let service = PickingService::new(viewport(), top_down());
        // Far corner of the view sees past both tiles.
        assert_eq!(service.pick(Vec2::new(0.0, 0.0), &index, &mut caster), None);
    }

    #[test]
    fn unbound_geometry_is_never_picked() {
        let (index, caster) = two_tiles();
        // A marker floating above the west tile.
        let marker = SurfaceBounds::new(Vec3::new(-3.0, 1.0, -1.0), Vec3::new(-1.0, 2.0, 1.0));
        let mut caster = caster.with_surface(entity(99), marker);
        let service = PickingService::new(viewport(), top_down());
        assert_eq!(service.pick(Vec2::new(40.0, 50.0), &index, &mut caster), Some(TerritoryId(1)));
    }

    #[test]
    fn nearest_hit_wins() {
        let (index, _) = two_tiles();
        let hits = vec![
            SurfaceHit { entity: entity(12), distance: 9.0 },
            SurfaceHit { entity: entity(99), distance: 1.0 },
            SurfaceHit { entity: entity(11), distance: 4.0 },
        ];
        assert_eq!(nearest_territory(hits, &index), Some(TerritoryId(1)));
    }

    #[test]
    fn hit_on_a_named_node_counts() {
        let (index, _) = two_tiles();
        let hits = vec![SurfaceHit { entity: entity(2), distance: 3.0 }];
        assert_eq!(nearest_territory(hits, &index), Some(TerritoryId(2)));
    }

    #[test]
    fn service_without_camera_picks_nothing() {
        let (index, mut caster) = two_tiles();
        let service = PickingService::default();
        assert!(!service.is_ready());
        assert_eq!(service.pick(Vec2::new(40.0, 50.0), &index, &mut caster), None);
    }
}
