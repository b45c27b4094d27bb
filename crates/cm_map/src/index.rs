//! Territory id to scene geometry registry.
//!
//! Built once per world load from the harvested scene and read-only until
//! the next reload clears it. The renderer's own scene graph is never
//! walked for lookups; everything goes through this index.

use bevy::math::bounding::Aabb3d;
use bevy::prelude::*;
use cm_core::TerritoryId;
use std::collections::HashMap;

/// World-space box around a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceBounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl SurfaceBounds {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Smallest box containing all `points`.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));
        Some(Self { min, max })
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn to_aabb(&self) -> Aabb3d {
        Aabb3d::new(self.center(), (self.max - self.min) * 0.5)
    }
}

/// A pickable surface belonging to a territory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerritorySurface {
    pub entity: Entity,
    pub bounds: Option<SurfaceBounds>,
}

/// Territory id bound to its scene node and the surfaces drawn for it.
#[derive(Debug, Clone, PartialEq)]
pub struct TerritoryMeshBinding {
    pub id: TerritoryId,
    /// Scene node named after the territory.
    pub handle: Entity,
    /// Centre of the territory's geometry.
    pub centroid: Vec3,
    pub surfaces: Vec<TerritorySurface>,
}

impl TerritoryMeshBinding {
    fn bounds(&self) -> Option<SurfaceBounds> {
        self.surfaces
            .iter()
            .filter_map(|s| s.bounds)
            .reduce(|a, b| a.union(&b))
    }
}

/// Registry of territory bindings, in registration order.
#[derive(Resource, Default, Debug)]
pub struct TerritoryIndex {
    bindings: Vec<TerritoryMeshBinding>,
    by_id: HashMap<TerritoryId, usize>,
    by_surface: HashMap<Entity, usize>,
    ready: bool,
}

impl TerritoryIndex {
    /// Add a binding. A second registration of the same id replaces the
    /// first one in place.
    pub fn register(&mut self, id: TerritoryId, handle: Entity, centroid: Vec3) {
        let binding = TerritoryMeshBinding {
            id,
            handle,
            centroid,
            surfaces: Vec::new(),
        };
        match self.by_id.get(&id) {
            Some(&slot) => {
                for surface in &self.bindings[slot].surfaces {
                    self.by_surface.remove(&surface.entity);
                }
                self.bindings[slot] = binding;
            }
            None => {
                self.by_id.insert(id, self.bindings.len());
                self.bindings.push(binding);
            }
        }
    }

    /// Attach a pickable surface to a registered territory. The centroid
    /// follows the union of all attached bounds.
    pub fn attach_surface(
        &mut self,
        id: TerritoryId,
        entity: Entity,
        bounds: Option<SurfaceBounds>,
    ) -> bool {
        let Some(&slot) = self.by_id.get(&id) else {
            return false;
        };
        let binding = &mut self.bindings[slot];
        binding.surfaces.push(TerritorySurface { entity, bounds });
        if let Some(all) = binding.bounds() {
            binding.centroid = all.center();
        }
        self.by_surface.insert(entity, slot);
        true
    }

    pub fn lookup(&self, id: TerritoryId) -> Option<&TerritoryMeshBinding> {
        self.by_id.get(&id).map(|&slot| &self.bindings[slot])
    }

    /// Territory owning a pickable surface entity.
    pub fn lookup_surface(&self, entity: Entity) -> Option<&TerritoryMeshBinding> {
        self.by_surface.get(&entity).map(|&slot| &self.bindings[slot])
    }

    /// Territory id for a scene node, whether the named node or one of its surfaces.
    pub fn lookup_handle(&self, entity: Entity) -> Option<TerritoryId> {
        self.lookup_surface(entity)
            .or_else(|| self.bindings.iter().find(|b| b.handle == entity))
            .map(|b| b.id)
    }

    /// All bindings in registration order.
    pub fn all(&self) -> impl Iterator<Item = &TerritoryMeshBinding> {
        self.bindings.iter()
    }

    /// Mark the index as complete; picking becomes available.
    pub fn finish(&mut self) {
        self.ready = true;
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Drop every binding ahead of a world reload.
    pub fn clear(&mut self) {
        self.bindings.clear();
        self.by_id.clear();
        self.by_surface.clear();
        self.ready = false;
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(n: u32) -> Entity {
        Entity::from_raw(n)
    }

    #[test]
    fn iteration_follows_registration_order() {
        let mut index = TerritoryIndex::default();
        index.register(TerritoryId(3), entity(1), Vec3::ZERO);
        index.register(TerritoryId(1), entity(2), Vec3::ZERO);
        index.register(TerritoryId(2), entity(3), Vec3::ZERO);
        let ids: Vec<_> = index.all().map(|b| b.id.0).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn duplicate_registration_overwrites() {
        let mut index = TerritoryIndex::default();
        index.register(TerritoryId(1), entity(1), Vec3::ZERO);
        index.attach_surface(TerritoryId(1), entity(10), None);
        index.register(TerritoryId(2), entity(2), Vec3::ZERO);
        index.register(TerritoryId(1), entity(5), Vec3::X);

        assert_eq!(index.len(), 2);
        let binding = index.lookup(TerritoryId(1)).unwrap();
        assert_eq!(binding.handle, entity(5));
        assert_eq!(binding.centroid, Vec3::X);
        assert!(index.lookup_surface(entity(10)).is_none());
        assert_eq!(index.all().next().map(|b| b.id), Some(TerritoryId(1)));
    }

    #[test]
    fn surfaces_resolve_to_their_territory() {
        let mut index = TerritoryIndex::default();
        index.register(TerritoryId(7), entity(1), Vec3::ZERO);
        assert!(index.attach_surface(TerritoryId(7), entity(11), None));
        assert!(index.attach_surface(TerritoryId(7), entity(12), None));
        assert!(!index.attach_surface(TerritoryId(8), entity(13), None));

        assert_eq!(index.lookup_surface(entity(12)).map(|b| b.id), Some(TerritoryId(7)));
        assert!(index.lookup_surface(entity(13)).is_none());
        assert_eq!(index.lookup_handle(entity(1)), Some(TerritoryId(7)));
        assert_eq!(index.lookup_handle(entity(11)), Some(TerritoryId(7)));
        assert_eq!(index.lookup_handle(entity(13)), None);
    }

    #[test]
    fn centroid_follows_surface_bounds() {
        let mut index = TerritoryIndex::default();
        index.register(TerritoryId(1), entity(1), Vec3::splat(100.0));
        index.attach_surface(
            TerritoryId(1),
            entity(2),
            Some(SurfaceBounds::new(Vec3::ZERO, Vec3::new(2.0, 0.0, 2.0))),
        );
        index.attach_surface(
            TerritoryId(1),
            entity(3),
            Some(SurfaceBounds::new(Vec3::new(2.0, 0.0, 0.0), Vec3::new(4.0, 2.0, 2.0))),
        );
        assert_eq!(index.lookup(TerritoryId(1)).unwrap().centroid, Vec3::new(2.0, 1.0, 1.0));
    }

    #[test]
    fn clear_resets_readiness() {
        let mut index = TerritoryIndex::default();
        index.register(TerritoryId(1), entity(1), Vec3::ZERO);
        index.finish();
        assert!(index.is_ready());
        index.clear();
        assert!(!index.is_ready());
        assert!(index.is_empty());
        assert!(index.lookup(TerritoryId(1)).is_none());
    }

    #[test]
    fn bounds_from_points() {
        let bounds = SurfaceBounds::from_points([Vec3::new(1.0, -1.0, 0.0), Vec3::new(-1.0, 3.0, 2.0)]).unwrap();
        assert_eq!(bounds.min, Vec3::new(-1.0, -1.0, 0.0));
        assert_eq!(bounds.max, Vec3::new(1.0, 3.0, 2.0));
        assert!(SurfaceBounds::from_points([]).is_none());
    }
}
