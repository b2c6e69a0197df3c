//! The scene the scanner looks at. The scanner only depends on the `SceneQuery` trait, a ray-cast
//! service over scene geometry; `Scene` is a straightforward implementation built from parry3d
//! shapes.

#[cfg(feature = "stl")]
mod stl;

use crate::{Iso3, Point3, Ray, Result, ScanError, UnitVec3, Vector3};
use parry3d_f64::query::RayCast;
use parry3d_f64::shape::{SharedShape, TriMesh};
use serde::{Deserialize, Serialize};

/// A set of scene layers, one bit per layer. Layers are numbered 0 through 31.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const ALL: LayerMask = LayerMask(u32::MAX);
    pub const NONE: LayerMask = LayerMask(0);
    pub const MAX_LAYERS: u8 = 32;

    pub fn from_layers(layers: &[u8]) -> Self {
        let mut bits = 0u32;
        for &layer in layers {
            if layer < Self::MAX_LAYERS {
                bits |= 1 << layer;
            }
        }
        LayerMask(bits)
    }

    pub fn contains(&self, layer: u8) -> bool {
        layer < Self::MAX_LAYERS && self.0 & (1 << layer) != 0
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        LayerMask::ALL
    }
}

/// A successful ray cast against the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneHit {
    pub point: Point3,
    pub normal: UnitVec3,

    /// Distance along the ray from its origin to `point`.
    pub distance: f64,
}

/// A ray-cast service over scene geometry.
pub trait SceneQuery {
    /// Cast `ray` (with a unit direction) into the scene, considering only geometry on `layers`
    /// and no further than `max_range`. Returns the nearest hit, if any.
    fn cast(&self, ray: &Ray, max_range: f64, layers: LayerMask) -> Option<SceneHit>;
}

/// A piece of scene geometry placed in the world on a given layer.
#[derive(Clone)]
pub struct SceneObject {
    pub shape: SharedShape,
    pub iso: Iso3,
    pub layer: u8,
}

impl SceneObject {
    fn cast(&self, ray: &Ray, max_range: f64) -> Option<SceneHit> {
        let ri = self
            .shape
            .cast_ray_and_get_normal(&self.iso, ray, max_range, false)?;

        // A degenerate normal happens when the ray starts on the surface, treat it as head-on
        let normal = UnitVec3::try_new(ri.normal, 1.0e-12)
            .unwrap_or_else(|| -UnitVec3::new_normalize(ray.dir));

        Some(SceneHit {
            point: ray.point_at(ri.time_of_impact),
            normal,
            distance: ri.time_of_impact,
        })
    }
}

/// A flat collection of shapes. Every query tests every object on a matching layer.
#[derive(Clone, Default)]
pub struct Scene {
    objects: Vec<SceneObject>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Add an arbitrary parry3d shape to the scene.
    ///
    /// # Arguments
    ///
    /// * `shape`: the shape, in its local coordinates
    /// * `iso`: the placement of the shape in the world
    /// * `layer`: the layer index, which must be less than 32
    ///
    /// returns: Result<(), ScanError>
    pub fn add_shape(&mut self, shape: SharedShape, iso: Iso3, layer: u8) -> Result<()> {
        if layer >= LayerMask::MAX_LAYERS {
            return Err(ScanError::Geometry(format!(
                "layer index must be less than {}, got {}",
                LayerMask::MAX_LAYERS,
                layer
            )));
        }
        self.objects.push(SceneObject { shape, iso, layer });
        Ok(())
    }

    /// Add a box with the given half extents, centered on `iso`. Every half extent must be
    /// positive and finite.
    pub fn add_cuboid(&mut self, half_extents: Vector3, iso: Iso3, layer: u8) -> Result<()> {
        if !half_extents.iter().all(|v| *v > 0.0 && v.is_finite()) {
            return Err(ScanError::Geometry(format!(
                "cuboid half extents must be positive and finite, got [{}, {}, {}]",
                half_extents.x, half_extents.y, half_extents.z
            )));
        }
        self.add_shape(
            SharedShape::cuboid(half_extents.x, half_extents.y, half_extents.z),
            iso,
            layer,
        )
    }

    /// Add a sphere of the given radius, centered on `iso`. The radius must be positive and
    /// finite.
    pub fn add_ball(&mut self, radius: f64, iso: Iso3, layer: u8) -> Result<()> {
        if !(radius > 0.0 && radius.is_finite()) {
            return Err(ScanError::Geometry(format!(
                "ball radius must be positive and finite, got {}",
                radius
            )));
        }
        self.add_shape(SharedShape::ball(radius), iso, layer)
    }

    /// Add an infinite plane through `point`, facing `normal`. Everything behind the plane is
    /// solid.
    pub fn add_plane(&mut self, point: Point3, normal: UnitVec3, layer: u8) -> Result<()> {
        self.add_shape(
            SharedShape::halfspace(normal),
            Iso3::translation(point.x, point.y, point.z),
            layer,
        )
    }

    /// Add a triangle mesh given in world coordinates.
    pub fn add_mesh(
        &mut self,
        vertices: Vec<Point3>,
        faces: Vec<[u32; 3]>,
        layer: u8,
    ) -> Result<()> {
        let mesh =
            TriMesh::new(vertices, faces).map_err(|e| ScanError::Geometry(e.to_string()))?;
        self.add_shape(SharedShape::new(mesh), Iso3::identity(), layer)
    }
}

impl SceneQuery for Scene {
    fn cast(&self, ray: &Ray, max_range: f64, layers: LayerMask) -> Option<SceneHit> {
        self.objects
            .iter()
            .filter(|o| layers.contains(o.layer))
            .filter_map(|o| o.cast(ray, max_range))
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}
