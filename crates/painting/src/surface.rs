//! Paintable meshes and the registry that owns them.
//!
//! A [`Surface`] is a triangle mesh with one colour per vertex and a world
//! transform. The [`SurfaceRegistry`] holds the meshes of the loaded model,
//! any scenery (ground, props) and the designation of the single surface
//! that paint operations apply to.

use glam::{Affine3A, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::bounds::Aabb;
use crate::constants::DEFAULT_VERTEX_COLOR;
use crate::error::{AssetLoadError, SurfaceError};
use crate::raycast::{Ray, raycast_surface};
use crate::types::{MeshHit, Rgb, SurfaceId};
use crate::validation::validate_buffers;

/// Translation, rotation and (possibly non-uniform) scale of a surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceTransform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for SurfaceTransform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl SurfaceTransform {
    /// Decompose an affine matrix (e.g. a flattened scene-graph transform).
    pub fn from_matrix(matrix: Mat4) -> Self {
        let (scale, rotation, translation) = matrix.to_scale_rotation_translation();
        Self {
            translation,
            rotation,
            scale,
        }
    }

    /// Object-to-world matrix.
    pub fn matrix(&self) -> Affine3A {
        Affine3A::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// Apply a uniform scale about the world origin after this transform.
    ///
    /// A uniform scale commutes with the rotation, so only translation and
    /// scale change.
    pub fn prepend_uniform_scale(&mut self, factor: f32) {
        self.translation *= factor;
        self.scale *= factor;
    }

    pub fn translate(&mut self, offset: Vec3) {
        self.translation += offset;
    }
}

/// A triangle mesh with per-vertex colours.
#[derive(Debug, Clone)]
pub struct Surface {
    pub id: SurfaceId,
    pub name: String,
    /// Object-space vertex positions
    pub positions: Vec<Vec3>,
    /// Triangle list, 3 indices per face
    pub indices: Vec<u32>,
    pub transform: SurfaceTransform,
    colors: Vec<Rgb>,
    color_revision: u64,
}

impl Surface {
    /// Build a surface from raw buffers.
    ///
    /// Assets without a colour attribute start out white.
    pub fn new(
        name: impl Into<String>,
        positions: Vec<Vec3>,
        colors: Option<Vec<Rgb>>,
        indices: Vec<u32>,
    ) -> Result<Self, SurfaceError> {
        validate_buffers(&positions, colors.as_deref(), &indices)?;
        let colors = colors.unwrap_or_else(|| vec![DEFAULT_VERTEX_COLOR; positions.len()]);

        Ok(Self {
            id: SurfaceId(0),
            name: name.into(),
            positions,
            indices,
            transform: SurfaceTransform::default(),
            colors,
            color_revision: 0,
        })
    }

    pub fn with_transform(mut self, transform: SurfaceTransform) -> Self {
        self.transform = transform;
        self
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    /// Mutable colour buffer; marks the colours as changed.
    pub fn colors_mut(&mut self) -> &mut [Rgb] {
        self.color_revision = self.color_revision.wrapping_add(1);
        &mut self.colors
    }

    /// Overwrite the whole colour buffer with a snapshot.
    ///
    /// Returns false if the snapshot does not match the vertex count.
    pub fn restore_colors(&mut self, snapshot: &[Rgb]) -> bool {
        if snapshot.len() != self.colors.len() {
            return false;
        }
        self.colors_mut().copy_from_slice(snapshot);
        true
    }

    /// Counter bumped on every colour mutation, used to re-upload vertex colours.
    pub fn color_revision(&self) -> u64 {
        self.color_revision
    }

    pub fn world_position(&self, index: u32) -> Option<Vec3> {
        let local = self.positions.get(index as usize)?;
        Some(self.transform.matrix().transform_point3(*local))
    }

    /// All vertex positions in world space, in buffer order.
    pub fn world_positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        let matrix = self.transform.matrix();
        self.positions.iter().map(move |p| matrix.transform_point3(*p))
    }

    pub fn world_bounds(&self) -> Option<Aabb> {
        Aabb::from_points(self.world_positions())
    }
}

/// How the paintable surface of a model is chosen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MainMesh {
    /// The mesh with this name
    Named(String),
    /// The first mesh in asset order
    #[default]
    First,
}

impl From<Option<String>> for MainMesh {
    fn from(name: Option<String>) -> Self {
        name.map_or(Self::First, Self::Named)
    }
}

/// Owns every surface in the scene and designates the paintable one.
#[derive(Debug, Default)]
pub struct SurfaceRegistry {
    model: Vec<Surface>,
    scenery: Vec<Surface>,
    paintable: Option<SurfaceId>,
    next_id: u32,
    model_revision: u64,
}

impl SurfaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> SurfaceId {
        self.next_id += 1;
        SurfaceId(self.next_id)
    }

    /// Replace the loaded model, discarding the previous one.
    ///
    /// Nothing changes when the designation cannot be resolved.
    pub fn replace_model(
        &mut self,
        source: &str,
        mut surfaces: Vec<Surface>,
        designation: &MainMesh,
    ) -> Result<SurfaceId, AssetLoadError> {
        if surfaces.is_empty() {
            return Err(AssetLoadError::Empty {
                model: source.to_string(),
            });
        }

        let main_index = match designation {
            MainMesh::Named(name) => surfaces
                .iter()
                .position(|s| &s.name == name)
                .ok_or_else(|| AssetLoadError::MainMeshNotFound {
                    name: name.clone(),
                    available: surfaces.iter().map(|s| s.name.clone()).collect(),
                })?,
            MainMesh::First => {
                if surfaces.len() > 1 {
                    tracing::warn!(
                        "No main mesh configured for {}, painting the first of {} meshes ({:?})",
                        source,
                        surfaces.len(),
                        surfaces[0].name
                    );
                }
                0
            }
        };

        for surface in surfaces.iter_mut() {
            surface.id = self.allocate_id();
        }
        let paintable = surfaces[main_index].id;

        self.model = surfaces;
        self.paintable = Some(paintable);
        self.model_revision = self.model_revision.wrapping_add(1);

        tracing::info!(
            "Installed model {} with {} meshes, paintable {}",
            source,
            self.model.len(),
            paintable
        );
        Ok(paintable)
    }

    /// Add non-paintable geometry that still occludes and renders.
    pub fn add_scenery(&mut self, mut surface: Surface) -> SurfaceId {
        surface.id = self.allocate_id();
        let id = surface.id;
        self.scenery.push(surface);
        id
    }

    pub fn paintable_id(&self) -> Option<SurfaceId> {
        self.paintable
    }

    pub fn paintable(&self) -> Option<&Surface> {
        let id = self.paintable?;
        self.model.iter().find(|s| s.id == id)
    }

    pub fn paintable_mut(&mut self) -> Option<&mut Surface> {
        let id = self.paintable?;
        self.model.iter_mut().find(|s| s.id == id)
    }

    pub fn get(&self, id: SurfaceId) -> Option<&Surface> {
        self.iter().find(|s| s.id == id)
    }

    pub fn model(&self) -> &[Surface] {
        &self.model
    }

    pub fn scenery(&self) -> &[Surface] {
        &self.scenery
    }

    /// Bumped every time a model is installed.
    pub fn model_revision(&self) -> u64 {
        self.model_revision
    }

    /// Model surfaces followed by scenery.
    pub fn iter(&self) -> impl Iterator<Item = &Surface> {
        self.model.iter().chain(self.scenery.iter())
    }

    /// Nearest hit over every surface in the scene.
    pub fn raycast(&self, ray: &Ray) -> Option<MeshHit> {
        self.iter()
            .filter_map(|surface| raycast_surface(ray, surface))
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}
