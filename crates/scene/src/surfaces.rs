//! Mirroring session surfaces as Bevy meshes
//!
//! Every surface in the session's registry gets one mesh entity. The whole
//! set is respawned when the model is replaced or scenery is added; vertex
//! colours are re-uploaded whenever a surface's colour revision moves.

use bevy::asset::RenderAssetUsages;
use bevy::mesh::{Indices, PrimitiveTopology};
use bevy::prelude::*;

use painting::{Rgb, Surface, SurfaceId};

use crate::ViewerSession;

/// A mesh entity showing one session surface
#[derive(Component, Debug)]
pub struct SurfaceMesh {
    pub surface: SurfaceId,
    /// Colour revision currently uploaded
    pub color_revision: u64,
}

/// Which registry state the spawned meshes reflect
#[derive(Resource, Default, PartialEq, Eq)]
struct MirroredRegistry {
    model_revision: u64,
    surface_count: usize,
}

/// Plugin that keeps Bevy meshes in step with the session
pub struct SurfaceMeshPlugin;

impl Plugin for SurfaceMeshPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<MirroredRegistry>().add_systems(
            Update,
            (sync_surface_entities, update_surface_colors).chain(),
        );
    }
}

/// Per-vertex normals averaged over the adjacent triangles, in object space.
pub fn vertex_normals(surface: &Surface) -> Vec<[f32; 3]> {
    let mut normals = vec![glam::Vec3::ZERO; surface.positions.len()];
    for tri in surface.indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let p = &surface.positions;
        // Area-weighted: the cross product is left unnormalized
        let face = (p[b] - p[a]).cross(p[c] - p[a]);
        normals[a] += face;
        normals[b] += face;
        normals[c] += face;
    }
    normals
        .into_iter()
        .map(|n| n.normalize_or(glam::Vec3::Y).to_array())
        .collect()
}

/// Surface colours as linear RGBA vertex colours.
pub fn vertex_colors(colors: &[Rgb]) -> Vec<[f32; 4]> {
    colors
        .iter()
        .map(|&[r, g, b]| Color::srgb(r, g, b).to_linear().to_f32_array())
        .collect()
}

fn build_mesh(surface: &Surface) -> Mesh {
    let positions: Vec<[f32; 3]> = surface.positions.iter().map(|p| p.to_array()).collect();

    let mut mesh = Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default());
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, vertex_normals(surface));
    mesh.insert_attribute(Mesh::ATTRIBUTE_COLOR, vertex_colors(surface.colors()));
    mesh.insert_indices(Indices::U32(surface.indices.clone()));
    mesh
}

fn surface_transform(surface: &Surface) -> Transform {
    let t = &surface.transform;
    Transform {
        translation: Vec3::from_array(t.translation.to_array()),
        rotation: Quat::from_array(t.rotation.to_array()),
        scale: Vec3::from_array(t.scale.to_array()),
    }
}

fn sync_surface_entities(
    mut commands: Commands,
    session: Res<ViewerSession>,
    mut mirrored: ResMut<MirroredRegistry>,
    existing: Query<Entity, With<SurfaceMesh>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut material: Local<Option<Handle<StandardMaterial>>>,
) {
    let registry = session.registry();
    let current = MirroredRegistry {
        model_revision: registry.model_revision(),
        surface_count: registry.iter().count(),
    };
    if *mirrored == current {
        return;
    }

    for entity in existing.iter() {
        commands.entity(entity).despawn();
    }

    // Vertex colours carry the paint; the material stays white
    let material = material
        .get_or_insert_with(|| {
            materials.add(StandardMaterial {
                base_color: Color::WHITE,
                perceptual_roughness: 0.8,
                double_sided: true,
                cull_mode: None,
                ..default()
            })
        })
        .clone();

    for surface in registry.iter() {
        commands.spawn((
            Mesh3d(meshes.add(build_mesh(surface))),
            MeshMaterial3d(material.clone()),
            surface_transform(surface),
            Name::new(surface.name.clone()),
            SurfaceMesh {
                surface: surface.id,
                color_revision: surface.color_revision(),
            },
        ));
    }

    debug!(
        "Mirrored {} surfaces (model revision {})",
        current.surface_count, current.model_revision
    );
    *mirrored = current;
}

fn update_surface_colors(
    session: Res<ViewerSession>,
    mut query: Query<(&Mesh3d, &mut SurfaceMesh)>,
    mut meshes: ResMut<Assets<Mesh>>,
) {
    if !session.is_changed() {
        return;
    }
    for (mesh3d, mut surface_mesh) in query.iter_mut() {
        let Some(surface) = session.registry().get(surface_mesh.surface) else {
            continue;
        };
        if surface.color_revision() == surface_mesh.color_revision {
            continue;
        }
        if let Some(mesh) = meshes.get_mut(&mesh3d.0) {
            mesh.insert_attribute(Mesh::ATTRIBUTE_COLOR, vertex_colors(surface.colors()));
            surface_mesh.color_revision = surface.color_revision();
        }
    }
}
