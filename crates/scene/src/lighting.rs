//! Scene lighting and the ground plane

use bevy::light::GlobalAmbientLight;
use bevy::prelude::*;
use painting::{Surface, SurfaceId};

use crate::ViewerSession;

/// Half the side length of the ground square
const GROUND_HALF_EXTENT: f32 = 5.0;

const GROUND_COLOR: [f32; 3] = [0.3, 0.3, 0.3];

/// Session id of the ground plane
#[derive(Resource, Debug, Clone, Copy)]
pub struct Ground(pub SurfaceId);

/// Plugin for the light rig and ground
pub struct LightingPlugin;

impl Plugin for LightingPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, (setup_lighting, spawn_ground));
    }
}

/// Spawn the directional light and set the ambient light to match the
/// capture renderer's shading.
fn setup_lighting(mut commands: Commands, session: Res<ViewerSession>) {
    let capture = &session.config().capture;
    let direction = Vec3::from_array(capture.light_direction).normalize_or(Vec3::Y);

    commands.spawn((
        DirectionalLight {
            illuminance: capture.directional * 10_000.0,
            shadows_enabled: true,
            ..default()
        },
        // looking_to takes the forward direction; the light shines along -direction
        Transform::default().looking_to(-direction, Vec3::Y),
    ));

    commands.insert_resource(GlobalAmbientLight {
        color: Color::WHITE,
        brightness: capture.ambient * 1000.0,
        ..default()
    });

    info!("Scene lighting initialized");
}

fn ground_surface() -> Option<Surface> {
    let h = GROUND_HALF_EXTENT;
    let positions = vec![
        glam::Vec3::new(-h, 0.0, -h),
        glam::Vec3::new(h, 0.0, -h),
        glam::Vec3::new(h, 0.0, h),
        glam::Vec3::new(-h, 0.0, h),
    ];
    // Wound so the face normal points up
    let indices = vec![0, 2, 1, 0, 3, 2];
    match Surface::new("ground", positions, Some(vec![GROUND_COLOR; 4]), indices) {
        Ok(surface) => Some(surface),
        Err(err) => {
            warn!("Ground plane rejected: {}", err);
            None
        }
    }
}

/// Register the ground with the session so it occludes painting and shows
/// up in captures.
fn spawn_ground(mut commands: Commands, mut session: ResMut<ViewerSession>) {
    if let Some(ground) = ground_surface() {
        let id = session.add_scenery(ground);
        commands.insert_resource(Ground(id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ground_faces_up() {
        let ground = ground_surface().unwrap();
        let normals = crate::vertex_normals(&ground);
        assert!(normals.iter().all(|n| (n[1] - 1.0).abs() < 1e-6));
        assert_eq!(ground.colors()[0], GROUND_COLOR);
    }
}
