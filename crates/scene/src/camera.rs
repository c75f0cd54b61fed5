//! Camera controller
//!
//! Controls (navigation mode only):
//! - Left mouse drag: Orbit around target
//! - Scroll wheel: Dolly
//!
//! The session owns the camera; this module only feeds it input and copies
//! its pose and field of view onto the Bevy camera whenever it changes.

use bevy::core_pipeline::tonemapping::Tonemapping;
use bevy::input::mouse::{MouseButton, MouseMotion, MouseWheel};
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use painting::ViewCamera;

use crate::ViewerSession;

/// Marker component for the main camera
#[derive(Component)]
pub struct MainCamera;

/// Plugin for orbit/dolly navigation and camera sync
pub struct CameraControllerPlugin;

impl Plugin for CameraControllerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_camera).add_systems(
            Update,
            (
                track_viewport,
                camera_orbit_system,
                camera_dolly_system,
                update_camera_transform
                    .after(camera_orbit_system)
                    .after(camera_dolly_system),
            ),
        );
    }
}

fn camera_transform(camera: &ViewCamera) -> Transform {
    Transform::from_translation(Vec3::from_array(camera.position.to_array())).looking_at(
        Vec3::from_array(camera.target.to_array()),
        Vec3::from_array(camera.effective_up().to_array()),
    )
}

fn spawn_camera(mut commands: Commands, session: Res<ViewerSession>) {
    let camera = session.camera();
    commands.spawn((
        Camera3d::default(),
        camera_transform(camera),
        Projection::Perspective(PerspectiveProjection {
            fov: camera.effective_fov(),
            near: camera.near,
            far: camera.far,
            ..default()
        }),
        Tonemapping::Reinhard,
        MainCamera,
    ));
}

/// Keep the session's aspect ratio in step with the window so pointer rays
/// match the picture.
fn track_viewport(
    windows: Query<&Window, With<PrimaryWindow>>,
    mut session: ResMut<ViewerSession>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let aspect = window.width() / window.height().max(1.0);
    if (session.camera().aspect - aspect).abs() > f32::EPSILON {
        session.set_viewport(window.width(), window.height());
    }
}

/// Handle orbit (left mouse drag outside paint mode)
fn camera_orbit_system(
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut motion_events: MessageReader<MouseMotion>,
    mut session: ResMut<ViewerSession>,
) {
    if session.paint_mode() || !mouse_button.pressed(MouseButton::Left) {
        motion_events.clear();
        return;
    }

    let mut delta = Vec2::ZERO;
    for event in motion_events.read() {
        delta += event.delta;
    }

    if delta == Vec2::ZERO {
        return;
    }
    session.orbit(delta.to_array().into());
}

/// Handle dolly (scroll wheel)
fn camera_dolly_system(
    mut scroll_events: MessageReader<MouseWheel>,
    mut session: ResMut<ViewerSession>,
) {
    let mut scroll_delta = 0.0;
    for event in scroll_events.read() {
        scroll_delta += event.y;
    }

    if scroll_delta == 0.0 {
        return;
    }
    session.dolly(scroll_delta);
}

/// Copy the session camera onto the Bevy camera
fn update_camera_transform(
    session: Res<ViewerSession>,
    mut camera_query: Query<(&mut Transform, &mut Projection), With<MainCamera>>,
) {
    if !session.is_changed() {
        return;
    }
    let camera = session.camera();
    for (mut transform, mut projection) in camera_query.iter_mut() {
        *transform = camera_transform(camera);
        if let Projection::Perspective(perspective) = projection.as_mut() {
            perspective.fov = camera.effective_fov();
        }
    }
}
