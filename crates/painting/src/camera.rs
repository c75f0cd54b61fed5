//! Perspective camera and orbit controller
//!
//! [`ViewCamera`] is the single camera shared by painting (pointer rays),
//! navigation and the capture pass. [`OrbitController`] turns mouse drags
//! and scrolls into yaw/pitch/distance around the look-at target.

use glam::{Mat4, Vec2, Vec3};

use crate::config::CameraConfig;
use crate::raycast::Ray;

/// Perspective camera looking at a target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewCamera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view at zoom 1.0, in radians
    pub fov_y: f32,
    /// Width over height
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    /// Optical zoom; values above 1 narrow the field of view
    pub zoom: f32,
}

/// The parts of the camera the capture pass moves and must put back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub position: Vec3,
    pub target: Vec3,
    pub zoom: f32,
}

impl ViewCamera {
    pub fn from_config(config: &CameraConfig, aspect: f32) -> Self {
        Self {
            position: Vec3::from(config.position),
            target: Vec3::from(config.target),
            up: Vec3::Y,
            fov_y: config.fov_radians(),
            aspect,
            near: config.near,
            far: config.far,
            zoom: 1.0,
        }
    }

    /// Field of view after zoom: `2 * atan(tan(fov / 2) / zoom)`.
    pub fn effective_fov(&self) -> f32 {
        let zoom = if self.zoom > 0.0 { self.zoom } else { 1.0 };
        2.0 * ((self.fov_y * 0.5).tan() / zoom).atan()
    }

    /// Up vector usable with the current view direction.
    ///
    /// Looking straight down (the top capture view) is parallel to +Y, so
    /// -Z is used instead.
    pub fn effective_up(&self) -> Vec3 {
        let forward = (self.target - self.position).normalize_or_zero();
        if forward.cross(self.up).length_squared() < 1e-8 {
            Vec3::NEG_Z
        } else {
            self.up
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.effective_up())
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection_for_aspect(self.aspect)
    }

    pub fn projection_for_aspect(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.effective_fov(), aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// World-space ray through a point in normalized device coordinates
    /// (x right, y up, both in -1..1).
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let inverse = self.view_projection().inverse();
        let far = inverse.project_point3(Vec3::new(ndc.x, ndc.y, 1.0));
        Ray::new(self.position, far - self.position)
    }

    pub fn state(&self) -> CameraState {
        CameraState {
            position: self.position,
            target: self.target,
            zoom: self.zoom,
        }
    }

    pub fn restore(&mut self, state: &CameraState) {
        self.position = state.position;
        self.target = state.target;
        self.zoom = state.zoom;
    }

    /// Point the camera from `position` at `target`.
    pub fn look_from(&mut self, position: Vec3, target: Vec3) {
        self.position = position;
        self.target = target;
    }
}

/// Map a cursor position in window pixels (origin top-left) to NDC.
pub fn pointer_to_ndc(cursor: Vec2, viewport: Vec2) -> Vec2 {
    let size = viewport.max(Vec2::ONE);
    Vec2::new(cursor.x / size.x * 2.0 - 1.0, 1.0 - cursor.y / size.y * 2.0)
}

/// Orbit navigation state around the camera target.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitController {
    /// Point the camera orbits around
    pub target: Vec3,
    /// Distance from target
    pub distance: f32,
    /// Horizontal angle (yaw) in radians
    pub yaw: f32,
    /// Vertical angle (pitch) in radians
    pub pitch: f32,
    /// Orbit sensitivity (radians per pixel)
    pub orbit_sensitivity: f32,
    /// Fraction of the distance moved per scroll line
    pub dolly_sensitivity: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl OrbitController {
    pub fn from_config(config: &CameraConfig) -> Self {
        let mut orbit = Self {
            target: Vec3::from(config.target),
            distance: 1.0,
            yaw: 0.0,
            pitch: 0.0,
            orbit_sensitivity: config.orbit_sensitivity,
            dolly_sensitivity: config.dolly_sensitivity,
            min_distance: 0.5,
            max_distance: 200.0,
        };
        orbit.sync_to(Vec3::from(config.position), Vec3::from(config.target));
        orbit
    }

    fn sync_to(&mut self, position: Vec3, target: Vec3) {
        let offset = position - target;
        self.target = target;
        self.distance = offset.length();
        if self.distance > 0.0 {
            self.yaw = offset.x.atan2(offset.z);
            self.pitch = (offset.y / self.distance).clamp(-1.0, 1.0).asin();
        }
    }

    /// Re-derive yaw/pitch/distance from the camera, e.g. after a capture
    /// pass moved it behind the controller's back.
    pub fn sync_from(&mut self, camera: &ViewCamera) {
        self.sync_to(camera.position, camera.target);
    }

    /// Apply a mouse drag in pixels.
    pub fn orbit(&mut self, delta: Vec2) {
        self.yaw -= delta.x * self.orbit_sensitivity;
        self.pitch -= delta.y * self.orbit_sensitivity;
        // Just below straight up/down to avoid flipping
        self.pitch = self.pitch.clamp(-1.5, 1.5);
    }

    /// Move towards (positive) or away from the target by scroll lines.
    pub fn dolly(&mut self, lines: f32) {
        self.distance -= lines * self.dolly_sensitivity * self.distance;
        self.distance = self.distance.clamp(self.min_distance, self.max_distance);
    }

    /// Camera position from orbit parameters
    pub fn calculate_position(&self) -> Vec3 {
        let horizontal_distance = self.distance * self.pitch.cos();
        let y = self.distance * self.pitch.sin();
        let x = horizontal_distance * self.yaw.sin();
        let z = horizontal_distance * self.yaw.cos();

        self.target + Vec3::new(x, y, z)
    }

    pub fn apply(&self, camera: &mut ViewCamera) {
        camera.look_from(self.calculate_position(), self.target);
    }
}
