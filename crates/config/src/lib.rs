//! Shared configuration for inkmark
//!
//! This crate provides the single source of truth for every tunable used by
//! the paint engine, the capture service and the viewer: brush mapping,
//! camera defaults, model normalization, capture output and history depth.
//! All values are plain serde structs so they can be shipped to a UI or
//! loaded from JSON without pulling in the engine.

use serde::{Deserialize, Serialize};

#[cfg(feature = "bevy")]
use bevy::prelude::Resource;

/// Default viewport width in pixels
pub const DEFAULT_WIDTH: u32 = 1280;

/// Default viewport height in pixels
pub const DEFAULT_HEIGHT: u32 = 800;

/// Default scale factor (1.0 = no scaling)
pub const DEFAULT_SCALE: f32 = 1.0;

/// Brush colour used for annotations (#7B2BFF)
pub const DEFAULT_BRUSH_COLOR: [f32; 3] = hex_to_rgb(0x7B2BFF);

/// Viewer background colour (#F0F0F0)
pub const DEFAULT_BACKGROUND: [f32; 3] = hex_to_rgb(0xF0F0F0);

/// Convert a 0xRRGGBB literal into normalized RGB components.
pub const fn hex_to_rgb(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xFF) as f32 / 255.0,
        ((hex >> 8) & 0xFF) as f32 / 255.0,
        (hex & 0xFF) as f32 / 255.0,
    ]
}

/// Display configuration for the interactive viewport
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "bevy", derive(Resource))]
pub struct DisplayConfig {
    /// Viewport width in logical pixels
    pub width: u32,
    /// Viewport height in logical pixels
    pub height: u32,
    /// Scale factor for DPI scaling
    pub scale: f32,
    /// Clear colour behind the model
    pub background: [f32; 3],
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            scale: DEFAULT_SCALE,
            background: DEFAULT_BACKGROUND,
        }
    }
}

impl DisplayConfig {
    /// Create a new display config with the given dimensions
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Width over height, guarded against a zero-height viewport
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    /// Get scaled width (for physical pixel calculations)
    pub fn scaled_width(&self) -> u32 {
        (self.width as f32 * self.scale) as u32
    }

    /// Get scaled height (for physical pixel calculations)
    pub fn scaled_height(&self) -> u32 {
        (self.height as f32 * self.scale) as u32
    }
}

/// Distance-to-weight curve applied by the brush
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Falloff {
    /// `1 - d/r`
    Linear,
    /// `1 - (d/r)^2`, stronger in the centre
    #[default]
    Quadratic,
}

/// Brush settings and the UI slider mapping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrushConfig {
    /// Lowest value the UI slider can report
    pub ui_min: i32,
    /// Highest value the UI slider can report
    pub ui_max: i32,
    /// Slider position on startup
    pub ui_default: i32,
    /// World-space radius at `ui_min`
    pub radius_min: f32,
    /// World-space radius at `ui_max`
    pub radius_max: f32,
    /// Annotation colour (RGB, 0.0-1.0)
    pub color: [f32; 3],
    /// Falloff curve
    pub falloff: Falloff,
}

impl Default for BrushConfig {
    fn default() -> Self {
        Self {
            ui_min: 5,
            ui_max: 40,
            ui_default: 20,
            radius_min: 0.03,
            radius_max: 0.12,
            color: DEFAULT_BRUSH_COLOR,
            falloff: Falloff::Quadratic,
        }
    }
}

impl BrushConfig {
    /// Map a slider value onto a world-space radius.
    ///
    /// Values outside `ui_min..=ui_max` are clamped first.
    pub fn radius_for_ui(&self, ui_value: i32) -> f32 {
        let lo = self.ui_min.min(self.ui_max);
        let hi = self.ui_min.max(self.ui_max);
        let value = ui_value.clamp(lo, hi);
        let span = (self.ui_max - self.ui_min) as f32;
        if span == 0.0 {
            return self.radius_min;
        }
        let t = (value - self.ui_min) as f32 / span;
        self.radius_min + (self.radius_max - self.radius_min) * t
    }
}

/// Perspective camera defaults and zoom limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    /// Near clipping plane
    pub near: f32,
    /// Far clipping plane
    pub far: f32,
    /// Initial camera position
    pub position: [f32; 3],
    /// Initial look-at target
    pub target: [f32; 3],
    /// Multiplier applied by one zoom step
    pub zoom_step: f32,
    /// Smallest allowed zoom
    pub min_zoom: f32,
    /// Largest allowed zoom
    pub max_zoom: f32,
    /// Orbit sensitivity (radians per pixel)
    pub orbit_sensitivity: f32,
    /// Dolly sensitivity (fraction of distance per scroll line)
    pub dolly_sensitivity: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            near: 0.1,
            far: 1000.0,
            position: [0.0, 1.5, 8.0],
            target: [0.0, 1.5, 0.0],
            zoom_step: 1.2,
            min_zoom: 0.25,
            max_zoom: 8.0,
            orbit_sensitivity: 0.005,
            dolly_sensitivity: 0.1,
        }
    }
}

impl CameraConfig {
    /// Vertical field of view in radians
    pub fn fov_radians(&self) -> f32 {
        self.fov_degrees.to_radians()
    }
}

/// Canonical frame every loaded body is rescaled into
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizeConfig {
    /// Largest bounding-box extent after normalization (body height)
    pub target_size: f32,
    /// Where the bounding-box centre lands after normalization
    pub anchor: [f32; 3],
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            target_size: 3.0,
            anchor: [0.0, 1.5, 0.0],
        }
    }
}

/// Output settings for the capture pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Multiplier on the fit distance so silhouettes are not clipped
    pub padding: f32,
    /// Rendered image width in pixels
    pub width: u32,
    /// Rendered image height in pixels
    pub height: u32,
    /// Longest wait for one view's render to be confirmed complete
    pub frame_timeout_ms: u64,
    /// Ambient light contribution
    pub ambient: f32,
    /// Directional light contribution
    pub directional: f32,
    /// Direction towards the directional light
    pub light_direction: [f32; 3],
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            padding: 1.5,
            width: 800,
            height: 600,
            frame_timeout_ms: 100,
            ambient: 0.6,
            directional: 0.8,
            light_direction: [5.0, 5.0, 5.0],
        }
    }
}

/// Undo history limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Maximum number of gestures that can be undone
    pub max_levels: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { max_levels: 32 }
    }
}

/// Everything a paint session needs, grouped by concern
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "bevy", derive(Resource))]
pub struct SessionConfig {
    pub display: DisplayConfig,
    pub brush: BrushConfig,
    pub camera: CameraConfig,
    pub normalize: NormalizeConfig,
    pub capture: CaptureConfig,
    pub history: HistoryConfig,
    /// Name of the mesh to paint on; `None` means the first mesh in the asset
    pub main_mesh: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DisplayConfig::default();
        assert_eq!(config.width, DEFAULT_WIDTH);
        assert_eq!(config.height, DEFAULT_HEIGHT);
        assert_eq!(config.scale, DEFAULT_SCALE);
    }

    #[test]
    fn test_scaled_dimensions() {
        let mut config = DisplayConfig::default();
        config.scale = 2.0;
        assert_eq!(config.scaled_width(), 2560);
        assert_eq!(config.scaled_height(), 1600);
    }

    #[test]
    fn test_hex_to_rgb() {
        let [r, g, b] = hex_to_rgb(0x7B2BFF);
        assert!((r - 123.0 / 255.0).abs() < 1e-6);
        assert!((g - 43.0 / 255.0).abs() < 1e-6);
        assert_eq!(b, 1.0);
    }

    #[test]
    fn test_radius_mapping_endpoints() {
        let brush = BrushConfig::default();
        assert!((brush.radius_for_ui(5) - 0.03).abs() < 1e-6);
        assert!((brush.radius_for_ui(40) - 0.12).abs() < 1e-6);
        // Midpoint of the slider maps to the midpoint of the radius range
        let mid = brush.radius_for_ui(5) + (0.12 - 0.03) * (15.0 / 35.0);
        assert!((brush.radius_for_ui(20) - mid).abs() < 1e-6);
    }

    #[test]
    fn test_radius_mapping_clamps() {
        let brush = BrushConfig::default();
        assert!((brush.radius_for_ui(-100) - 0.03).abs() < 1e-6);
        assert!((brush.radius_for_ui(1000) - 0.12).abs() < 1e-6);
    }

    #[test]
    fn test_session_defaults() {
        let config = SessionConfig::default();
        assert!(config.main_mesh.is_none());
        assert_eq!(config.brush.falloff, Falloff::Quadratic);
        assert!((config.camera.fov_radians() - std::f32::consts::FRAC_PI_4).abs() < 1e-6);
        assert_eq!(config.capture.padding, 1.5);
    }
}
