//! Camera placement for the capture pass.
//!
//! Focused framing fits the bounding box of the annotated points into the
//! vertical field of view and looks at it from five fixed directions. Default
//! framing circles the current look-at target at the current distance.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::bounds::Aabb;
use crate::camera::CameraState;
use crate::error::FramingError;

/// Which side of the subject a captured view shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViewLabel {
    Front,
    Right,
    Back,
    Left,
    Top,
}

impl ViewLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewLabel::Front => "front",
            ViewLabel::Right => "right",
            ViewLabel::Back => "back",
            ViewLabel::Left => "left",
            ViewLabel::Top => "top",
        }
    }
}

/// Focused view directions in capture order. Bottom is omitted.
pub const FOCUSED_DIRECTIONS: [(ViewLabel, Vec3); 5] = [
    (ViewLabel::Front, Vec3::Z),
    (ViewLabel::Right, Vec3::X),
    (ViewLabel::Back, Vec3::NEG_Z),
    (ViewLabel::Left, Vec3::NEG_X),
    (ViewLabel::Top, Vec3::Y),
];

/// Default view labels, one per quarter turn starting at +Z.
pub const DEFAULT_VIEWS: [ViewLabel; 4] = [
    ViewLabel::Front,
    ViewLabel::Right,
    ViewLabel::Back,
    ViewLabel::Left,
];

/// One camera placement of the capture pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewPose {
    pub label: ViewLabel,
    pub position: Vec3,
    pub target: Vec3,
}

/// Framing of the annotated region.
#[derive(Debug, Clone, PartialEq)]
pub struct FocusedFrame {
    pub bounds: Aabb,
    pub center: Vec3,
    /// Padded camera distance from `center`
    pub distance: f32,
    pub views: Vec<ViewPose>,
}

impl FocusedFrame {
    /// Whether the camera sits closer than `near`, so part of the region
    /// is cut away by the near plane.
    pub fn inside_near_plane(&self, near: f32) -> bool {
        self.distance < near
    }
}

/// Which strategy a capture used, with its camera placements.
#[derive(Debug, Clone, PartialEq)]
pub enum CapturePlan {
    Default(Vec<ViewPose>),
    Focused(FocusedFrame),
}

impl CapturePlan {
    pub fn views(&self) -> &[ViewPose] {
        match self {
            CapturePlan::Default(views) => views,
            CapturePlan::Focused(frame) => &frame.views,
        }
    }

    pub fn is_focused(&self) -> bool {
        matches!(self, CapturePlan::Focused(_))
    }
}

/// Distance at which an object of size `max_dim` fills the vertical field
/// of view, times `padding`.
pub fn fit_distance(max_dim: f32, fov_y: f32, padding: f32) -> f32 {
    padding * max_dim / (2.0 * (fov_y * 0.5).tan())
}

/// Frame a set of world-space points from the five focused directions.
pub fn plan_focused(points: &[Vec3], fov_y: f32, padding: f32) -> Result<FocusedFrame, FramingError> {
    let bounds = Aabb::from_points(points.iter().copied()).ok_or(FramingError::NoPoints)?;
    if bounds.is_degenerate() {
        return Err(FramingError::DegenerateBoundingVolume {
            extent: bounds.size().to_array(),
        });
    }

    let center = bounds.center();
    let distance = fit_distance(bounds.max_extent(), fov_y, padding);
    let views = FOCUSED_DIRECTIONS
        .iter()
        .map(|(label, direction)| ViewPose {
            label: *label,
            position: center + direction.normalize() * distance,
            target: center,
        })
        .collect();

    Ok(FocusedFrame {
        bounds,
        center,
        distance,
        views,
    })
}

/// Four views at quarter turns around the vertical axis through the current
/// target, keeping the current camera distance and height.
pub fn plan_default(state: &CameraState) -> Vec<ViewPose> {
    let target = state.target;
    let radius = state.position.distance(target);
    let y = state.position.y;

    DEFAULT_VIEWS
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let angle = i as f32 * std::f32::consts::FRAC_PI_2;
            ViewPose {
                label: *label,
                position: Vec3::new(
                    target.x + radius * angle.sin(),
                    y,
                    target.z + radius * angle.cos(),
                ),
                target,
            }
        })
        .collect()
}
