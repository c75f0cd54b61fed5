//! Brush state and colour blending.
//!
//! The brush has a world-space radius derived from the UI slider, a fixed
//! annotation colour and a falloff curve. Blending only ever moves a colour
//! towards the brush colour; there is no erase.

use crate::config::{BrushConfig, Falloff};
use crate::types::Rgb;

fn clamp_ui(config: &BrushConfig, value: i32) -> i32 {
    value.clamp(config.ui_min.min(config.ui_max), config.ui_min.max(config.ui_max))
}

/// Current brush parameters, mutated only by the UI.
#[derive(Debug, Clone)]
pub struct BrushState {
    /// World-space radius
    pub radius: f32,
    pub color: Rgb,
    pub falloff: Falloff,
    ui_value: i32,
    mapping: BrushConfig,
}

impl BrushState {
    pub fn from_config(config: &BrushConfig) -> Self {
        Self {
            radius: config.radius_for_ui(config.ui_default),
            color: config.color,
            falloff: config.falloff,
            ui_value: clamp_ui(config, config.ui_default),
            mapping: config.clone(),
        }
    }

    /// Set the radius from a UI slider value (clamped to the slider range).
    pub fn set_ui_value(&mut self, ui_value: i32) {
        self.ui_value = clamp_ui(&self.mapping, ui_value);
        self.radius = self.mapping.radius_for_ui(self.ui_value);
    }

    pub fn ui_value(&self) -> i32 {
        self.ui_value
    }

    /// Largest radius the slider can produce
    pub fn max_radius(&self) -> f32 {
        self.mapping.radius_max.max(self.mapping.radius_min)
    }
}

impl Default for BrushState {
    fn default() -> Self {
        Self::from_config(&BrushConfig::default())
    }
}

/// Blend weight for a vertex at `distance` from the hit point.
///
/// 1 at the centre, 0 at the rim, 0 outside the radius.
pub fn falloff_weight(falloff: Falloff, distance: f32, radius: f32) -> f32 {
    if radius <= 0.0 || distance > radius {
        return 0.0;
    }
    let x = distance / radius;
    let weight = match falloff {
        Falloff::Linear => 1.0 - x,
        Falloff::Quadratic => 1.0 - x * x,
    };
    weight.clamp(0.0, 1.0)
}

/// Linear interpolation from `old` towards `brush` by `weight`.
pub fn blend(old: Rgb, brush: Rgb, weight: f32) -> Rgb {
    let w = weight.clamp(0.0, 1.0);
    [
        old[0] * (1.0 - w) + brush[0] * w,
        old[1] * (1.0 - w) + brush[1] * w,
        old[2] * (1.0 - w) + brush[2] * w,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn distance_to(a: Rgb, b: Rgb) -> f32 {
        a.iter()
            .zip(b.iter())
            .map(|(x, y)| (x - y) * (x - y))
            .sum::<f32>()
            .sqrt()
    }

    #[test]
    fn test_default_brush() {
        let brush = BrushState::default();
        assert_eq!(brush.ui_value(), 20);
        assert_eq!(brush.falloff, Falloff::Quadratic);
        assert!(brush.radius > 0.03 && brush.radius < 0.12);
    }

    #[test]
    fn test_set_ui_value_clamps() {
        let mut brush = BrushState::default();
        brush.set_ui_value(1000);
        assert_eq!(brush.ui_value(), 40);
        assert!((brush.radius - 0.12).abs() < 1e-6);
        brush.set_ui_value(0);
        assert_eq!(brush.ui_value(), 5);
        assert!((brush.radius - 0.03).abs() < 1e-6);
    }

    #[test]
    fn test_falloff_shapes() {
        assert_eq!(falloff_weight(Falloff::Quadratic, 0.0, 0.1), 1.0);
        assert_eq!(falloff_weight(Falloff::Linear, 0.0, 0.1), 1.0);
        assert!((falloff_weight(Falloff::Linear, 0.05, 0.1) - 0.5).abs() < 1e-6);
        assert!((falloff_weight(Falloff::Quadratic, 0.05, 0.1) - 0.75).abs() < 1e-6);
        assert_eq!(falloff_weight(Falloff::Quadratic, 0.1, 0.1), 0.0);
        assert_eq!(falloff_weight(Falloff::Quadratic, 0.2, 0.1), 0.0);
        assert_eq!(falloff_weight(Falloff::Quadratic, 0.0, 0.0), 0.0);
    }

    #[test]
    fn test_quadratic_is_stronger_in_centre() {
        for d in [0.01, 0.03, 0.05, 0.09] {
            assert!(
                falloff_weight(Falloff::Quadratic, d, 0.1) >= falloff_weight(Falloff::Linear, d, 0.1)
            );
        }
    }

    #[test]
    fn test_blend_moves_monotonically_towards_brush() {
        let brush = [0.48, 0.17, 1.0];
        let mut color = [1.0, 1.0, 1.0];
        let mut last = distance_to(color, brush);
        for _ in 0..10 {
            color = blend(color, brush, 0.3);
            let now = distance_to(color, brush);
            assert!(now <= last);
            last = now;
        }
        assert_eq!(blend(color, brush, 1.0), brush);
        assert_eq!(blend(color, brush, 0.0), color);
    }
}
