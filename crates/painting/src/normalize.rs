//! Rescaling loaded models into the canonical frame.
//!
//! Source assets come in arbitrary units. Brush radii and camera distances are
//! tuned against a body whose largest extent is `target_size` and whose centre
//! sits at `anchor`, so every model is brought into that frame on load.

use glam::Vec3;

use crate::bounds::Aabb;
use crate::config::NormalizeConfig;
use crate::error::NormalizeError;
use crate::surface::Surface;

/// What normalization did to a model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizeReport {
    /// Uniform scale applied about the world origin
    pub scale: f32,
    /// Translation applied after scaling
    pub offset: Vec3,
    /// World bounds after normalization
    pub bounds: Aabb,
}

fn group_bounds(surfaces: &[Surface]) -> Option<Aabb> {
    surfaces
        .iter()
        .filter_map(Surface::world_bounds)
        .reduce(|a, b| a.union(&b))
}

/// Normalize a group of surfaces as one rigid body.
///
/// The relative placement of the surfaces is preserved. On a degenerate
/// bounding volume nothing is modified.
pub fn normalize_surfaces(
    surfaces: &mut [Surface],
    config: &NormalizeConfig,
) -> Result<NormalizeReport, NormalizeError> {
    let bounds = group_bounds(surfaces).unwrap_or_else(Aabb::empty);
    if bounds.is_degenerate() {
        let extent = if bounds.is_empty() {
            [0.0; 3]
        } else {
            bounds.size().to_array()
        };
        return Err(NormalizeError::DegenerateBoundingVolume { extent });
    }

    let scale = config.target_size / bounds.max_extent();
    for surface in surfaces.iter_mut() {
        surface.transform.prepend_uniform_scale(scale);
    }

    // Recompute rather than scale the old box so rotated parts stay exact
    let scaled = group_bounds(surfaces).unwrap_or(bounds);
    let offset = Vec3::from(config.anchor) - scaled.center();
    for surface in surfaces.iter_mut() {
        surface.transform.translate(offset);
    }

    let report = NormalizeReport {
        scale,
        offset,
        bounds: Aabb::new(scaled.min + offset, scaled.max + offset),
    };
    tracing::debug!(
        "Normalized {} surfaces: scale {:.4}, offset {:?}",
        surfaces.len(),
        report.scale,
        report.offset
    );
    Ok(report)
}

/// Normalize a single surface.
pub fn normalize(
    surface: &mut Surface,
    config: &NormalizeConfig,
) -> Result<NormalizeReport, NormalizeError> {
    normalize_surfaces(std::slice::from_mut(surface), config)
}
