//! Checks applied to mesh buffers and colours on import.

use glam::Vec3;

use crate::error::SurfaceError;
use crate::types::Rgb;

/// Validate the buffers of a triangle mesh before it becomes a surface.
pub fn validate_buffers(
    positions: &[Vec3],
    colors: Option<&[Rgb]>,
    indices: &[u32],
) -> Result<(), SurfaceError> {
    if let Some(i) = positions.iter().position(|p| !p.is_finite()) {
        return Err(SurfaceError::NonFinitePosition(i));
    }

    if let Some(colors) = colors
        && colors.len() != positions.len()
    {
        return Err(SurfaceError::ColorCountMismatch {
            positions: positions.len(),
            colors: colors.len(),
        });
    }

    if indices.len() % 3 != 0 {
        return Err(SurfaceError::IndexCountNotTriangles(indices.len()));
    }

    if let Some(&index) = indices.iter().find(|&&i| i as usize >= positions.len()) {
        return Err(SurfaceError::IndexOutOfRange {
            index,
            vertex_count: positions.len(),
        });
    }

    Ok(())
}

/// Clamp a colour into the displayable 0..=1 range.
pub fn clamp_color(color: Rgb) -> Rgb {
    color.map(|c| if c.is_finite() { c.clamp(0.0, 1.0) } else { 0.0 })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tri() -> Vec<Vec3> {
        vec![Vec3::ZERO, Vec3::X, Vec3::Y]
    }

    #[test]
    fn test_valid_buffers() {
        assert!(validate_buffers(&tri(), None, &[0, 1, 2]).is_ok());
        assert!(validate_buffers(&tri(), Some(&[[1.0; 3]; 3]), &[0, 1, 2]).is_ok());
    }

    #[test]
    fn test_color_count_mismatch() {
        let err = validate_buffers(&tri(), Some(&[[1.0; 3]; 2]), &[0, 1, 2]).unwrap_err();
        assert_eq!(
            err,
            SurfaceError::ColorCountMismatch {
                positions: 3,
                colors: 2
            }
        );
    }

    #[test]
    fn test_bad_indices() {
        assert_eq!(
            validate_buffers(&tri(), None, &[0, 1]).unwrap_err(),
            SurfaceError::IndexCountNotTriangles(2)
        );
        assert_eq!(
            validate_buffers(&tri(), None, &[0, 1, 3]).unwrap_err(),
            SurfaceError::IndexOutOfRange {
                index: 3,
                vertex_count: 3
            }
        );
    }

    #[test]
    fn test_non_finite_position() {
        let positions = vec![Vec3::ZERO, Vec3::new(f32::NAN, 0.0, 0.0), Vec3::Y];
        assert_eq!(
            validate_buffers(&positions, None, &[0, 1, 2]).unwrap_err(),
            SurfaceError::NonFinitePosition(1)
        );
    }

    #[test]
    fn test_clamp_color() {
        assert_eq!(clamp_color([1.5, -0.2, f32::NAN]), [1.0, 0.0, 0.0]);
    }
}
