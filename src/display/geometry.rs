//! Derived Surface Geometry
//!
//! [`SurfaceGeometry`] bundles every value derived from the externally
//! changing display inputs (logical size, DPI, orientation pair) into one
//! immutable snapshot: effective DPI, output size, display rotation,
//! render-target size, viewport, and both orientation transforms.
//!
//! The device resource manager recomputes a fresh snapshot at the start of
//! every window-size-dependent reconstruction, so the GPU side only ever
//! consumes a consistent set of derived values.

use glam::{Affine2, Mat4};

use crate::errors::Result;

use super::orientation::{DisplayOrientation, DisplayRotation};
use super::scaling::{self, ScalingPolicy};
use super::{LogicalSize, PixelSize, Viewport};

/// A consistent snapshot of all size- and orientation-derived state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceGeometry {
    /// The DPI actually used for pixel conversion (may be downscaled from
    /// the raw display DPI; see [`ScalingPolicy`]).
    pub effective_dpi: f32,
    /// Physical pixel dimensions of the window contents.
    pub output_size: PixelSize,
    /// Rotation between native and current orientation.
    pub rotation: DisplayRotation,
    /// [`Self::output_size`] with axes swapped for quarter-turn rotations;
    /// the size every size-dependent GPU resource is allocated at.
    pub render_target_size: PixelSize,
    /// Full-surface viewport over [`Self::render_target_size`].
    pub viewport: Viewport,
    /// 2D overlay transform for the current rotation and logical size.
    pub transform_2d: Affine2,
    /// 3D pre-rotation matrix for the current rotation.
    pub transform_3d: Mat4,
}

impl SurfaceGeometry {
    /// Derives the full geometry snapshot from the current display inputs.
    ///
    /// # Errors
    ///
    /// Returns [`VitrineError::UnsupportedOrientation`](crate::VitrineError::UnsupportedOrientation)
    /// when the orientation pair is outside the rotation table.
    pub fn compute(
        logical_size: LogicalSize,
        raw_dpi: f32,
        native: DisplayOrientation,
        current: DisplayOrientation,
        policy: &ScalingPolicy,
    ) -> Result<Self> {
        let effective_dpi = policy.effective_dpi(logical_size, raw_dpi);
        let output_size = scaling::output_size(logical_size, effective_dpi);

        let rotation = DisplayRotation::between(native, current)?;

        // The presentation chain is allocated as if the display were in its
        // native orientation, so quarter turns swap the axes.
        let render_target_size = if rotation.swaps_dimensions() {
            output_size.transposed()
        } else {
            output_size
        };

        Ok(Self {
            effective_dpi,
            output_size,
            rotation,
            render_target_size,
            viewport: Viewport::full(render_target_size),
            transform_2d: rotation.transform_2d(logical_size),
            transform_3d: rotation.transform_3d(),
        })
    }
}

impl Default for SurfaceGeometry {
    /// Geometry for an unbound manager: a 1×1 identity-rotation surface.
    fn default() -> Self {
        Self::compute(
            LogicalSize::default(),
            scaling::DIPS_PER_INCH,
            DisplayOrientation::Landscape,
            DisplayOrientation::Landscape,
            &ScalingPolicy::default(),
        )
        .expect("landscape/landscape is always a valid pair")
    }
}
