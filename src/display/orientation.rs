//! Orientation & Rotation Math
//!
//! Maps a display's fixed native orientation and its current (possibly
//! user-rotated) orientation to the relative [`DisplayRotation`], and derives
//! the 2D and 3D transforms dependents apply to draw pre-rotated content.
//!
//! The rotation lookup is a single total `match` over the (native, current)
//! pair, so every combination is either a named rotation or a named error —
//! there is no implicit fall-through. The 3D matrices are exact constants
//! rather than trigonometrically derived, avoiding floating-point drift
//! across the four fixed angles.

use glam::{Affine2, Mat2, Mat4, Vec2};

use crate::errors::{Result, VitrineError};

use super::LogicalSize;

/// A display orientation, as reported by the windowing environment.
///
/// Native orientation is restricted to [`Landscape`](Self::Landscape) and
/// [`Portrait`](Self::Portrait); the flipped variants only occur as current
/// orientations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayOrientation {
    Landscape,
    Portrait,
    LandscapeFlipped,
    PortraitFlipped,
}

/// The relative rotation between a display's native and current orientation.
///
/// Angles are the amount of rotation the presentation hardware would apply;
/// content is pre-rotated by the inverse via [`transform_3d`](Self::transform_3d).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DisplayRotation {
    #[default]
    Identity,
    Rotate90,
    Rotate180,
    Rotate270,
}

// Exact rotation matrices for the four fixed angles (column-major).
const ROTATION_0: Mat4 = Mat4::IDENTITY;

#[rustfmt::skip]
const ROTATION_90: Mat4 = Mat4::from_cols_array(&[
     0.0, 1.0, 0.0, 0.0,
    -1.0, 0.0, 0.0, 0.0,
     0.0, 0.0, 1.0, 0.0,
     0.0, 0.0, 0.0, 1.0,
]);

#[rustfmt::skip]
const ROTATION_180: Mat4 = Mat4::from_cols_array(&[
    -1.0,  0.0, 0.0, 0.0,
     0.0, -1.0, 0.0, 0.0,
     0.0,  0.0, 1.0, 0.0,
     0.0,  0.0, 0.0, 1.0,
]);

#[rustfmt::skip]
const ROTATION_270: Mat4 = Mat4::from_cols_array(&[
    0.0, -1.0, 0.0, 0.0,
    1.0,  0.0, 0.0, 0.0,
    0.0,  0.0, 1.0, 0.0,
    0.0,  0.0, 0.0, 1.0,
]);

impl DisplayRotation {
    /// Computes the rotation between a native and a current orientation.
    ///
    /// Native orientation must be [`DisplayOrientation::Landscape`] or
    /// [`DisplayOrientation::Portrait`]; any other native value returns
    /// [`VitrineError::UnsupportedOrientation`].
    pub fn between(
        native: DisplayOrientation,
        current: DisplayOrientation,
    ) -> Result<DisplayRotation> {
        use DisplayOrientation::{Landscape, LandscapeFlipped, Portrait, PortraitFlipped};

        match (native, current) {
            (Landscape, Landscape) => Ok(Self::Identity),
            (Landscape, Portrait) => Ok(Self::Rotate270),
            (Landscape, LandscapeFlipped) => Ok(Self::Rotate180),
            (Landscape, PortraitFlipped) => Ok(Self::Rotate90),

            (Portrait, Landscape) => Ok(Self::Rotate90),
            (Portrait, Portrait) => Ok(Self::Identity),
            (Portrait, LandscapeFlipped) => Ok(Self::Rotate270),
            (Portrait, PortraitFlipped) => Ok(Self::Rotate180),

            (LandscapeFlipped | PortraitFlipped, _) => {
                Err(VitrineError::UnsupportedOrientation { native, current })
            }
        }
    }

    /// Whether this rotation exchanges the width and height axes.
    #[inline]
    #[must_use]
    pub const fn swaps_dimensions(self) -> bool {
        matches!(self, Self::Rotate90 | Self::Rotate270)
    }

    /// The pure rotation matrix 3D content applies to render pre-rotated.
    ///
    /// The 3D angle differs from the 2D angle for the quarter turns: the
    /// coordinate spaces rotate in opposite directions, so `Rotate90` yields
    /// the 270° matrix and vice versa.
    #[must_use]
    pub const fn transform_3d(self) -> Mat4 {
        match self {
            Self::Identity => ROTATION_0,
            Self::Rotate90 => ROTATION_270,
            Self::Rotate180 => ROTATION_180,
            Self::Rotate270 => ROTATION_90,
        }
    }

    /// The 2D transform (rotation plus translation) that keeps overlay
    /// content framed inside the logical window bounds after rotation.
    ///
    /// For the quarter turns the translation re-anchors the origin so the
    /// rotated logical rectangle lands on the positive quadrant.
    #[must_use]
    pub fn transform_2d(self, logical_size: LogicalSize) -> Affine2 {
        let LogicalSize { width, height } = logical_size;
        match self {
            Self::Identity => Affine2::IDENTITY,
            Self::Rotate90 => Affine2::from_mat2_translation(
                Mat2::from_cols(Vec2::new(0.0, 1.0), Vec2::new(-1.0, 0.0)),
                Vec2::new(height, 0.0),
            ),
            Self::Rotate180 => Affine2::from_mat2_translation(
                Mat2::from_cols(Vec2::new(-1.0, 0.0), Vec2::new(0.0, -1.0)),
                Vec2::new(width, height),
            ),
            Self::Rotate270 => Affine2::from_mat2_translation(
                Mat2::from_cols(Vec2::new(0.0, -1.0), Vec2::new(1.0, 0.0)),
                Vec2::new(0.0, width),
            ),
        }
    }
}
