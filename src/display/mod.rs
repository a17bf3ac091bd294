//! Display Geometry & Policy
//!
//! Pure display math: orientation/rotation lookup, DPI scaling policy, and
//! the derived surface geometry the device resource manager maintains. None
//! of this touches the GPU, which keeps every property in this module
//! directly unit-testable.

pub mod geometry;
pub mod orientation;
pub mod scaling;

pub use geometry::SurfaceGeometry;
pub use orientation::{DisplayOrientation, DisplayRotation};
pub use scaling::ScalingPolicy;

/// Window size in device-independent units (DIPs).
///
/// Unaffected by display scaling; the authoritative input to pixel size
/// computation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LogicalSize {
    pub width: f32,
    pub height: f32,
}

impl LogicalSize {
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// A size in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

impl PixelSize {
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// The same size with width and height exchanged.
    #[must_use]
    pub const fn transposed(self) -> Self {
        Self {
            width: self.height,
            height: self.width,
        }
    }
}

/// A render viewport in pixels, with the standard depth range.
///
/// Matches the argument order of `wgpu::RenderPass::set_viewport`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Viewport {
    /// A viewport covering the full extent of `size`.
    #[must_use]
    pub fn full(size: PixelSize) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: size.width as f32,
            height: size.height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }

    /// Applies this viewport to a render pass.
    pub fn apply(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_viewport(
            self.x,
            self.y,
            self.width,
            self.height,
            self.min_depth,
            self.max_depth,
        );
    }
}
