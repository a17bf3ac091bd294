//! DPI Scaling Policy
//!
//! Converts logical window size plus display DPI into physical pixel
//! dimensions, applying the high-DPI power-saving downscale policy.
//!
//! High-resolution displays can require a great deal of GPU and battery
//! power to render at full fidelity. When [`ScalingPolicy`] leaves
//! `support_high_resolutions` off and the display crosses all three
//! thresholds below, rendering runs at half the reported DPI — a quarter of
//! the pixel count — and the presentation hardware upscales the output.

use super::{LogicalSize, PixelSize};

/// Device-independent pixels per inch of the reference desktop display.
pub const DIPS_PER_INCH: f32 = 96.0;

/// DPI above which a display counts as "high resolution" (200% of the
/// standard desktop display).
pub const DPI_THRESHOLD: f32 = 192.0;

/// Width threshold in physical pixels (1080p width).
pub const WIDTH_THRESHOLD: f32 = 1920.0;

/// Height threshold in physical pixels (1080p height).
pub const HEIGHT_THRESHOLD: f32 = 1080.0;

/// Converts a length in device-independent pixels to physical pixels,
/// rounding to the nearest integer.
#[inline]
#[must_use]
pub fn dips_to_pixels(dips: f32, dpi: f32) -> f32 {
    (dips * dpi / DIPS_PER_INCH + 0.5).floor()
}

/// The high-DPI downscale policy.
///
/// Whether to render at full fidelity on every display is a deliberate
/// product decision, so it is a configuration point rather than a law.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScalingPolicy {
    /// Render at the display's full reported DPI even on high-resolution
    /// displays. Off by default: large surfaces above 1080p at more than
    /// double the reference DPI render at half DPI instead.
    pub support_high_resolutions: bool,
}

impl ScalingPolicy {
    /// The DPI actually used for logical-to-physical conversion.
    ///
    /// Equals `raw_dpi` unless high-resolution support is disabled, the DPI
    /// exceeds [`DPI_THRESHOLD`], and the converted size exceeds
    /// [`WIDTH_THRESHOLD`] on its larger axis and [`HEIGHT_THRESHOLD`] on
    /// its smaller axis. The max/min comparison makes the check
    /// orientation-agnostic: a portrait display is measured against the same
    /// thresholds as its landscape twin.
    #[must_use]
    pub fn effective_dpi(&self, logical_size: LogicalSize, raw_dpi: f32) -> f32 {
        if !self.support_high_resolutions && raw_dpi > DPI_THRESHOLD {
            let width = dips_to_pixels(logical_size.width, raw_dpi);
            let height = dips_to_pixels(logical_size.height, raw_dpi);

            if width.max(height) > WIDTH_THRESHOLD && width.min(height) > HEIGHT_THRESHOLD {
                // Scaling happens through the effective DPI; the logical
                // size itself never changes.
                return raw_dpi / 2.0;
            }
        }
        raw_dpi
    }
}

/// Physical output size for a logical size at the given effective DPI.
///
/// Each axis is clamped to a minimum of one pixel so zero-sized GPU
/// resources can never be requested.
#[must_use]
pub fn output_size(logical_size: LogicalSize, effective_dpi: f32) -> PixelSize {
    let width = dips_to_pixels(logical_size.width, effective_dpi);
    let height = dips_to_pixels(logical_size.height, effective_dpi);

    PixelSize {
        width: (width as u32).max(1),
        height: (height as u32).max(1),
    }
}
