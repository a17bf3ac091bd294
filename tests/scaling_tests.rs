//! DPI scaling policy tests
//!
//! Tests for:
//! - Round-half-up DIP-to-pixel conversion
//! - The high-DPI downscale policy and its three thresholds
//! - Orientation-agnostic threshold comparison
//! - The ≥1 output size clamp

use vitrine::display::scaling::{self, DPI_THRESHOLD, dips_to_pixels};
use vitrine::display::{LogicalSize, PixelSize, ScalingPolicy};

const POWER_SAVING: ScalingPolicy = ScalingPolicy {
    support_high_resolutions: false,
};
const FULL_FIDELITY: ScalingPolicy = ScalingPolicy {
    support_high_resolutions: true,
};

// ============================================================================
// DIP conversion
// ============================================================================

#[test]
fn dips_convert_at_reference_dpi_unchanged() {
    assert_eq!(dips_to_pixels(800.0, 96.0), 800.0);
    assert_eq!(dips_to_pixels(0.0, 96.0), 0.0);
}

#[test]
fn dips_round_half_up() {
    assert_eq!(dips_to_pixels(99.5, 96.0), 100.0);
    assert_eq!(dips_to_pixels(99.4, 96.0), 99.0);
    // 100 DIPs at 144 DPI is exactly 150 pixels.
    assert_eq!(dips_to_pixels(100.0, 144.0), 150.0);
    // 333 DIPs at 144 DPI is 499.5, which rounds up.
    assert_eq!(dips_to_pixels(333.0, 144.0), 500.0);
}

// ============================================================================
// Effective DPI policy
// ============================================================================

#[test]
fn large_high_dpi_surface_renders_at_half_dpi() {
    // 3840×2160 logical at 300 DPI crosses all three thresholds.
    let logical = LogicalSize::new(3840.0, 2160.0);
    assert_eq!(POWER_SAVING.effective_dpi(logical, 300.0), 150.0);
}

#[test]
fn high_resolution_support_disables_the_downscale() {
    let logical = LogicalSize::new(3840.0, 2160.0);
    assert_eq!(FULL_FIDELITY.effective_dpi(logical, 300.0), 300.0);
}

#[test]
fn dpi_threshold_is_strict() {
    // Exactly 192 DPI is not "above" the threshold, however large the
    // surface is.
    let logical = LogicalSize::new(3840.0, 2160.0);
    assert_eq!(POWER_SAVING.effective_dpi(logical, DPI_THRESHOLD), DPI_THRESHOLD);
    assert_eq!(POWER_SAVING.effective_dpi(logical, 192.5), 96.25);
}

#[test]
fn small_surfaces_keep_full_dpi() {
    // 100×100 logical at 300 DPI is 313×313 pixels, well under 1080p.
    let logical = LogicalSize::new(100.0, 100.0);
    assert_eq!(POWER_SAVING.effective_dpi(logical, 300.0), 300.0);
}

#[test]
fn size_thresholds_are_strict() {
    // At 240 DPI, 768×432 logical converts to exactly 1920×1080 pixels;
    // "exceeds" means strictly greater, so full DPI is kept.
    let logical = LogicalSize::new(768.0, 432.0);
    assert_eq!(dips_to_pixels(logical.width, 240.0), 1920.0);
    assert_eq!(dips_to_pixels(logical.height, 240.0), 1080.0);
    assert_eq!(POWER_SAVING.effective_dpi(logical, 240.0), 240.0);

    // One more logical pixel on each axis tips both comparisons.
    let logical = LogicalSize::new(769.0, 433.0);
    assert_eq!(POWER_SAVING.effective_dpi(logical, 240.0), 120.0);
}

#[test]
fn both_size_thresholds_must_be_exceeded() {
    // Very wide but short: width crosses 1920, height stays under 1080.
    let logical = LogicalSize::new(4000.0, 300.0);
    assert_eq!(POWER_SAVING.effective_dpi(logical, 300.0), 300.0);
}

#[test]
fn threshold_comparison_is_orientation_agnostic() {
    // The portrait twin of a qualifying landscape surface also qualifies:
    // the larger axis is measured against the width threshold.
    let portrait = LogicalSize::new(2160.0, 3840.0);
    assert_eq!(POWER_SAVING.effective_dpi(portrait, 300.0), 150.0);
}

// ============================================================================
// Output size
// ============================================================================

#[test]
fn output_size_converts_at_effective_dpi() {
    let logical = LogicalSize::new(800.0, 600.0);
    assert_eq!(scaling::output_size(logical, 96.0), PixelSize::new(800, 600));
    assert_eq!(scaling::output_size(logical, 192.0), PixelSize::new(1600, 1200));
}

#[test]
fn output_size_is_clamped_to_one_pixel() {
    assert_eq!(
        scaling::output_size(LogicalSize::new(0.0, 0.0), 96.0),
        PixelSize::new(1, 1)
    );
    // Sub-half-pixel sizes round to zero before the clamp applies.
    assert_eq!(
        scaling::output_size(LogicalSize::new(0.001, 2000.0), 96.0),
        PixelSize::new(1, 2000)
    );
}

#[test]
fn downscaled_scenario_recomputes_output_at_half_dpi() {
    // The policy halves 300 DPI to 150; output follows the effective value.
    let logical = LogicalSize::new(3840.0, 2160.0);
    let effective = POWER_SAVING.effective_dpi(logical, 300.0);
    assert_eq!(effective, 150.0);
    assert_eq!(
        scaling::output_size(logical, effective),
        PixelSize::new(6000, 3375)
    );
}
