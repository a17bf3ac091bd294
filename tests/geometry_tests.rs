//! Surface geometry derivation tests
//!
//! Tests the consistency of the full derived snapshot: effective DPI,
//! output size, rotation, render-target size, viewport, and transforms.

use glam::{Affine2, Mat4};
use vitrine::display::{
    DisplayOrientation, DisplayRotation, LogicalSize, PixelSize, ScalingPolicy, SurfaceGeometry,
    Viewport,
};
use vitrine::errors::VitrineError;

use vitrine::display::DisplayOrientation::{
    Landscape, LandscapeFlipped, Portrait, PortraitFlipped,
};

fn compute(
    logical: LogicalSize,
    dpi: f32,
    native: DisplayOrientation,
    current: DisplayOrientation,
) -> SurfaceGeometry {
    SurfaceGeometry::compute(logical, dpi, native, current, &ScalingPolicy::default()).unwrap()
}

#[test]
fn unrotated_landscape_window() {
    let geometry = compute(LogicalSize::new(800.0, 600.0), 96.0, Landscape, Landscape);

    assert_eq!(geometry.rotation, DisplayRotation::Identity);
    assert_eq!(geometry.effective_dpi, 96.0);
    assert_eq!(geometry.output_size, PixelSize::new(800, 600));
    assert_eq!(geometry.render_target_size, PixelSize::new(800, 600));
    assert_eq!(geometry.transform_2d, Affine2::IDENTITY);
    assert_eq!(geometry.transform_3d, Mat4::IDENTITY);
}

#[test]
fn portrait_turn_swaps_the_render_target() {
    let geometry = compute(LogicalSize::new(800.0, 600.0), 96.0, Landscape, Portrait);

    assert_eq!(geometry.rotation, DisplayRotation::Rotate270);
    assert_eq!(geometry.output_size, PixelSize::new(800, 600));
    assert_eq!(geometry.render_target_size, PixelSize::new(600, 800));
}

#[test]
fn render_target_swap_matches_the_rotation_for_every_pair() {
    let logical = LogicalSize::new(1280.0, 720.0);
    for native in [Landscape, Portrait] {
        for current in [Landscape, Portrait, LandscapeFlipped, PortraitFlipped] {
            let geometry = compute(logical, 96.0, native, current);
            let expected = if geometry.rotation.swaps_dimensions() {
                geometry.output_size.transposed()
            } else {
                geometry.output_size
            };
            assert_eq!(
                geometry.render_target_size, expected,
                "native {native:?} / current {current:?}"
            );
        }
    }
}

#[test]
fn viewport_covers_the_render_target() {
    let geometry = compute(LogicalSize::new(800.0, 600.0), 96.0, Landscape, Portrait);
    assert_eq!(
        geometry.viewport,
        Viewport {
            x: 0.0,
            y: 0.0,
            width: 600.0,
            height: 800.0,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    );
}

#[test]
fn downscale_policy_flows_into_the_output_size() {
    let geometry = compute(LogicalSize::new(3840.0, 2160.0), 300.0, Landscape, Landscape);

    assert_eq!(geometry.effective_dpi, 150.0);
    assert_eq!(geometry.output_size, PixelSize::new(6000, 3375));
    assert_eq!(geometry.render_target_size, geometry.output_size);
}

#[test]
fn computation_is_deterministic() {
    let first = compute(LogicalSize::new(1024.0, 768.0), 144.0, Portrait, LandscapeFlipped);
    let second = compute(LogicalSize::new(1024.0, 768.0), 144.0, Portrait, LandscapeFlipped);
    assert_eq!(first, second);
}

#[test]
fn invalid_orientation_pair_is_a_named_error() {
    let err = SurfaceGeometry::compute(
        LogicalSize::new(800.0, 600.0),
        96.0,
        LandscapeFlipped,
        Landscape,
        &ScalingPolicy::default(),
    )
    .unwrap_err();
    assert!(matches!(err, VitrineError::UnsupportedOrientation { .. }));
}

#[test]
fn default_geometry_is_a_unit_identity_surface() {
    let geometry = SurfaceGeometry::default();
    assert_eq!(geometry.output_size, PixelSize::new(1, 1));
    assert_eq!(geometry.render_target_size, PixelSize::new(1, 1));
    assert_eq!(geometry.rotation, DisplayRotation::Identity);
}
