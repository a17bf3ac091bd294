//! Manager lifecycle tests
//!
//! These tests drive a real (windowless) `DeviceResources` instance, so
//! they need a GPU adapter — any backend, including a software fallback.
//! When no adapter exists at all the tests skip themselves rather than
//! fail, the same way headless CI environments are usually handled for
//! wgpu crates.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use vitrine::display::{DisplayOrientation, DisplayRotation, LogicalSize, PixelSize};
use vitrine::errors::VitrineError;
use vitrine::{DeviceNotify, DeviceResources, DeviceSettings};

fn create_resources() -> Option<DeviceResources> {
    let _ = env_logger::builder().is_test(true).try_init();
    match DeviceResources::new_blocking(DeviceSettings::default()) {
        Ok(resources) => Some(resources),
        Err(err) => {
            eprintln!("skipping: no GPU adapter available ({err})");
            None
        }
    }
}

// ============================================================================
// Recording coordinator
// ============================================================================

/// A coordinator owning two "renderers", fanning the device notifications
/// out to both — the intended one-level indirection.
struct RecordingCoordinator {
    renderers: [&'static str; 2],
    events: Vec<String>,
}

impl RecordingCoordinator {
    fn new() -> Self {
        Self {
            renderers: ["scene", "overlay"],
            events: Vec::new(),
        }
    }
}

impl DeviceNotify for RecordingCoordinator {
    fn on_device_lost(&mut self) {
        for renderer in self.renderers {
            self.events.push(format!("{renderer}:lost"));
        }
    }

    fn on_device_restored(&mut self, resources: &DeviceResources) {
        // The manager must already be fully valid here.
        assert!(resources.output_size().width >= 1);
        for renderer in self.renderers {
            self.events.push(format!("{renderer}:restored"));
        }
    }
}

// ============================================================================
// Headless display state
// ============================================================================

#[test]
fn display_setters_maintain_derived_state() {
    let Some(mut resources) = create_resources() else {
        return;
    };

    resources
        .set_logical_size(LogicalSize::new(800.0, 600.0))
        .unwrap();
    assert_eq!(resources.logical_size(), LogicalSize::new(800.0, 600.0));
    assert_eq!(resources.output_size(), PixelSize::new(800, 600));
    assert_eq!(resources.render_target_size(), PixelSize::new(800, 600));
    assert_eq!(resources.display_rotation(), DisplayRotation::Identity);

    resources
        .set_current_orientation(DisplayOrientation::Portrait)
        .unwrap();
    assert_eq!(resources.display_rotation(), DisplayRotation::Rotate270);
    assert_eq!(resources.render_target_size(), PixelSize::new(600, 800));

    resources.set_dpi(192.0).unwrap();
    assert_eq!(resources.effective_dpi(), 192.0);
    assert_eq!(resources.output_size(), PixelSize::new(1600, 1200));
    assert_eq!(resources.render_target_size(), PixelSize::new(1200, 1600));
}

#[test]
fn unchanged_values_short_circuit() {
    let Some(mut resources) = create_resources() else {
        return;
    };

    resources
        .set_logical_size(LogicalSize::new(640.0, 480.0))
        .unwrap();
    let before = (
        resources.output_size(),
        resources.render_target_size(),
        resources.display_rotation(),
    );

    resources
        .set_logical_size(LogicalSize::new(640.0, 480.0))
        .unwrap();
    resources.set_dpi(resources.dpi()).unwrap();
    resources
        .set_current_orientation(resources.current_orientation())
        .unwrap();

    let after = (
        resources.output_size(),
        resources.render_target_size(),
        resources.display_rotation(),
    );
    assert_eq!(before, after);
}

#[test]
fn present_without_a_window_is_an_error() {
    let Some(mut resources) = create_resources() else {
        return;
    };
    assert!(matches!(
        resources.present(),
        Err(VitrineError::WindowNotSet)
    ));
}

#[test]
fn trim_is_safe_at_any_time() {
    let Some(resources) = create_resources() else {
        return;
    };
    resources.trim();
    resources.trim();
}

// ============================================================================
// Device-loss recovery
// ============================================================================

#[test]
fn recovery_notifies_lost_then_restored_exactly_once() {
    let Some(mut resources) = create_resources() else {
        return;
    };

    let coordinator = Rc::new(RefCell::new(RecordingCoordinator::new()));
    let registrant: Weak<RefCell<dyn DeviceNotify>> = Rc::downgrade(&coordinator);
    resources.register_device_notify(Some(registrant));

    resources.handle_device_lost().unwrap();
    assert_eq!(
        coordinator.borrow().events,
        [
            "scene:lost",
            "overlay:lost",
            "scene:restored",
            "overlay:restored"
        ]
    );

    // Invariants hold on the recovered manager.
    assert!(resources.output_size().width >= 1);
    assert!(resources.output_size().height >= 1);

    // A second recovery issues exactly one more pair.
    resources.handle_device_lost().unwrap();
    assert_eq!(coordinator.borrow().events.len(), 8);
}

#[test]
fn recovery_preserves_display_state() {
    let Some(mut resources) = create_resources() else {
        return;
    };

    resources
        .set_logical_size(LogicalSize::new(800.0, 600.0))
        .unwrap();
    resources
        .set_current_orientation(DisplayOrientation::Portrait)
        .unwrap();

    resources.handle_device_lost().unwrap();

    assert_eq!(resources.display_rotation(), DisplayRotation::Rotate270);
    assert_eq!(resources.render_target_size(), PixelSize::new(600, 800));
}

#[test]
fn cleared_registration_is_not_notified() {
    let Some(mut resources) = create_resources() else {
        return;
    };

    let coordinator = Rc::new(RefCell::new(RecordingCoordinator::new()));
    let registrant: Weak<RefCell<dyn DeviceNotify>> = Rc::downgrade(&coordinator);
    resources.register_device_notify(Some(registrant));
    resources.register_device_notify(None);

    resources.handle_device_lost().unwrap();
    assert!(coordinator.borrow().events.is_empty());
}

#[test]
fn dropped_registrant_is_skipped() {
    let Some(mut resources) = create_resources() else {
        return;
    };

    let coordinator = Rc::new(RefCell::new(RecordingCoordinator::new()));
    let registrant: Weak<RefCell<dyn DeviceNotify>> = Rc::downgrade(&coordinator);
    resources.register_device_notify(Some(registrant));
    drop(coordinator);

    // The weak registration upgrades to nothing; recovery proceeds quietly.
    resources.handle_device_lost().unwrap();
}
