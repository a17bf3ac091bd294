//! Platform-independent window abstraction.
//!
//! Defines a [`SurfaceWindow`] trait that decouples the device resource
//! manager from specific windowing backends (e.g., winit). The manager
//! retains the window so it can recreate the presentation surface after
//! device loss and re-read logical bounds after a DPI change.
//!
//! When using the `winit` backend, the concrete implementation is
//! `winit::window::Window`.

use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

use crate::display::{DisplayOrientation, LogicalSize};

/// Platform-independent presentation window interface.
///
/// The raw-window-handle supertraits let the manager create a wgpu surface
/// from any implementor; the remaining methods cover the display state the
/// manager reads back at bind time and after DPI changes.
pub trait SurfaceWindow: HasWindowHandle + HasDisplayHandle + Send + Sync {
    /// The window's client-area size in device-independent units.
    fn logical_size(&self) -> LogicalSize;

    /// The display scale factor (1.0 = 96 DPI).
    fn scale_factor(&self) -> f64;

    /// The display's fixed native orientation.
    ///
    /// Only landscape and portrait are valid here. Desktop windowing
    /// systems rarely report this; the default is landscape.
    fn native_orientation(&self) -> DisplayOrientation {
        DisplayOrientation::Landscape
    }

    /// The display's current orientation.
    ///
    /// Defaults to the native orientation on platforms without rotation
    /// reporting.
    fn current_orientation(&self) -> DisplayOrientation {
        self.native_orientation()
    }

    /// Requests the window to redraw.
    fn request_redraw(&self) {}
}

#[cfg(feature = "winit")]
impl SurfaceWindow for winit::window::Window {
    fn logical_size(&self) -> LogicalSize {
        let size = self
            .inner_size()
            .to_logical::<f64>(winit::window::Window::scale_factor(self));
        LogicalSize::new(size.width as f32, size.height as f32)
    }

    fn scale_factor(&self) -> f64 {
        winit::window::Window::scale_factor(self)
    }

    fn request_redraw(&self) {
        winit::window::Window::request_redraw(self);
    }
}
