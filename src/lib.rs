//! Vitrine — presentation-surface and GPU device lifetime management for
//! wgpu applications.
//!
//! The centerpiece is [`DeviceResources`]: it owns the device, queue,
//! presentation surface, and every resource whose validity depends on
//! window size, display DPI, display orientation, or device availability,
//! and it recovers transparently from device loss. Around it sit the pure
//! display math ([`display`]), the loss/restore capability
//! ([`DeviceNotify`]), a frame timer ([`FrameTimer`]), the suspend-time
//! trim deferral ([`suspend`]), and an optional winit shell ([`app`]).

pub mod app;
pub mod device;
pub mod display;
pub mod errors;
pub mod frame;
pub mod suspend;

pub use app::SurfaceWindow;
pub use device::{DEPTH_FORMAT, DeviceNotify, DeviceResources, DeviceSettings, DeviceTier};
pub use display::{
    DisplayOrientation, DisplayRotation, LogicalSize, PixelSize, ScalingPolicy, SurfaceGeometry,
    Viewport,
};
pub use errors::{Result, VitrineError};
pub use frame::{FrameState, FrameTimer};

#[cfg(feature = "winit")]
pub use app::winit::{App, AppHandler};
