//! Application Integration
//!
//! The windowing-facing side of the crate: the platform-independent
//! [`SurfaceWindow`] trait the manager binds to, and (behind the `winit`
//! feature) a complete event-loop shell that wires window and lifecycle
//! events into the device resource manager.

pub mod window;

#[cfg(feature = "winit")]
pub mod winit;

pub use window::SurfaceWindow;
