//! Error Types
//!
//! This module defines the error types used throughout the crate.
//!
//! # Overview
//!
//! The main error type [`VitrineError`] covers all failure modes including:
//! - GPU adapter and device initialization failures
//! - Surface creation and configuration errors
//! - Presentation failures that are not recoverable device loss
//! - Display configuration errors (invalid orientation pairs)
//!
//! Device loss is deliberately absent from this taxonomy: it is detected and
//! recovered internally by [`DeviceResources`](crate::DeviceResources) and is
//! never surfaced to callers. Everything that *does* appear here terminates
//! the affected operation; no partially-mutated manager state is left behind.
//!
//! # Usage
//!
//! All public APIs return [`Result<T>`] which is an alias for
//! `std::result::Result<T, VitrineError>`.

use std::time::Duration;

use thiserror::Error;

use crate::display::DisplayOrientation;

/// The main error type for the crate.
///
/// Each variant provides specific context about what went wrong. Variants
/// are fatal from the manager's point of view: transient device loss never
/// reaches this enum.
#[derive(Error, Debug)]
pub enum VitrineError {
    // ========================================================================
    // GPU & Device Errors
    // ========================================================================
    /// Failed to request a compatible GPU adapter.
    #[error("Failed to request WGPU adapter: {0}")]
    AdapterRequest(String),

    /// Failed to create the GPU device after tier negotiation and the
    /// fallback-adapter retry were both exhausted.
    #[error("Failed to create WGPU device: {0}")]
    DeviceCreate(#[from] wgpu::RequestDeviceError),

    // ========================================================================
    // Surface & Presentation Errors
    // ========================================================================
    /// Failed to create the presentation surface from the window handle.
    #[error("Failed to create presentation surface: {0}")]
    SurfaceCreate(#[from] wgpu::CreateSurfaceError),

    /// The surface and adapter cannot agree on a usable configuration.
    #[error("Surface configuration error: {0}")]
    SurfaceConfig(String),

    /// A presentation failure that is not device loss (e.g. out of memory).
    ///
    /// `Lost` and `Outdated` statuses never appear here; those are recovered
    /// in place by the resource manager.
    #[error("Presentation failed: {0}")]
    Surface(wgpu::SurfaceError),

    /// A surface-dependent operation was invoked before
    /// [`set_window`](crate::DeviceResources::set_window).
    #[error("No presentation window bound; call set_window first")]
    WindowNotSet,

    // ========================================================================
    // Display Configuration Errors
    // ========================================================================
    /// The (native, current) orientation pair is outside the rotation table.
    ///
    /// Native orientation may only be landscape or portrait; a flipped native
    /// value indicates a broken display configuration, not a rotation.
    #[error("Unsupported orientation pair: native {native:?}, current {current:?}")]
    UnsupportedOrientation {
        /// The display's fixed native orientation.
        native: DisplayOrientation,
        /// The reported current orientation.
        current: DisplayOrientation,
    },

    // ========================================================================
    // Lifecycle Errors
    // ========================================================================
    /// The suspend-time trim deferral missed its completion budget.
    #[error("Suspend deferral missed its {budget:?} completion budget")]
    SuspendDeadline {
        /// The time budget the deferral had to complete within.
        budget: Duration,
    },

    /// Event loop error (winit).
    #[cfg(feature = "winit")]
    #[error("Event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
}

/// Alias for `Result<T, VitrineError>`.
pub type Result<T> = std::result::Result<T, VitrineError>;
