//! Device Settings
//!
//! Configuration consumed once when [`DeviceResources`](super::DeviceResources)
//! is created. Runtime display state (size, DPI, orientation) is fed through
//! the manager's setters instead.

use crate::display::ScalingPolicy;

/// Global configuration for device resource initialization.
///
/// | Field               | Description                         | Default           |
/// |---------------------|-------------------------------------|-------------------|
/// | `power_preference`  | GPU adapter selection strategy      | `HighPerformance` |
/// | `backends`          | Forced wgpu backend (or auto)       | `None`            |
/// | `required_features` | Required wgpu features              | Empty             |
/// | `scaling`           | High-DPI downscale policy           | Downscale on      |
#[derive(Debug, Clone)]
pub struct DeviceSettings {
    /// GPU adapter selection preference.
    ///
    /// - `HighPerformance`: prefer discrete / dedicated GPU
    /// - `LowPower`: prefer integrated GPU (better battery life)
    pub power_preference: wgpu::PowerPreference,

    /// Force a specific wgpu backend (Vulkan, Metal, DX12, …).
    ///
    /// `None` lets wgpu choose the best available backend for the platform.
    /// Override this only when debugging backend-specific issues.
    pub backends: Option<wgpu::Backends>,

    /// Required wgpu features that must be supported by the adapter.
    ///
    /// Device creation fails outright if these are unavailable; the tier
    /// negotiation only relaxes limits, never features.
    pub required_features: wgpu::Features,

    /// High-DPI downscale policy (see [`ScalingPolicy`]).
    pub scaling: ScalingPolicy,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            power_preference: wgpu::PowerPreference::HighPerformance,
            backends: None,
            required_features: wgpu::Features::empty(),
            scaling: ScalingPolicy::default(),
        }
    }
}
