//! Device Resource Manager
//!
//! [`DeviceResources`] owns the GPU device, queue, presentation surface, and
//! every resource whose validity depends on device and window state: the
//! persistent color render target, the depth-stencil target, and the derived
//! display geometry. It reconciles four independently changing external
//! conditions — window size, display DPI, display orientation, and device
//! availability — into one continuously presentable surface, and recovers
//! from device removal without involving its dependents beyond the
//! [`DeviceNotify`] pair of callbacks.
//!
//! # Lifecycle
//!
//! 1. Create with [`DeviceResources::new`] (or `new_blocking`) — negotiates
//!    an adapter and device, falling back to progressively smaller limit
//!    tiers and finally the software adapter.
//! 2. Bind a window with [`set_window`](DeviceResources::set_window).
//! 3. Feed display changes through `set_logical_size` / `set_dpi` /
//!    `set_current_orientation`; each rebuilds the size-dependent resources
//!    in one synchronous call.
//! 4. Render into [`target_view`](DeviceResources::target_view) /
//!    [`depth_stencil_view`](DeviceResources::depth_stencil_view), then call
//!    [`present`](DeviceResources::present) once per frame.
//!
//! # Threading
//!
//! Single-threaded by design: the manager lives on the thread that owns the
//! window and its event loop, and it is deliberately `!Send` (the
//! notification slot is an `Rc` weak reference). [`present`] blocks until
//! the next vertical sync, which paces the render loop and bounds power
//! draw.
//!
//! [`present`]: DeviceResources::present

use std::cell::RefCell;
use std::rc::Weak;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use glam::{Affine2, Mat4};
use log::{debug, info, warn};

use crate::app::SurfaceWindow;
use crate::display::scaling::DIPS_PER_INCH;
use crate::display::{
    DisplayOrientation, DisplayRotation, LogicalSize, PixelSize, SurfaceGeometry, Viewport,
};
use crate::errors::{Result, VitrineError};
use crate::suspend;

pub mod notify;
pub mod settings;

pub use notify::DeviceNotify;
pub use settings::DeviceSettings;

/// Depth-stencil format used for the manager's depth target.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24PlusStencil8;

// The fixed presentation format is 8-bit non-sRGB; BGRA where the backend
// has it, RGBA otherwise.
const PRESENTATION_FORMATS: [wgpu::TextureFormat; 2] = [
    wgpu::TextureFormat::Bgra8Unorm,
    wgpu::TextureFormat::Rgba8Unorm,
];

/// The limits tier a device was negotiated at.
///
/// Device creation walks [`DeviceTier::PREFERENCE`] from the top and keeps
/// the first tier the adapter accepts. The tier is immutable until the
/// device is recreated after loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceTier {
    /// Full default limits.
    Full,
    /// Downlevel limits (older native hardware, WebGPU on GLES3).
    Downlevel,
    /// WebGL2-compatible limits; the floor of the preference list.
    DownlevelWebgl2,
}

impl DeviceTier {
    /// Ordered preference list for device negotiation, most capable first.
    pub const PREFERENCE: [DeviceTier; 3] =
        [Self::Full, Self::Downlevel, Self::DownlevelWebgl2];

    /// The wgpu limits this tier requests.
    #[must_use]
    pub fn limits(self) -> wgpu::Limits {
        match self {
            Self::Full => wgpu::Limits::default(),
            Self::Downlevel => wgpu::Limits::downlevel_defaults(),
            Self::DownlevelWebgl2 => wgpu::Limits::downlevel_webgl2_defaults(),
        }
    }
}

/// The size-dependent render targets over the current geometry.
struct RenderTargets {
    color: wgpu::Texture,
    color_view: wgpu::TextureView,
    depth_view: wgpu::TextureView,
}

/// Owner of the graphics device, presentation surface, and all size- and
/// device-dependent resources. See the [module documentation](self).
pub struct DeviceResources {
    instance: wgpu::Instance,
    adapter: wgpu::Adapter,
    adapter_info: wgpu::AdapterInfo,
    device: wgpu::Device,
    queue: wgpu::Queue,
    tier: DeviceTier,
    /// Latched by the device-lost callback; checked during reconstruction
    /// and after present.
    removed: Arc<AtomicBool>,

    window: Option<Arc<dyn SurfaceWindow>>,
    surface: Option<wgpu::Surface<'static>>,
    config: Option<wgpu::SurfaceConfiguration>,
    targets: Option<RenderTargets>,

    settings: DeviceSettings,
    logical_size: LogicalSize,
    dpi: f32,
    native_orientation: DisplayOrientation,
    current_orientation: DisplayOrientation,
    geometry: SurfaceGeometry,

    notify: notify::NotifySlot,
}

impl DeviceResources {
    /// Creates the manager and its device; no window is bound yet.
    ///
    /// # Errors
    ///
    /// Fails when no adapter exists or when every tier on both the hardware
    /// and the fallback adapter rejects device creation.
    pub async fn new(settings: DeviceSettings) -> Result<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: settings.backends.unwrap_or_else(wgpu::Backends::all),
            ..wgpu::InstanceDescriptor::new_without_display_handle()
        });

        let (adapter, device, queue, tier) = Self::create_device(&instance, &settings).await?;
        let adapter_info = adapter.get_info();
        info!(
            "created device on {} ({:?}, {:?} tier)",
            adapter_info.name, adapter_info.backend, tier
        );
        let removed = Self::install_lost_callback(&device);

        Ok(Self {
            instance,
            adapter,
            adapter_info,
            device,
            queue,
            tier,
            removed,
            window: None,
            surface: None,
            config: None,
            targets: None,
            settings,
            logical_size: LogicalSize::default(),
            dpi: DIPS_PER_INCH,
            native_orientation: DisplayOrientation::Landscape,
            current_orientation: DisplayOrientation::Landscape,
            geometry: SurfaceGeometry::default(),
            notify: notify::NotifySlot::default(),
        })
    }

    /// Blocking wrapper over [`new`](Self::new) for synchronous callers.
    pub fn new_blocking(settings: DeviceSettings) -> Result<Self> {
        pollster::block_on(Self::new(settings))
    }

    // ========================================================================
    // External change feed
    // ========================================================================

    /// Binds the manager to a presentation window.
    ///
    /// Reads the initial logical size, orientations, and DPI from the window
    /// and performs the full window-size-dependent reconstruction. May be
    /// called again if the window itself is recreated.
    pub fn set_window(&mut self, window: Arc<dyn SurfaceWindow>) -> Result<()> {
        let surface = self.instance.create_surface(window.clone())?;

        self.logical_size = window.logical_size();
        self.native_orientation = window.native_orientation();
        self.current_orientation = window.current_orientation();
        self.dpi = window.scale_factor() as f32 * DIPS_PER_INCH;

        self.window = Some(window);
        self.surface = Some(surface);
        // A fresh surface always gets a fresh configuration.
        self.config = None;

        self.create_window_size_dependent_resources()
    }

    /// Updates the logical window size. No-op when the value is unchanged.
    pub fn set_logical_size(&mut self, logical_size: LogicalSize) -> Result<()> {
        if self.logical_size == logical_size {
            return Ok(());
        }
        self.logical_size = logical_size;
        self.create_window_size_dependent_resources()
    }

    /// Updates the display DPI. No-op when the value is unchanged.
    ///
    /// A DPI change also changes the window's reported logical bounds, so
    /// the logical size is re-read from the window before rebuilding.
    pub fn set_dpi(&mut self, dpi: f32) -> Result<()> {
        if dpi == self.dpi {
            return Ok(());
        }
        self.dpi = dpi;
        if let Some(window) = &self.window {
            self.logical_size = window.logical_size();
        }
        self.create_window_size_dependent_resources()
    }

    /// Updates the current display orientation. No-op when unchanged.
    pub fn set_current_orientation(&mut self, orientation: DisplayOrientation) -> Result<()> {
        if self.current_orientation == orientation {
            return Ok(());
        }
        self.current_orientation = orientation;
        self.create_window_size_dependent_resources()
    }

    /// Checks that the device is still usable, recovering if it is not.
    ///
    /// Call this in response to an external "display contents invalidated"
    /// signal rather than polling it continuously. The device is invalid
    /// when the system's default adapter changed since creation or when the
    /// device itself reported removal.
    pub fn validate_device(&mut self) -> Result<()> {
        if self.removed.load(Ordering::Acquire) {
            return self.handle_device_lost();
        }

        let current = pollster::block_on(self.instance.request_adapter(
            &wgpu::RequestAdapterOptions {
                power_preference: self.settings.power_preference,
                compatible_surface: None,
                force_fallback_adapter: false,
            },
        ));

        match current {
            Ok(adapter) => {
                let current_info = adapter.get_info();
                if current_info.vendor != self.adapter_info.vendor
                    || current_info.device != self.adapter_info.device
                    || current_info.backend != self.adapter_info.backend
                    || current_info.name != self.adapter_info.name
                {
                    info!(
                        "default adapter changed from {} to {}; recreating device",
                        self.adapter_info.name, current_info.name
                    );
                    return self.handle_device_lost();
                }
                Ok(())
            }
            // No adapter at all: whatever we were created on is gone.
            Err(_) => self.handle_device_lost(),
        }
    }

    /// Releases held-but-unused device memory.
    ///
    /// Call when the application is about to be suspended so other
    /// applications can reclaim temporary buffers. Destroys nothing live;
    /// see [`suspend::run_trim`] for the deferred variant.
    pub fn trim(&self) {
        suspend::trim_device(&self.device);
    }

    /// Sets or clears the single loss/restore registrant.
    ///
    /// The registration is non-owning; a dropped registrant is simply
    /// skipped at notification time.
    pub fn register_device_notify(
        &mut self,
        registrant: Option<Weak<RefCell<dyn DeviceNotify>>>,
    ) {
        self.notify.set(registrant);
    }

    // ========================================================================
    // Presentation
    // ========================================================================

    /// Submits the current render-target contents for display.
    ///
    /// Blocks until the next vertical sync (FIFO present with at most one
    /// queued frame). Device loss reported here is recovered in place — the
    /// caller sees a skipped frame, not an error. Target contents are not
    /// preserved across frames; renderers are expected to clear on load.
    ///
    /// # Errors
    ///
    /// [`VitrineError::WindowNotSet`] without a bound window, or
    /// [`VitrineError::Surface`] for non-recoverable presentation failures.
    pub fn present(&mut self) -> Result<()> {
        let acquired = match self.surface.as_ref() {
            Some(surface) => surface.get_current_texture(),
            None => return Err(VitrineError::WindowNotSet),
        };

        let frame = match acquired {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost) => {
                warn!("presentation surface lost; recreating the device");
                return self.handle_device_lost();
            }
            Err(wgpu::SurfaceError::Outdated) => {
                debug!("presentation surface outdated; reconfiguring");
                return self.create_window_size_dependent_resources();
            }
            Err(wgpu::SurfaceError::Timeout) => {
                warn!("back buffer acquisition timed out; skipping frame");
                return Ok(());
            }
            Err(err) => return Err(VitrineError::Surface(err)),
        };

        let targets = self
            .targets
            .as_ref()
            .expect("render targets exist whenever a surface does");
        let size = self.geometry.render_target_size;

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("vitrine present"),
            });
        encoder.copy_texture_to_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &targets.color,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyTextureInfo {
                texture: &frame.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::Extent3d {
                width: size.width,
                height: size.height,
                depth_or_array_layers: 1,
            },
        );
        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();

        // Removal can be reported asynchronously while the frame was in
        // flight; recover now rather than on the next acquire.
        if self.removed.load(Ordering::Acquire) {
            warn!("device removal reported during present; recreating the device");
            return self.handle_device_lost();
        }

        Ok(())
    }

    // ========================================================================
    // Reconstruction & recovery
    // ========================================================================

    /// Rebuilds everything that depends on the window size.
    ///
    /// Runs on `set_window` and whenever logical size, DPI, or orientation
    /// change. Either completes fully or diverts into
    /// [`handle_device_lost`](Self::handle_device_lost), which re-enters this
    /// method on a clean device — no torn-down intermediate state is ever
    /// observable from outside the call.
    fn create_window_size_dependent_resources(&mut self) -> Result<()> {
        // Drop the old views and drain the queue so nothing in flight still
        // references resources that are about to be destroyed.
        self.targets = None;
        let _ = self.device.poll(wgpu::PollType::wait_indefinitely());

        self.geometry = SurfaceGeometry::compute(
            self.logical_size,
            self.dpi,
            self.native_orientation,
            self.current_orientation,
            &self.settings.scaling,
        )?;

        // Removal latched while we were tearing down: abort the remainder;
        // recovery re-enters this method with a fresh device.
        if self.removed.load(Ordering::Acquire) {
            warn!("device removal detected during reconstruction; recreating the device");
            return self.handle_device_lost();
        }

        let Some(surface) = self.surface.as_ref() else {
            // Headless: geometry is maintained, the presentation chain waits
            // for set_window.
            return Ok(());
        };

        // Resize the existing configuration in place, or build a fresh one
        // for a newly bound surface.
        let size = self.geometry.render_target_size;
        let mut config = match self.config.take() {
            Some(config) => config,
            None => Self::surface_configuration(surface, &self.adapter, size)?,
        };
        config.width = size.width;
        config.height = size.height;
        surface.configure(&self.device, &config);

        let format = config.format;
        self.config = Some(config);
        self.targets = Some(Self::create_render_targets(&self.device, size, format));

        debug!(
            "window-size resources rebuilt: output {}x{}, target {}x{}, rotation {:?}, {} dpi",
            self.geometry.output_size.width,
            self.geometry.output_size.height,
            size.width,
            size.height,
            self.geometry.rotation,
            self.geometry.effective_dpi,
        );
        Ok(())
    }

    /// Recreates the device and everything bound to it.
    ///
    /// Public so embedders can force recovery from their own loss signals.
    /// Safe to re-enter from [`validate_device`](Self::validate_device),
    /// [`present`](Self::present), or reconstruction; every path converges
    /// on the same valid end state. The registrant sees exactly one
    /// `on_device_lost` before the device is touched and exactly one
    /// `on_device_restored` once the new device is fully presentable.
    pub fn handle_device_lost(&mut self) -> Result<()> {
        warn!("rebuilding all device resources after device loss");

        // The chain goes first, unconditionally.
        self.targets = None;
        self.config = None;
        self.surface = None;

        // Dependents must drop their device-bound handles before the old
        // device is replaced underneath them.
        self.notify.lost();

        let (adapter, device, queue, tier) =
            pollster::block_on(Self::create_device(&self.instance, &self.settings))?;
        self.adapter_info = adapter.get_info();
        self.removed = Self::install_lost_callback(&device);
        self.adapter = adapter;
        self.device = device;
        self.queue = queue;
        self.tier = tier;
        info!(
            "device recreated on {} ({:?} tier)",
            self.adapter_info.name, self.tier
        );

        if let Some(window) = self.window.clone() {
            self.surface = Some(self.instance.create_surface(window)?);
        }
        self.create_window_size_dependent_resources()?;

        self.notify.restored(self);
        Ok(())
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// The graphics device.
    #[inline]
    #[must_use]
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// The command submission queue.
    #[inline]
    #[must_use]
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Information about the adapter the device was created on.
    #[inline]
    #[must_use]
    pub fn adapter_info(&self) -> &wgpu::AdapterInfo {
        &self.adapter_info
    }

    /// The limits tier the device was negotiated at.
    #[inline]
    #[must_use]
    pub fn device_tier(&self) -> DeviceTier {
        self.tier
    }

    /// View over the persistent color render target.
    ///
    /// # Panics
    ///
    /// Panics if no window has been bound yet.
    #[inline]
    #[must_use]
    pub fn target_view(&self) -> &wgpu::TextureView {
        &self
            .targets
            .as_ref()
            .expect("no render targets; call set_window first")
            .color_view
    }

    /// View over the depth-stencil target.
    ///
    /// # Panics
    ///
    /// Panics if no window has been bound yet.
    #[inline]
    #[must_use]
    pub fn depth_stencil_view(&self) -> &wgpu::TextureView {
        &self
            .targets
            .as_ref()
            .expect("no render targets; call set_window first")
            .depth_view
    }

    /// The color format of the render target and presentation surface.
    #[inline]
    #[must_use]
    pub fn color_format(&self) -> wgpu::TextureFormat {
        self.config
            .as_ref()
            .map_or(PRESENTATION_FORMATS[0], |config| config.format)
    }

    /// Full-surface viewport over the current render target.
    #[inline]
    #[must_use]
    pub fn screen_viewport(&self) -> Viewport {
        self.geometry.viewport
    }

    /// Window size in device-independent units.
    #[inline]
    #[must_use]
    pub fn logical_size(&self) -> LogicalSize {
        self.logical_size
    }

    /// Physical pixel dimensions of the window contents.
    #[inline]
    #[must_use]
    pub fn output_size(&self) -> PixelSize {
        self.geometry.output_size
    }

    /// Output size with axes swapped for quarter-turn rotations; the size
    /// all size-dependent resources are allocated at.
    #[inline]
    #[must_use]
    pub fn render_target_size(&self) -> PixelSize {
        self.geometry.render_target_size
    }

    /// Rotation between the native and current orientation.
    #[inline]
    #[must_use]
    pub fn display_rotation(&self) -> DisplayRotation {
        self.geometry.rotation
    }

    /// The display's fixed native orientation.
    #[inline]
    #[must_use]
    pub fn native_orientation(&self) -> DisplayOrientation {
        self.native_orientation
    }

    /// The current display orientation.
    #[inline]
    #[must_use]
    pub fn current_orientation(&self) -> DisplayOrientation {
        self.current_orientation
    }

    /// 2D overlay transform for the current rotation and logical size.
    #[inline]
    #[must_use]
    pub fn orientation_transform_2d(&self) -> Affine2 {
        self.geometry.transform_2d
    }

    /// 3D pre-rotation matrix for the current rotation.
    #[inline]
    #[must_use]
    pub fn orientation_transform_3d(&self) -> Mat4 {
        self.geometry.transform_3d
    }

    /// The raw display DPI.
    #[inline]
    #[must_use]
    pub fn dpi(&self) -> f32 {
        self.dpi
    }

    /// The DPI actually used for pixel conversion (possibly downscaled).
    #[inline]
    #[must_use]
    pub fn effective_dpi(&self) -> f32 {
        self.geometry.effective_dpi
    }

    // ========================================================================
    // Device & target construction
    // ========================================================================

    /// Requests an adapter and negotiates a device down the tier list,
    /// retrying the whole list on the fallback (software) adapter when the
    /// hardware adapter refuses every tier.
    async fn create_device(
        instance: &wgpu::Instance,
        settings: &DeviceSettings,
    ) -> Result<(wgpu::Adapter, wgpu::Device, wgpu::Queue, DeviceTier)> {
        let adapter = Self::request_adapter(instance, settings, false).await?;

        match Self::negotiate_device(&adapter, settings).await {
            Ok((device, queue, tier)) => Ok((adapter, device, queue, tier)),
            Err(err) => {
                warn!("hardware device creation failed ({err}); trying the fallback adapter");
                let fallback = Self::request_adapter(instance, settings, true).await?;
                let (device, queue, tier) = Self::negotiate_device(&fallback, settings).await?;
                Ok((fallback, device, queue, tier))
            }
        }
    }

    async fn request_adapter(
        instance: &wgpu::Instance,
        settings: &DeviceSettings,
        force_fallback_adapter: bool,
    ) -> Result<wgpu::Adapter> {
        instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: settings.power_preference,
                compatible_surface: None,
                force_fallback_adapter,
            })
            .await
            .map_err(|err| VitrineError::AdapterRequest(err.to_string()))
    }

    async fn negotiate_device(
        adapter: &wgpu::Adapter,
        settings: &DeviceSettings,
    ) -> Result<(wgpu::Device, wgpu::Queue, DeviceTier)> {
        let mut last_err = None;
        for tier in DeviceTier::PREFERENCE {
            match adapter
                .request_device(&wgpu::DeviceDescriptor {
                    label: Some("vitrine device"),
                    required_features: settings.required_features,
                    required_limits: tier.limits(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    ..Default::default()
                })
                .await
            {
                Ok((device, queue)) => return Ok((device, queue, tier)),
                Err(err) => {
                    debug!("device tier {tier:?} rejected: {err}");
                    last_err = Some(err);
                }
            }
        }
        Err(match last_err {
            Some(err) => err.into(),
            None => VitrineError::AdapterRequest("device tier preference list is empty".into()),
        })
    }

    /// Latches device removal into a flag the synchronous paths can check.
    fn install_lost_callback(device: &wgpu::Device) -> Arc<AtomicBool> {
        let removed = Arc::new(AtomicBool::new(false));
        let latched = removed.clone();
        device.set_device_lost_callback(move |reason, message| {
            warn!("graphics device lost ({reason:?}): {message}");
            latched.store(true, Ordering::Release);
        });
        removed
    }

    fn surface_configuration(
        surface: &wgpu::Surface<'_>,
        adapter: &wgpu::Adapter,
        size: PixelSize,
    ) -> Result<wgpu::SurfaceConfiguration> {
        let caps = surface.get_capabilities(adapter);
        let format = PRESENTATION_FORMATS
            .into_iter()
            .find(|format| caps.formats.contains(format))
            .ok_or_else(|| {
                VitrineError::SurfaceConfig(
                    "surface supports no 8-bit non-sRGB presentation format".into(),
                )
            })?;

        Ok(wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_DST,
            format,
            width: size.width,
            height: size.height,
            // FIFO plus a single queued frame: presentation only proceeds
            // after each vertical sync, which minimizes latency and power.
            present_mode: wgpu::PresentMode::Fifo,
            desired_maximum_frame_latency: 1,
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
            view_formats: vec![],
        })
    }

    fn create_render_targets(
        device: &wgpu::Device,
        size: PixelSize,
        format: wgpu::TextureFormat,
    ) -> RenderTargets {
        let extent = wgpu::Extent3d {
            width: size.width,
            height: size.height,
            depth_or_array_layers: 1,
        };

        let color = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("vitrine color target"),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::COPY_SRC
                | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let color_view = color.create_view(&wgpu::TextureViewDescriptor::default());

        let depth = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("vitrine depth target"),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let depth_view = depth.create_view(&wgpu::TextureViewDescriptor::default());

        RenderTargets {
            color,
            color_view,
            depth_view,
        }
    }
}
