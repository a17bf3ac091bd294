//! Winit-based Application Shell
//!
//! A complete event-loop shell built on the
//! [winit](https://crates.io/crates/winit) cross-platform windowing library,
//! wiring window and lifecycle events into a [`DeviceResources`] manager.
//!
//! # Overview
//!
//! - [`App`]: builder for configuring and launching the shell
//! - [`AppHandler`]: trait applications implement to drive their renderers
//! - `AppRunner`: internal event-loop handler (not exposed)
//!
//! The handler is also the crate's device-loss coordinator: [`AppHandler`]
//! requires [`DeviceNotify`], and the shell registers the handler as the
//! manager's single registrant. A handler that owns several renderers fans
//! the two callbacks out to each of them.
//!
//! # Event wiring
//!
//! | Event                | Manager operation                          |
//! |----------------------|--------------------------------------------|
//! | `Resized`            | `set_logical_size`                         |
//! | `ScaleFactorChanged` | `set_dpi`                                  |
//! | `Occluded`           | switch between continuous and event-wait   |
//! | `RedrawRequested`    | tick, render, `present`                    |
//! | suspend              | deferred `trim` within a time budget       |
//! | resume               | `validate_device`                          |
//!
//! # Example
//!
//! ```rust,ignore
//! use vitrine::{App, AppHandler, DeviceNotify, DeviceResources, FrameState};
//!
//! struct Demo { /* pipelines, buffers, ... */ }
//!
//! impl DeviceNotify for Demo {
//!     fn on_device_lost(&mut self) { /* drop GPU handles */ }
//!     fn on_device_restored(&mut self, resources: &DeviceResources) {
//!         /* rebuild GPU handles from resources.device() */
//!     }
//! }
//!
//! impl AppHandler for Demo {
//!     fn init(resources: &DeviceResources, _window: &std::sync::Arc<winit::window::Window>) -> Self {
//!         Demo { /* ... */ }
//!     }
//!
//!     fn render(&mut self, resources: &DeviceResources) -> bool {
//!         // encode passes against resources.target_view(), submit, report a frame
//!         true
//!     }
//! }
//!
//! fn main() -> vitrine::Result<()> {
//!     App::new().with_title("Demo").run::<Demo>()
//! }
//! ```

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, warn};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
pub use winit::window::{Window, WindowId};

use crate::device::notify::DeviceNotify;
use crate::device::{DeviceResources, DeviceSettings};
use crate::display::LogicalSize;
use crate::errors::Result;
use crate::frame::{FrameState, FrameTimer};
use crate::suspend;

/// Trait applications implement to be driven by the shell.
///
/// The loss/restore callbacks come from the [`DeviceNotify`] supertrait:
/// the handler is the owning coordinator for every renderer it contains.
pub trait AppHandler: DeviceNotify + Sized + 'static {
    /// Initializes the application.
    ///
    /// Called once after the window is created and the device resources are
    /// bound to it. Build renderers and device-dependent state here.
    fn init(resources: &DeviceResources, window: &Arc<Window>) -> Self;

    /// Updates application state. Called once per timer update, before
    /// rendering.
    #[allow(unused_variables)]
    fn update(&mut self, resources: &DeviceResources, frame: &FrameState) {}

    /// Renders a frame into the manager's render targets.
    ///
    /// Encode passes against
    /// [`target_view`](DeviceResources::target_view) /
    /// [`depth_stencil_view`](DeviceResources::depth_stencil_view) and
    /// submit them on [`queue`](DeviceResources::queue). Return `true` when
    /// a frame was produced; the shell only presents in that case (e.g.
    /// return `false` before the first update).
    fn render(&mut self, resources: &DeviceResources) -> bool;
}

/// Application builder for configuring and launching the shell.
///
/// # Example
///
/// ```rust,ignore
/// App::new()
///     .with_title("My Application")
///     .with_settings(DeviceSettings::default())
///     .run::<MyHandler>()?;
/// ```
pub struct App {
    title: String,
    settings: DeviceSettings,
    suspend_budget: Duration,
}

impl App {
    /// Creates a new application builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            title: "Vitrine".into(),
            settings: DeviceSettings::default(),
            suspend_budget: suspend::DEFAULT_SUSPEND_BUDGET,
        }
    }

    /// Sets the window title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the device settings.
    #[must_use]
    pub fn with_settings(mut self, settings: DeviceSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Sets the completion budget for the suspend-time trim deferral.
    #[must_use]
    pub fn with_suspend_budget(mut self, budget: Duration) -> Self {
        self.suspend_budget = budget;
        self
    }

    /// Runs the application with the specified handler.
    ///
    /// Blocks until the application exits; the event loop takes ownership
    /// of the current thread.
    ///
    /// # Errors
    ///
    /// Returns an error if event loop creation or execution fails.
    pub fn run<H: AppHandler>(self) -> Result<()> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut runner = AppRunner::<H>::new(self.title, self.settings, self.suspend_budget);
        event_loop.run_app(&mut runner)?;
        Ok(())
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

/// Internal event-loop handler driving the manager and the user handler.
struct AppRunner<H: AppHandler> {
    title: String,
    settings: DeviceSettings,
    suspend_budget: Duration,

    window: Option<Arc<Window>>,
    resources: Option<DeviceResources>,
    handler: Option<Rc<RefCell<H>>>,

    timer: FrameTimer,
    visible: bool,
}

impl<H: AppHandler> AppRunner<H> {
    fn new(title: String, settings: DeviceSettings, suspend_budget: Duration) -> Self {
        Self {
            title,
            settings,
            suspend_budget,
            window: None,
            resources: None,
            handler: None,
            timer: FrameTimer::new(),
            visible: true,
        }
    }

    fn initialize(&mut self, event_loop: &ActiveEventLoop) {
        let window_attributes = Window::default_attributes()
            .with_title(self.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(1280.0, 720.0));
        let window = Arc::new(
            event_loop
                .create_window(window_attributes)
                .expect("Failed to create window"),
        );

        let mut resources = match DeviceResources::new_blocking(self.settings.clone()) {
            Ok(resources) => resources,
            Err(err) => {
                error!("fatal device initialization error: {err}");
                event_loop.exit();
                return;
            }
        };
        if let Err(err) = resources.set_window(window.clone()) {
            error!("fatal surface initialization error: {err}");
            event_loop.exit();
            return;
        }

        let handler = Rc::new(RefCell::new(H::init(&resources, &window)));
        let handler_dyn: Rc<RefCell<dyn DeviceNotify>> = handler.clone();
        let registrant: Weak<RefCell<dyn DeviceNotify>> = Rc::downgrade(&handler_dyn);
        resources.register_device_notify(Some(registrant));

        self.window = Some(window);
        self.resources = Some(resources);
        self.handler = Some(handler);
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(resources) = self.resources.as_mut() else {
            return;
        };
        let Some(handler) = self.handler.clone() else {
            return;
        };

        let produced;
        {
            let mut handler = handler.borrow_mut();
            self.timer
                .tick(|frame| handler.update(resources, &frame));
            produced = handler.render(resources);
        }
        // The handler borrow is released before presenting: recovery inside
        // present() re-enters the handler through its notify callbacks.
        if produced {
            if let Err(err) = resources.present() {
                error!("fatal presentation failure: {err}");
                event_loop.exit();
            }
        }
    }
}

impl<H: AppHandler> ApplicationHandler for AppRunner<H> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            self.initialize(event_loop);
            return;
        }

        // Returning from suspension: the display contents may have been
        // invalidated while the process was frozen.
        self.timer.reset_elapsed_time();
        if let Some(resources) = self.resources.as_mut() {
            if let Err(err) = resources.validate_device() {
                error!("fatal device validation error: {err}");
                event_loop.exit();
            }
        }
    }

    fn suspended(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(resources) = &self.resources {
            match suspend::run_trim(resources, self.suspend_budget) {
                Ok(()) => debug!("trimmed device memory for suspension"),
                Err(err) => warn!("suspend trim did not finish in time: {err}"),
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                let (Some(window), Some(resources)) = (&self.window, self.resources.as_mut())
                else {
                    return;
                };
                let logical = physical_size.to_logical::<f64>(window.scale_factor());
                let logical = LogicalSize::new(logical.width as f32, logical.height as f32);
                if let Err(err) = resources.set_logical_size(logical) {
                    error!("fatal resize error: {err}");
                    event_loop.exit();
                }
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                if let Some(resources) = self.resources.as_mut() {
                    let dpi = scale_factor as f32 * crate::display::scaling::DIPS_PER_INCH;
                    if let Err(err) = resources.set_dpi(dpi) {
                        error!("fatal DPI change error: {err}");
                        event_loop.exit();
                    }
                }
            }
            WindowEvent::Occluded(occluded) => {
                // An occluded window drops to a low-activity event-wait mode
                // instead of rendering continuously.
                self.visible = !occluded;
                event_loop.set_control_flow(if self.visible {
                    ControlFlow::Poll
                } else {
                    ControlFlow::Wait
                });
                if self.visible {
                    if let Some(window) = &self.window {
                        window.request_redraw();
                    }
                }
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if self.visible {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        }
    }
}
