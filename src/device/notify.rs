//! Device Loss Notification
//!
//! Dependent renderers hold GPU objects whose validity is tied to a specific
//! device instance. [`DeviceNotify`] is the capability they implement to be
//! told "release your device-bound resources now" / "recreate them now".
//!
//! The manager keeps a single non-owning registration slot. The intended
//! shape is one coordinator object (typically the application's frame
//! driver) registered here, fanning out to its individual renderers — not a
//! broadcast list on the manager itself.

use std::cell::RefCell;
use std::rc::Weak;

use super::DeviceResources;

/// Capability implemented by dependents of [`DeviceResources`].
///
/// References obtained from the manager (device, queue, views) are valid
/// only between an `on_device_restored` call and the next `on_device_lost`
/// call; holding them across a loss notification is a use-after-release bug
/// on the dependent's side.
pub trait DeviceNotify {
    /// The device is gone. Drop every device-bound handle immediately.
    ///
    /// Must not fail; there is no device left to report errors against.
    fn on_device_lost(&mut self);

    /// A fresh device is live. Recreate device-bound handles from the
    /// manager's accessors.
    ///
    /// Must not fail; a dependent that cannot rebuild should defer its work
    /// to the next frame rather than escape through this callback.
    fn on_device_restored(&mut self, resources: &DeviceResources);
}

/// The manager's single, optional, non-owning registration.
#[derive(Default)]
pub(crate) struct NotifySlot {
    registrant: Option<Weak<RefCell<dyn DeviceNotify>>>,
}

impl NotifySlot {
    pub(crate) fn set(&mut self, registrant: Option<Weak<RefCell<dyn DeviceNotify>>>) {
        self.registrant = registrant;
    }

    pub(crate) fn lost(&self) {
        if let Some(registrant) = self.registrant.as_ref().and_then(Weak::upgrade) {
            registrant.borrow_mut().on_device_lost();
        }
    }

    pub(crate) fn restored(&self, resources: &DeviceResources) {
        if let Some(registrant) = self.registrant.as_ref().and_then(Weak::upgrade) {
            registrant.borrow_mut().on_device_restored(resources);
        }
    }
}
