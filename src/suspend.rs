//! Suspend-Time Trim
//!
//! When the application is about to be suspended, the platform grants a
//! bounded deferral: the process may finish a small amount of work before
//! it is frozen, and is forcibly terminated if the deferral overruns. The
//! only obligation of this crate is that the device trim finishes before
//! the completion signal fires — nothing here performs unbounded work.
//!
//! [`run_trim`] clones the device handle (wgpu handles are reference
//! counted), performs the trim off the dispatch thread, and completes the
//! deferral. The watcher side converts an overrun into
//! [`VitrineError::SuspendDeadline`].

use std::thread;
use std::time::Duration;

use log::debug;

use crate::device::DeviceResources;
use crate::errors::{Result, VitrineError};

/// Default completion budget for the suspend deferral.
///
/// Matches the order of magnitude platforms grant suspending applications.
pub const DEFAULT_SUSPEND_BUDGET: Duration = Duration::from_secs(5);

/// Completion signal held by the deferred work.
pub struct Deferral {
    complete_tx: flume::Sender<()>,
}

impl Deferral {
    /// Signals that the deferred work has finished.
    pub fn complete(self) {
        let _ = self.complete_tx.send(());
    }
}

/// The waiting side of a deferral.
pub struct DeferralWatcher {
    complete_rx: flume::Receiver<()>,
    budget: Duration,
}

impl DeferralWatcher {
    /// Blocks until the deferral completes or the budget elapses.
    ///
    /// # Errors
    ///
    /// [`VitrineError::SuspendDeadline`] when the budget is exceeded.
    pub fn wait(self) -> Result<()> {
        self.complete_rx
            .recv_timeout(self.budget)
            .map_err(|_| VitrineError::SuspendDeadline {
                budget: self.budget,
            })
    }
}

/// Creates a deferral pair with the given completion budget.
#[must_use]
pub fn deferral(budget: Duration) -> (Deferral, DeferralWatcher) {
    let (complete_tx, complete_rx) = flume::bounded(1);
    (
        Deferral { complete_tx },
        DeferralWatcher {
            complete_rx,
            budget,
        },
    )
}

/// Trims the device off-thread and waits for completion within `budget`.
///
/// # Errors
///
/// [`VitrineError::SuspendDeadline`] when the trim does not finish in time.
pub fn run_trim(resources: &DeviceResources, budget: Duration) -> Result<()> {
    let (deferral, watcher) = deferral(budget);
    let device = resources.device().clone();

    thread::spawn(move || {
        trim_device(&device);
        deferral.complete();
    });

    watcher.wait()
}

/// Drains the device's deferred-destruction queue so dropped resources are
/// actually returned to the system. Destroys nothing live.
pub(crate) fn trim_device(device: &wgpu::Device) {
    let _ = device.poll(wgpu::PollType::wait_indefinitely());
    debug!("released unused device memory");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completed_deferral_is_observed() {
        let (deferral, watcher) = deferral(Duration::from_millis(500));
        thread::spawn(move || deferral.complete());
        assert!(watcher.wait().is_ok());
    }

    #[test]
    fn overrun_deferral_reports_deadline() {
        let (deferral, watcher) = deferral(Duration::from_millis(10));
        // Hold the signal past the budget.
        let held = thread::spawn(move || {
            thread::sleep(Duration::from_millis(100));
            deferral.complete();
        });

        assert!(matches!(
            watcher.wait(),
            Err(VitrineError::SuspendDeadline { .. })
        ));
        held.join().expect("deferred thread panicked");
    }

    #[test]
    fn dropped_deferral_reports_deadline() {
        let (deferral, watcher) = deferral(Duration::from_millis(10));
        drop(deferral);
        assert!(watcher.wait().is_err());
    }
}
