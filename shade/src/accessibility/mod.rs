use crossbeam_channel::Receiver;
use crossbeam_channel::RecvTimeoutError;
use crossbeam_channel::Sender;
use std::thread::JoinHandle;
use std::time::Duration;

#[cfg(target_os = "macos")]
pub use api::AccessibilityApi;

pub mod error;

pub const ACCESSIBILITY_SETTINGS_URL: &str =
    "x-apple.systempreferences:com.apple.preference.security?Privacy_Accessibility";

#[cfg(target_os = "macos")]
mod api {
    use super::ACCESSIBILITY_SETTINGS_URL;
    use super::error::AccessibilityError;
    use objc2_app_kit::NSWorkspace;
    use objc2_application_services::AXIsProcessTrusted;
    use objc2_application_services::AXIsProcessTrustedWithOptions;
    use objc2_application_services::kAXTrustedCheckOptionPrompt;
    use objc2_core_foundation::CFBoolean;
    use objc2_core_foundation::CFDictionary;
    use objc2_core_foundation::CFString;
    use objc2_core_foundation::CFType;
    use objc2_foundation::NSString;
    use objc2_foundation::NSURL;

    pub struct AccessibilityApi;

    impl AccessibilityApi {
        pub fn is_process_trusted() -> bool {
            unsafe { AXIsProcessTrusted() }
        }

        /// Checks the permission, asking the system to prompt the user when it
        /// has not been granted yet
        pub fn request_trust() -> bool {
            unsafe {
                let key: &CFString = kAXTrustedCheckOptionPrompt;
                let value: &CFType = CFBoolean::new(true);
                let options = CFDictionary::from_slices(&[key], &[value]);

                AXIsProcessTrustedWithOptions(Some(options.as_opaque()))
            }
        }

        pub fn open_system_settings() -> Result<(), AccessibilityError> {
            let url = NSURL::URLWithString(&NSString::from_str(ACCESSIBILITY_SETTINGS_URL))
                .ok_or(AccessibilityError::InvalidUrl(ACCESSIBILITY_SETTINGS_URL))?;

            if unsafe { NSWorkspace::sharedWorkspace().openURL(&url) } {
                Ok(())
            } else {
                Err(AccessibilityError::OpenFailed(ACCESSIBILITY_SETTINGS_URL))
            }
        }
    }
}

/// Remembers the last observed permission state and reports changes,
/// including the very first observation
#[derive(Debug, Default)]
pub struct PermissionTracker {
    granted: Option<bool>,
}

impl PermissionTracker {
    pub fn observe(&mut self, granted: bool) -> Option<bool> {
        if self.granted == Some(granted) {
            return None;
        }

        self.granted = Some(granted);
        Some(granted)
    }
}

/// Polls a permission check on a background thread until dropped
pub struct PermissionMonitor {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl PermissionMonitor {
    pub fn spawn<F>(interval: Duration, check: F) -> (Self, Receiver<bool>)
    where
        F: Fn() -> bool + Send + 'static,
    {
        let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(0);
        let (changes_tx, changes_rx) = crossbeam_channel::unbounded();

        let handle = std::thread::spawn(move || {
            let mut tracker = PermissionTracker::default();

            loop {
                if let Some(granted) = tracker.observe(check())
                    && changes_tx.send(granted).is_err()
                {
                    break;
                }

                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {}
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }

            tracing::debug!("stopped polling accessibility permission");
        });

        (
            Self {
                stop: Some(stop_tx),
                handle: Some(handle),
            },
            changes_rx,
        )
    }
}

impl Drop for PermissionMonitor {
    fn drop(&mut self) {
        // disconnecting the stop channel wakes the polling thread
        self.stop.take();

        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            tracing::error!("accessibility permission monitor panicked");
        }
    }
}
