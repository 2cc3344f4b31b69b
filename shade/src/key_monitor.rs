use crate::modifier;
use crate::modifier::ModifierKey;
use crate::modifier::ModifierTracker;
use crate::modifier::TapEvent;
use lazy_static::lazy_static;
use objc2_core_foundation::CFMachPort;
use objc2_core_foundation::CFRetained;
use objc2_core_foundation::CFRunLoop;
use objc2_core_foundation::kCFRunLoopDefaultMode;
use objc2_core_graphics::CGEvent;
use objc2_core_graphics::CGEventTapLocation;
use objc2_core_graphics::CGEventTapOptions;
use objc2_core_graphics::CGEventTapPlacement;
use objc2_core_graphics::CGEventTapProxy;
use objc2_core_graphics::CGEventType;
use parking_lot::Mutex;
use std::ffi::c_void;
use std::ptr::NonNull;
use std::sync::atomic::AtomicPtr;
use std::sync::atomic::Ordering;

lazy_static! {
    static ref TRACKER: Mutex<ModifierTracker> = Mutex::new(ModifierTracker::default());
}

// the live tap, owned by KeyMonitor and cleared before it is invalidated
static TAP: AtomicPtr<CFMachPort> = AtomicPtr::new(std::ptr::null_mut());

/// Listens for modifier flag changes and forwards press/release edges of the
/// trigger key to [`modifier::event_rx`]
pub struct KeyMonitor {
    port: CFRetained<CFMachPort>,
}

extern "C-unwind" fn callback(
    _: CGEventTapProxy,
    event_type: CGEventType,
    mut event_ref: NonNull<CGEvent>,
    _listener: *mut c_void,
) -> *mut CGEvent {
    match TapEvent::from(event_type.0) {
        TapEvent::Disabled => {
            tracing::warn!("modifier event tap was disabled by the system, enabling it again");

            if let Some(transition) = TRACKER.lock().reset() {
                modifier::send_transition(transition);
            }

            if let Some(port) = NonNull::new(TAP.load(Ordering::Acquire)) {
                CGEvent::tap_enable(unsafe { port.as_ref() }, true);
            }
        }
        TapEvent::FlagsChanged => {
            let flags = unsafe { CGEvent::flags(Some(event_ref.as_ref())) };

            if let Some(transition) = TRACKER.lock().observe(flags.0) {
                tracing::debug!("trigger modifier {transition}");
                modifier::send_transition(transition);
            }
        }
        TapEvent::Other => {}
    }

    unsafe { event_ref.as_mut() }
}

impl KeyMonitor {
    pub fn init(run_loop: &CFRunLoop, key: ModifierKey) -> Option<Self> {
        *TRACKER.lock() = ModifierTracker::new(key);

        let flags_changed_mask = 1 << CGEventType::FlagsChanged.0;
        let mut port = None;

        unsafe {
            let tap_port = CGEvent::tap_create(
                CGEventTapLocation::HIDEventTap,
                CGEventTapPlacement::HeadInsertEventTap,
                CGEventTapOptions::ListenOnly,
                flags_changed_mask,
                Some(callback),
                std::ptr::null_mut(),
            );

            if let Some(tap_port) = &tap_port {
                port = Some(tap_port.clone());
            }

            match CFMachPort::new_run_loop_source(None, tap_port.as_deref(), 0) {
                None => {
                    tracing::error!("could not create a run loop source for the modifier event tap");
                }
                Some(source) => {
                    CFRunLoop::add_source(run_loop, Some(&source), kCFRunLoopDefaultMode);
                }
            }
        }

        let port = port?;
        TAP.store(NonNull::from(&*port).as_ptr(), Ordering::Release);

        Some(Self { port })
    }
}

impl Drop for KeyMonitor {
    fn drop(&mut self) {
        TAP.store(std::ptr::null_mut(), Ordering::Release);
        CFMachPort::invalidate(&self.port);
        CGEvent::tap_enable(&self.port, false);
    }
}
