use crate::overview::OverviewLine;
use crate::overview::overlay_frame;
use crate::rect::Rect;
use color_eyre::eyre;
use color_eyre::eyre::OptionExt;
use objc2::MainThreadMarker;
use objc2::MainThreadOnly;
use objc2::rc::Retained;
use objc2_app_kit::NSApplication;
use objc2_app_kit::NSApplicationActivationPolicy;
use objc2_app_kit::NSBackingStoreType;
use objc2_app_kit::NSColor;
use objc2_app_kit::NSFont;
use objc2_app_kit::NSScreen;
use objc2_app_kit::NSTextField;
use objc2_app_kit::NSWindow;
use objc2_app_kit::NSWindowAnimationBehavior;
use objc2_app_kit::NSWindowCollectionBehavior;
use objc2_app_kit::NSWindowLevel;
use objc2_app_kit::NSWindowStyleMask;
use objc2_core_foundation::CGRect;
use objc2_foundation::NSString;

// kCGStatusWindowLevel
const STATUS_WINDOW_LEVEL: NSWindowLevel = 25;
const FONT_SIZE: f64 = 13.0;

/// A click-through window floating above every Space which shows the
/// desktop overview
#[derive(Debug)]
pub struct OverlayWindow {
    window: Retained<NSWindow>,
    label: Retained<NSTextField>,
    mtm: MainThreadMarker,
}

impl OverlayWindow {
    pub fn new(mtm: MainThreadMarker) -> eyre::Result<Self> {
        // accessory apps get no dock icon or menu bar
        let app = NSApplication::sharedApplication(mtm);
        app.setActivationPolicy(NSApplicationActivationPolicy::Accessory);

        let screen = Self::screen_frame(mtm)?;
        let frame = CGRect::from(&screen);

        let window = unsafe {
            let window = NSWindow::alloc(mtm);
            NSWindow::initWithContentRect_styleMask_backing_defer(
                window,
                frame,
                NSWindowStyleMask::Borderless | NSWindowStyleMask::FullSizeContentView,
                NSBackingStoreType::Buffered,
                false,
            )
        };

        unsafe {
            window.setBackgroundColor(Some(&NSColor::colorWithCalibratedWhite_alpha(0.1, 0.9)));
            window.setAnimationBehavior(NSWindowAnimationBehavior::None);
            window.setReleasedWhenClosed(false);
            window.setRestorable(false);
        }

        window.setHasShadow(false);
        window.setOpaque(false);
        window.setLevel(STATUS_WINDOW_LEVEL);
        window.setIgnoresMouseEvents(true);

        unsafe {
            window.setCollectionBehavior(
                NSWindowCollectionBehavior::CanJoinAllSpaces
                    | NSWindowCollectionBehavior::Stationary
                    | NSWindowCollectionBehavior::IgnoresCycle
                    | NSWindowCollectionBehavior::FullScreenAuxiliary,
            );
        }

        let label = NSTextField::labelWithString(&NSString::from_str(""), mtm);
        unsafe {
            label.setFont(NSFont::userFixedPitchFontOfSize(FONT_SIZE).as_deref());
            label.setTextColor(Some(&NSColor::whiteColor()));
        }

        window.setContentView(Some(&label));

        Ok(Self { window, label, mtm })
    }

    fn screen_frame(mtm: MainThreadMarker) -> eyre::Result<Rect> {
        let screen = NSScreen::mainScreen(mtm).ok_or_eyre("there is no main screen")?;
        Ok(Rect::from(screen.frame()))
    }

    /// Replaces the overview text and resizes the window around it
    pub fn set_lines(&self, lines: &[OverviewLine]) {
        let text = lines
            .iter()
            .map(|line| line.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        self.label.setStringValue(&NSString::from_str(&text));

        match Self::screen_frame(self.mtm) {
            Ok(screen) => {
                let frame = overlay_frame(screen, lines);
                self.window.setFrame_display(CGRect::from(&frame), true);
            }
            Err(error) => tracing::warn!("could not position the overlay: {error}"),
        }
    }

    pub fn show(&self) {
        self.window.orderFrontRegardless();
        self.window.setAlphaValue(1.0);
    }

    pub fn hide(&self) {
        self.window.orderOut(None);
    }

    pub fn close(self) {
        self.window.close();
    }
}
