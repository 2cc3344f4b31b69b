use crate::rect::Rect;
use objc2_core_foundation::CFArray;
use objc2_core_foundation::CFRetained;
use objc2_core_graphics::CGDisplayBounds;
use objc2_core_graphics::CGMainDisplayID;
use objc2_core_graphics::CGWindowListCopyWindowInfo;
use objc2_core_graphics::CGWindowListOption;
use objc2_core_graphics::kCGNullWindowID;

pub struct CoreGraphicsApi;

impl CoreGraphicsApi {
    pub fn main_display_bounds() -> Rect {
        Rect::from(unsafe { CGDisplayBounds(CGMainDisplayID()) })
    }

    pub fn window_list_info(include_offscreen: bool) -> Option<CFRetained<CFArray>> {
        let options = if include_offscreen {
            CGWindowListOption::OptionAll | CGWindowListOption::ExcludeDesktopElements
        } else {
            CGWindowListOption::OptionOnScreenOnly | CGWindowListOption::ExcludeDesktopElements
        };

        // kCGNullWindowID is required when using OnScreenOnly
        unsafe { CGWindowListCopyWindowInfo(options, kCGNullWindowID) }
    }
}
