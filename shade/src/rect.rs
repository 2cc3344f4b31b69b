use serde::Deserialize;
use serde::Serialize;
use std::fmt::Display;
use std::fmt::Formatter;

/// Window-server geometry, with `right` and `bottom` holding the width and
/// height rather than absolute edges.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Display for Rect {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{{}, {}, {}, {}}}",
            self.left, self.top, self.right, self.bottom
        )
    }
}

#[derive(Default, Debug, Copy, Clone, PartialEq)]
pub struct WindowBounds {
    pub height: f64,
    pub width: f64,
    pub x: f64,
    pub y: f64,
}

impl From<WindowBounds> for Rect {
    fn from(value: WindowBounds) -> Self {
        Self {
            left: value.x as i32,
            top: value.y as i32,
            right: value.width as i32,
            bottom: value.height as i32,
        }
    }
}

impl Rect {
    pub const fn new(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            left,
            top,
            right: width,
            bottom: height,
        }
    }

    /// A `width` x `height` rect horizontally centred in self and lifted
    /// `margin` above its lower edge. Assumes a bottom-left origin.
    #[must_use]
    pub fn anchored_bottom_centre(&self, width: i32, height: i32, margin: i32) -> Self {
        let width = width.min(self.right);
        let height = height.min(self.bottom);

        Self {
            left: self.left + (self.right - width) / 2,
            top: self.top + margin.min(self.bottom - height).max(0),
            right: width,
            bottom: height,
        }
    }
}

#[cfg(target_os = "macos")]
mod cg {
    use super::Rect;
    use super::WindowBounds;
    use crate::cf_dictionary_value;
    use objc2_core_foundation::CFDictionary;
    use objc2_core_foundation::CFNumber;
    use objc2_core_foundation::CFString;
    use objc2_core_foundation::CGFloat;
    use objc2_core_foundation::CGPoint;
    use objc2_core_foundation::CGRect;
    use objc2_core_foundation::CGSize;

    impl From<CGRect> for Rect {
        fn from(value: CGRect) -> Self {
            Self {
                left: value.origin.x as i32,
                top: value.origin.y as i32,
                right: value.size.width as i32,
                bottom: value.size.height as i32,
            }
        }
    }

    impl From<&Rect> for CGRect {
        fn from(value: &Rect) -> Self {
            Self {
                origin: CGPoint {
                    x: value.left as CGFloat,
                    y: value.top as CGFloat,
                },
                size: CGSize {
                    width: value.right as CGFloat,
                    height: value.bottom as CGFloat,
                },
            }
        }
    }

    fn dimension(value: &CFDictionary, key: &'static str) -> f64 {
        unsafe {
            cf_dictionary_value::<CFNumber>(value, &CFString::from_static_str(key))
                .and_then(|val| val.as_ref().as_f64())
                .unwrap_or_default()
        }
    }

    impl From<&CFDictionary> for WindowBounds {
        fn from(value: &CFDictionary) -> Self {
            Self {
                height: dimension(value, "Height"),
                width: dimension(value, "Width"),
                x: dimension(value, "X"),
                y: dimension(value, "Y"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_truncate_towards_zero() {
        let rect = Rect::from(WindowBounds {
            height: 600.9,
            width: 800.2,
            x: 10.7,
            y: 25.0,
        });

        assert_eq!(rect, Rect::new(10, 25, 800, 600));
    }

    #[test]
    fn displays_as_origin_and_size() {
        assert_eq!(Rect::new(0, 25, 1440, 875).to_string(), "{0, 25, 1440, 875}");
    }

    #[test]
    fn anchors_to_bottom_centre() {
        let screen = Rect::new(0, 0, 1440, 900);
        let anchored = screen.anchored_bottom_centre(400, 200, 60);

        assert_eq!(anchored, Rect::new(520, 60, 400, 200));
    }

    #[test]
    fn anchoring_respects_offset_screens() {
        let screen = Rect::new(1440, -200, 1920, 1080);
        let anchored = screen.anchored_bottom_centre(420, 100, 60);

        assert_eq!(anchored, Rect::new(2190, -140, 420, 100));
    }

    #[test]
    fn anchoring_clamps_to_the_screen() {
        let screen = Rect::new(0, 0, 300, 100);
        let anchored = screen.anchored_bottom_centre(400, 80, 60);

        assert_eq!(anchored, Rect::new(0, 20, 300, 80));
    }
}
