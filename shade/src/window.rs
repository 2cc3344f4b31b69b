use crate::rect::Rect;
use crate::rect::WindowBounds;
use crate::space::SpaceId;
use serde::Deserialize;
use serde::Serialize;
use std::fmt::Display;
use std::fmt::Formatter;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowInfo {
    pub id: u32,
    pub title: Option<String>,
    pub owner_name: String,
    pub owner_pid: i32,
    pub bounds: Rect,
    pub layer: i64,
    pub space_id: Option<SpaceId>,
}

impl Display for WindowInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let space = self
            .space_id
            .map_or_else(|| String::from("Unknown Space"), |id| format!("Space {id}"));

        write!(
            f,
            "[{space}] {} - {} (ID: {}, PID: {}, Layer: {}) at {}",
            self.owner_name,
            self.title.as_deref().unwrap_or("(no title)"),
            self.id,
            self.owner_pid,
            self.layer,
            self.bounds
        )
    }
}

/// The fields of one window list entry as read from CoreGraphics
#[derive(Debug, Default, Clone, PartialEq)]
pub struct WindowEntry {
    pub number: Option<i64>,
    pub owner_pid: Option<i32>,
    pub owner_name: Option<String>,
    pub bounds: Option<WindowBounds>,
    pub layer: Option<i64>,
    pub name: Option<String>,
}

impl TryFrom<WindowEntry> for WindowInfo {
    type Error = &'static str;

    /// Entries without an id, owner, bounds or layer are rejected
    fn try_from(value: WindowEntry) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.number.ok_or("kCGWindowNumber")? as u32,
            owner_pid: value.owner_pid.ok_or("kCGWindowOwnerPID")?,
            owner_name: value.owner_name.ok_or("kCGWindowOwnerName")?,
            bounds: Rect::from(value.bounds.ok_or("kCGWindowBounds")?),
            layer: value.layer.ok_or("kCGWindowLayer")?,
            title: value.name.filter(|name| !name.is_empty()),
            space_id: None,
        })
    }
}

#[cfg(target_os = "macos")]
mod cg {
    use super::WindowEntry;
    use super::WindowInfo;
    use crate::cf_dictionary_value;
    use crate::rect::WindowBounds;
    use objc2_core_foundation::CFDictionary;
    use objc2_core_foundation::CFNumber;
    use objc2_core_foundation::CFString;
    use objc2_core_graphics::kCGWindowBounds;
    use objc2_core_graphics::kCGWindowLayer;
    use objc2_core_graphics::kCGWindowName;
    use objc2_core_graphics::kCGWindowNumber;
    use objc2_core_graphics::kCGWindowOwnerName;
    use objc2_core_graphics::kCGWindowOwnerPID;
    use std::ptr::NonNull;

    impl WindowInfo {
        pub fn new(entry: NonNull<CFDictionary>) -> Option<Self> {
            Self::try_from(WindowEntry::from(unsafe { entry.as_ref() })).ok()
        }
    }

    impl From<&CFDictionary> for WindowEntry {
        fn from(value: &CFDictionary) -> Self {
            unsafe {
                let number = |key| {
                    cf_dictionary_value::<CFNumber>(value, key).map(|n| n.as_ref())
                };
                let string = |key| {
                    cf_dictionary_value::<CFString>(value, key).map(|s| s.as_ref().to_string())
                };

                Self {
                    number: number(kCGWindowNumber).and_then(CFNumber::as_i64),
                    owner_pid: number(kCGWindowOwnerPID).and_then(CFNumber::as_i32),
                    owner_name: string(kCGWindowOwnerName),
                    bounds: cf_dictionary_value::<CFDictionary>(value, kCGWindowBounds)
                        .map(|dict| WindowBounds::from(dict.as_ref())),
                    layer: number(kCGWindowLayer).and_then(CFNumber::as_i64),
                    name: string(kCGWindowName),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(title: Option<&str>, space_id: Option<u64>) -> WindowInfo {
        WindowInfo {
            id: 4242,
            title: title.map(String::from),
            owner_name: String::from("Safari"),
            owner_pid: 613,
            bounds: Rect::new(0, 25, 1440, 875),
            layer: 0,
            space_id: space_id.map(SpaceId),
        }
    }

    #[test]
    fn describes_window_with_space_and_title() {
        assert_eq!(
            window(Some("Start Page"), Some(3)).to_string(),
            "[Space 3] Safari - Start Page (ID: 4242, PID: 613, Layer: 0) at {0, 25, 1440, 875}"
        );
    }

    #[test]
    fn describes_window_without_space_or_title() {
        assert_eq!(
            window(None, None).to_string(),
            "[Unknown Space] Safari - (no title) (ID: 4242, PID: 613, Layer: 0) at {0, 25, 1440, 875}"
        );
    }

    fn entry() -> WindowEntry {
        WindowEntry {
            number: Some(4242),
            owner_pid: Some(613),
            owner_name: Some(String::from("Safari")),
            bounds: Some(WindowBounds {
                x: 0.0,
                y: 25.0,
                width: 1440.0,
                height: 875.0,
            }),
            layer: Some(0),
            name: Some(String::from("Start Page")),
        }
    }

    #[test]
    fn builds_window_from_complete_entry() {
        let built = WindowInfo::try_from(entry()).expect("Should convert");
        assert_eq!(built, window(Some("Start Page"), None));
    }

    #[test]
    fn empty_title_becomes_none() {
        let window = WindowInfo::try_from(WindowEntry {
            name: Some(String::new()),
            ..entry()
        })
        .expect("Should convert");
        assert_eq!(window.title, None);

        let window = WindowInfo::try_from(WindowEntry {
            name: None,
            ..entry()
        })
        .expect("Should convert");
        assert_eq!(window.title, None);
    }

    #[test]
    fn entries_missing_required_keys_are_rejected() {
        let cases = [
            (WindowEntry { number: None, ..entry() }, "kCGWindowNumber"),
            (WindowEntry { owner_pid: None, ..entry() }, "kCGWindowOwnerPID"),
            (WindowEntry { owner_name: None, ..entry() }, "kCGWindowOwnerName"),
            (WindowEntry { bounds: None, ..entry() }, "kCGWindowBounds"),
            (WindowEntry { layer: None, ..entry() }, "kCGWindowLayer"),
        ];

        for (entry, missing) in cases {
            assert_eq!(WindowInfo::try_from(entry), Err(missing));
        }
    }

    #[test]
    fn serializes_and_deserializes() {
        let original = window(Some("Start Page"), Some(3));

        let serialized = serde_json::to_string(&original).expect("Should serialize");
        let deserialized: WindowInfo =
            serde_json::from_str(&serialized).expect("Should deserialize");

        assert_eq!(deserialized, original);
    }
}
