use crate::LibraryError;
use crate::config::ShadeConfig;
use crate::space::ManagedDisplay;
use crate::space::SpaceId;
use crate::space::SpaceKind;
use crate::space::SpaceMask;
use crate::space::space_label;
use crate::window::WindowInfo;
use crate::window_server::WindowServer;
use serde::Deserialize;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

#[derive(Debug, Default)]
pub struct WindowManager {
    pub windows: Vec<WindowInfo>,
    pub space_mask: SpaceMask,
    pub include_offscreen_windows: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceInfo {
    pub id: SpaceId,
    pub name: String,
    pub kind: SpaceKind,
    pub display: String,
    pub window_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub active_space: SpaceId,
    /// The Spaces currently shown, one per display
    pub visible_spaces: Vec<SpaceId>,
    pub spaces: Vec<SpaceInfo>,
    pub windows: Vec<WindowInfo>,
}

impl Snapshot {
    /// `*` for the active Space, `+` for a Space shown on another display
    pub fn marker(&self, space: SpaceId) -> &'static str {
        if space == self.active_space {
            "*"
        } else if self.visible_spaces.contains(&space) {
            "+"
        } else {
            " "
        }
    }
}

/// Windows with a known Space come first in ascending Space order, ties and
/// unknowns fall back to the owner name
fn compare_windows(lhs: &WindowInfo, rhs: &WindowInfo) -> Ordering {
    let by_space = match (lhs.space_id, rhs.space_id) {
        (Some(lhs), Some(rhs)) => lhs.cmp(&rhs),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };

    by_space.then_with(|| lhs.owner_name.cmp(&rhs.owner_name))
}

impl WindowManager {
    pub fn new(config: &ShadeConfig) -> Self {
        Self {
            windows: vec![],
            space_mask: config.space_mask,
            include_offscreen_windows: config.include_offscreen_windows,
        }
    }

    #[tracing::instrument(skip_all)]
    pub fn enumerate_windows<S: WindowServer + ?Sized>(&mut self, server: &S) {
        tracing::info!("starting window enumeration");

        let mut windows = server.window_list(self.include_offscreen_windows);
        for window in &mut windows {
            window.space_id = server.space_for_window(window.id, self.space_mask);
        }

        self.set_windows(windows);

        tracing::info!("successfully enumerated {} windows", self.windows.len());
        self.log_windows();
    }

    pub fn set_windows(&mut self, mut windows: Vec<WindowInfo>) {
        windows.sort_by(compare_windows);
        self.windows = windows;
    }

    pub fn grouped_by_space(&self) -> BTreeMap<Option<SpaceId>, Vec<&WindowInfo>> {
        let mut groups: BTreeMap<Option<SpaceId>, Vec<&WindowInfo>> = BTreeMap::new();
        for window in &self.windows {
            groups.entry(window.space_id).or_default().push(window);
        }

        groups
    }

    pub fn window_count(&self, space: SpaceId) -> usize {
        self.windows
            .iter()
            .filter(|window| window.space_id == Some(space))
            .count()
    }

    pub fn distribution(&self) -> String {
        let entries = self
            .grouped_by_space()
            .iter()
            .map(|(space, windows)| match space {
                Some(space) => format!("{space}: {}", windows.len()),
                None => format!("unknown: {}", windows.len()),
            })
            .collect::<Vec<_>>();

        format!("{{{}}}", entries.join(", "))
    }

    pub fn log_windows(&self) {
        let groups = self.grouped_by_space();

        tracing::info!(
            "window enumeration results: {} total windows",
            self.windows.len()
        );

        for (space, windows) in &groups {
            match space {
                Some(space) => tracing::info!("space {space} ({} windows)", windows.len()),
                None => tracing::info!("unknown space ({} windows)", windows.len()),
            }

            for window in windows {
                tracing::info!("  {window}");
            }
        }

        tracing::info!(
            "summary: {} spaces, distribution: {}",
            groups.len(),
            self.distribution()
        );
    }

    /// One entry per managed Space, in display order
    pub fn spaces_info<F>(&self, displays: &[ManagedDisplay], name_for: F) -> Vec<SpaceInfo>
    where
        F: Fn(SpaceId) -> Option<String>,
    {
        let mut spaces = vec![];

        for display in displays {
            for (space, ordinal) in display.ordinals() {
                spaces.push(SpaceInfo {
                    id: space.id,
                    name: space_label(name_for(space.id).as_deref(), space.kind, ordinal),
                    kind: space.kind,
                    display: display.identifier.clone(),
                    window_count: self.window_count(space.id),
                });
            }
        }

        spaces
    }

    pub fn snapshot<S: WindowServer + ?Sized>(&self, server: &S) -> Result<Snapshot, LibraryError> {
        let displays = server.managed_displays()?;

        Ok(Snapshot {
            active_space: server.active_space(),
            visible_spaces: server.spaces(SpaceMask::Current)?,
            spaces: self.spaces_info(&displays, |space| server.space_name(space)),
            windows: self.windows.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rect::Rect;
    use crate::space::Space;
    use crate::space::error::SpaceError;
    use std::collections::HashMap;

    #[derive(Default)]
    struct FakeWindowServer {
        active: u64,
        displays: Vec<ManagedDisplay>,
        window_spaces: HashMap<u32, u64>,
        names: HashMap<u64, String>,
        windows: Vec<WindowInfo>,
        offscreen: Vec<WindowInfo>,
    }

    impl WindowServer for FakeWindowServer {
        fn active_space(&self) -> SpaceId {
            SpaceId(self.active)
        }

        fn managed_displays(&self) -> Result<Vec<ManagedDisplay>, SpaceError> {
            if self.displays.is_empty() {
                return Err(SpaceError::NullResult("CGSCopyManagedDisplaySpaces"));
            }

            Ok(self.displays.clone())
        }

        fn spaces(&self, mask: SpaceMask) -> Result<Vec<SpaceId>, SpaceError> {
            Ok(match mask {
                SpaceMask::All => self
                    .displays
                    .iter()
                    .flat_map(|display| display.spaces.iter().map(|space| space.id))
                    .collect(),
                SpaceMask::Current => self
                    .displays
                    .iter()
                    .filter_map(|display| display.current_space)
                    .collect(),
            })
        }

        fn space_for_window(&self, window_id: u32, mask: SpaceMask) -> Option<SpaceId> {
            let space = self.window_spaces.get(&window_id).copied().map(SpaceId)?;

            match mask {
                SpaceMask::All => Some(space),
                SpaceMask::Current => (space.0 == self.active).then_some(space),
            }
        }

        fn space_name(&self, space: SpaceId) -> Option<String> {
            self.names.get(&space.0).cloned()
        }

        fn window_list(&self, include_offscreen: bool) -> Vec<WindowInfo> {
            let mut windows = self.windows.clone();
            if include_offscreen {
                windows.extend(self.offscreen.iter().cloned());
            }

            windows
        }
    }

    fn window(id: u32, owner_name: &str) -> WindowInfo {
        WindowInfo {
            id,
            title: None,
            owner_name: owner_name.to_string(),
            owner_pid: id as i32 + 100,
            bounds: Rect::new(0, 25, 800, 600),
            layer: 0,
            space_id: None,
        }
    }

    fn desktop(id: u64) -> Space {
        Space {
            id: SpaceId(id),
            managed_id: id,
            uuid: String::new(),
            kind: SpaceKind::Desktop,
        }
    }

    fn server() -> FakeWindowServer {
        FakeWindowServer {
            active: 3,
            displays: vec![ManagedDisplay {
                identifier: String::from("Main"),
                current_space: Some(SpaceId(3)),
                spaces: vec![desktop(1), desktop(3), desktop(5)],
            }],
            window_spaces: HashMap::from([(10, 5), (11, 1), (12, 5), (13, 3)]),
            names: HashMap::from([
                (1, String::from("5C0F1E2A-7B9D-4E3C-A1F0-1234567890AB")),
                (5, String::from("Writing")),
            ]),
            windows: vec![
                window(10, "Terminal"),
                window(11, "Safari"),
                window(12, "Finder"),
                window(13, "Mail"),
                window(14, "Dock"),
            ],
            offscreen: vec![window(15, "Notes")],
        }
    }

    #[test]
    fn test_enumerate_windows_resolves_and_sorts() {
        let mut wm = WindowManager::default();
        wm.enumerate_windows(&server());

        let order = wm
            .windows
            .iter()
            .map(|w| (w.space_id.map(|s| s.0), w.owner_name.as_str()))
            .collect::<Vec<_>>();

        assert_eq!(
            order,
            vec![
                (Some(1), "Safari"),
                (Some(3), "Mail"),
                (Some(5), "Finder"),
                (Some(5), "Terminal"),
                (None, "Dock"),
            ]
        );
    }

    #[test]
    fn test_current_mask_only_resolves_active_space() {
        let mut wm = WindowManager {
            space_mask: SpaceMask::Current,
            ..Default::default()
        };
        wm.enumerate_windows(&server());

        let resolved = wm
            .windows
            .iter()
            .filter(|w| w.space_id.is_some())
            .map(|w| w.id)
            .collect::<Vec<_>>();

        assert_eq!(resolved, vec![13]);
    }

    #[test]
    fn test_offscreen_windows_are_opt_in() {
        let mut wm = WindowManager::default();
        wm.enumerate_windows(&server());
        assert_eq!(wm.windows.len(), 5);

        wm.include_offscreen_windows = true;
        wm.enumerate_windows(&server());
        assert_eq!(wm.windows.len(), 6);
    }

    #[test]
    fn test_grouped_by_space_puts_unknown_first() {
        let mut wm = WindowManager::default();
        wm.enumerate_windows(&server());

        let groups = wm.grouped_by_space();
        let keys = groups.keys().copied().collect::<Vec<_>>();

        assert_eq!(
            keys,
            vec![None, Some(SpaceId(1)), Some(SpaceId(3)), Some(SpaceId(5))]
        );
        assert_eq!(groups[&Some(SpaceId(5))].len(), 2);
        assert_eq!(wm.distribution(), "{unknown: 1, 1: 1, 3: 1, 5: 2}");
    }

    #[test]
    fn test_spaces_info_labels_and_counts() {
        let server = server();
        let mut wm = WindowManager::default();
        wm.enumerate_windows(&server);

        let spaces = wm.spaces_info(&server.displays, |space| server.space_name(space));

        let summary = spaces
            .iter()
            .map(|s| (s.id.0, s.name.as_str(), s.window_count))
            .collect::<Vec<_>>();

        assert_eq!(
            summary,
            vec![(1, "Desktop 1", 1), (3, "Desktop 2", 1), (5, "Writing", 2)]
        );
        assert!(spaces.iter().all(|s| s.display == "Main"));
    }

    #[test]
    fn test_snapshot_reports_active_space() {
        let server = server();
        let mut wm = WindowManager::default();
        wm.enumerate_windows(&server);

        let snapshot = wm.snapshot(&server).expect("Should snapshot");

        assert_eq!(snapshot.active_space, SpaceId(3));
        assert_eq!(snapshot.visible_spaces, vec![SpaceId(3)]);
        assert_eq!(snapshot.spaces.len(), 3);
        assert_eq!(snapshot.windows.len(), 5);
    }

    #[test]
    fn test_snapshot_marks_active_and_visible_spaces() {
        let mut server = server();
        server.displays.push(ManagedDisplay {
            identifier: String::from("Sidecar"),
            current_space: Some(SpaceId(8)),
            spaces: vec![desktop(7), desktop(8)],
        });

        let mut wm = WindowManager::default();
        wm.enumerate_windows(&server);
        let snapshot = wm.snapshot(&server).expect("Should snapshot");

        assert_eq!(snapshot.visible_spaces, vec![SpaceId(3), SpaceId(8)]);

        let markers = snapshot
            .spaces
            .iter()
            .map(|s| (s.id.0, snapshot.marker(s.id)))
            .collect::<Vec<_>>();

        assert_eq!(
            markers,
            vec![(1, " "), (3, "*"), (5, " "), (7, " "), (8, "+")]
        );
    }

    #[test]
    fn test_snapshot_surfaces_window_server_failures() {
        let server = FakeWindowServer::default();
        let wm = WindowManager::default();

        assert!(matches!(
            wm.snapshot(&server),
            Err(LibraryError::Space(SpaceError::NullResult(_)))
        ));
    }
}
