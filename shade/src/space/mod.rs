use crate::skylight::CGSConnectionID;
use crate::skylight::CGSSpaceID;
use crate::skylight::kCGSAllSpacesMask;
use crate::skylight::kCGSCurrentSpaceMask;
use crate::space::error::SpaceError;
use serde::Deserialize;
use serde::Serialize;
use std::fmt::Display;
use std::fmt::Formatter;
use strum::EnumString;

#[cfg(target_os = "macos")]
pub mod api;
pub mod error;

#[cfg(target_os = "macos")]
pub use api::SpaceApi;

// CGSCopyManagedDisplaySpaces dictionary keys
pub const DISPLAY_IDENTIFIER: &str = "Display Identifier";
pub const CURRENT_SPACE: &str = "Current Space";
pub const SPACES: &str = "Spaces";
pub const ID64: &str = "id64";
pub const MANAGED_SPACE_ID: &str = "ManagedSpaceID";
pub const UUID: &str = "uuid";
pub const TYPE: &str = "type";

/// A Space (virtual desktop) as identified by the window server
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(transparent)]
pub struct SpaceId(pub CGSSpaceID);

impl Display for SpaceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<CGSSpaceID> for SpaceId {
    fn from(value: CGSSpaceID) -> Self {
        Self(value)
    }
}

/// A window server connection, obtained once per process and never released
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ConnectionId(pub CGSConnectionID);

#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    PartialEq,
    Eq,
    strum::Display,
    EnumString,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub enum SpaceMask {
    /// Every Space a window belongs to
    #[default]
    All,
    /// Only the currently active Space
    Current,
}

impl SpaceMask {
    pub const fn bits(self) -> i32 {
        match self {
            SpaceMask::All => kCGSAllSpacesMask,
            SpaceMask::Current => kCGSCurrentSpaceMask,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpaceKind {
    #[default]
    Desktop,
    System,
    Fullscreen,
    Unknown(i64),
}

impl From<i64> for SpaceKind {
    fn from(value: i64) -> Self {
        match value {
            0 => SpaceKind::Desktop,
            2 => SpaceKind::System,
            4 => SpaceKind::Fullscreen,
            other => SpaceKind::Unknown(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Space {
    pub id: SpaceId,
    pub managed_id: u64,
    pub uuid: String,
    pub kind: SpaceKind,
}

/// The Spaces belonging to one display, in Mission Control order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagedDisplay {
    pub identifier: String,
    pub current_space: Option<SpaceId>,
    pub spaces: Vec<Space>,
}

impl ManagedDisplay {
    pub fn contains(&self, space: SpaceId) -> bool {
        self.spaces.iter().any(|s| s.id == space)
    }

    /// Pairs every Space with its 1-based position among the Spaces of
    /// the same kind on this display.
    pub fn ordinals(&self) -> impl Iterator<Item = (&Space, usize)> {
        let mut desktops = 0;
        let mut fullscreens = 0;
        let mut others = 0;

        self.spaces.iter().map(move |space| {
            let counter = match space.kind {
                SpaceKind::Desktop => &mut desktops,
                SpaceKind::Fullscreen => &mut fullscreens,
                SpaceKind::System | SpaceKind::Unknown(_) => &mut others,
            };

            *counter += 1;
            (space, *counter)
        })
    }
}

/// The fields of one `"Spaces"` entry of a managed display
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SpaceEntry {
    pub id64: Option<i64>,
    pub managed_space_id: Option<i64>,
    pub uuid: Option<String>,
    pub kind: Option<i64>,
}

impl SpaceEntry {
    /// `id64`, falling back to `ManagedSpaceID`
    pub fn id(&self) -> Option<SpaceId> {
        self.id64
            .or(self.managed_space_id)
            .map(|id| SpaceId(id as u64))
    }
}

impl TryFrom<SpaceEntry> for Space {
    type Error = SpaceError;

    fn try_from(value: SpaceEntry) -> Result<Self, Self::Error> {
        let id = value.id().ok_or(SpaceError::MissingKey(ID64))?;

        Ok(Self {
            id,
            managed_id: value.managed_space_id.map_or(id.0, |id| id as u64),
            uuid: value.uuid.unwrap_or_default(),
            kind: SpaceKind::from(value.kind.unwrap_or_default()),
        })
    }
}

/// The fields of one display entry returned by `CGSCopyManagedDisplaySpaces`
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DisplayEntry {
    pub identifier: Option<String>,
    pub current_space: Option<SpaceEntry>,
    pub spaces: Vec<SpaceEntry>,
}

impl TryFrom<DisplayEntry> for ManagedDisplay {
    type Error = SpaceError;

    /// Spaces without an id are skipped, a display without an identifier
    /// is rejected
    fn try_from(value: DisplayEntry) -> Result<Self, Self::Error> {
        let identifier = value
            .identifier
            .ok_or(SpaceError::MissingKey(DISPLAY_IDENTIFIER))?;

        let mut spaces = vec![];
        for entry in value.spaces {
            match Space::try_from(entry) {
                Ok(space) => spaces.push(space),
                Err(error) => tracing::warn!("skipping space on display {identifier}: {error}"),
            }
        }

        Ok(Self {
            current_space: value.current_space.as_ref().and_then(SpaceEntry::id),
            identifier,
            spaces,
        })
    }
}

/// The label to show for a Space: the window server's name for it when that
/// is meaningful, otherwise a positional fallback.
pub fn space_label(name: Option<&str>, kind: SpaceKind, ordinal: usize) -> String {
    if let Some(name) = name.map(str::trim)
        && !name.is_empty()
        && !is_uuid_like(name)
    {
        return name.to_string();
    }

    match kind {
        SpaceKind::Desktop => format!("Desktop {ordinal}"),
        SpaceKind::Fullscreen => format!("Fullscreen {ordinal}"),
        SpaceKind::System | SpaceKind::Unknown(_) => format!("Space {ordinal}"),
    }
}

/// 8-4-4-4-12 hex groups separated by dashes
pub fn is_uuid_like(value: &str) -> bool {
    const GROUPS: [usize; 5] = [8, 4, 4, 4, 12];

    let groups = value.split('-').collect::<Vec<_>>();
    groups.len() == GROUPS.len()
        && groups
            .iter()
            .zip(GROUPS)
            .all(|(group, len)| group.len() == len && group.chars().all(|c| c.is_ascii_hexdigit()))
}
