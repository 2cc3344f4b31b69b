use crate::cf_array_as;
use crate::cf_dictionary_value;
use crate::skylight::CGSCopyManagedDisplaySpaces;
use crate::skylight::CGSCopySpaces;
use crate::skylight::CGSCopySpacesForWindows;
use crate::skylight::CGSGetActiveSpace;
use crate::skylight::CGSMainConnectionID;
use crate::skylight::CGSSpaceCopyName;
use crate::space::CURRENT_SPACE;
use crate::space::ConnectionId;
use crate::space::DISPLAY_IDENTIFIER;
use crate::space::DisplayEntry;
use crate::space::ID64;
use crate::space::MANAGED_SPACE_ID;
use crate::space::ManagedDisplay;
use crate::space::SPACES;
use crate::space::SpaceEntry;
use crate::space::SpaceId;
use crate::space::SpaceMask;
use crate::space::TYPE;
use crate::space::UUID;
use crate::space::error::SpaceError;
use objc2_core_foundation::CFArray;
use objc2_core_foundation::CFDictionary;
use objc2_core_foundation::CFNumber;
use objc2_core_foundation::CFRetained;
use objc2_core_foundation::CFString;
use std::ptr::NonNull;

pub struct SpaceApi;

impl SpaceApi {
    pub fn main_connection() -> ConnectionId {
        ConnectionId(unsafe { CGSMainConnectionID() })
    }

    pub fn active_space(cid: ConnectionId) -> SpaceId {
        SpaceId(unsafe { CGSGetActiveSpace(cid.0) })
    }

    #[tracing::instrument]
    pub fn managed_display_spaces(cid: ConnectionId) -> Result<Vec<ManagedDisplay>, SpaceError> {
        let displays = copied_array(
            unsafe { CGSCopyManagedDisplaySpaces(cid.0) },
            "CGSCopyManagedDisplaySpaces",
        )?;

        cf_array_as::<CFDictionary>(&displays)
            .map(|display| ManagedDisplay::try_from(DisplayEntry::from(unsafe { display.as_ref() })))
            .collect()
    }

    #[tracing::instrument]
    pub fn spaces(cid: ConnectionId, mask: SpaceMask) -> Result<Vec<SpaceId>, SpaceError> {
        let spaces = copied_array(unsafe { CGSCopySpaces(cid.0, mask.bits()) }, "CGSCopySpaces")?;
        Ok(space_ids(&spaces))
    }

    pub fn spaces_for_windows(
        cid: ConnectionId,
        mask: SpaceMask,
        window_ids: &[u32],
    ) -> Result<Vec<SpaceId>, SpaceError> {
        let numbers = window_ids
            .iter()
            .map(|id| CFNumber::new_i64(i64::from(*id)))
            .collect::<Vec<_>>();
        let windows = CFArray::from_retained_objects(&numbers);

        let spaces = copied_array(
            unsafe { CGSCopySpacesForWindows(cid.0, mask.bits(), windows.as_opaque()) },
            "CGSCopySpacesForWindows",
        )?;

        Ok(space_ids(&spaces))
    }

    /// The first Space reported for a window, if any
    pub fn space_for_window(cid: ConnectionId, mask: SpaceMask, window_id: u32) -> Option<SpaceId> {
        match Self::spaces_for_windows(cid, mask, &[window_id]) {
            Ok(spaces) => spaces.first().copied(),
            Err(error) => {
                tracing::debug!("no space for window {window_id}: {error}");
                None
            }
        }
    }

    pub fn space_name(cid: ConnectionId, space: SpaceId) -> Option<String> {
        let name = NonNull::new(unsafe { CGSSpaceCopyName(cid.0, space.0) })?;
        let name = unsafe { CFRetained::from_raw(name) };

        Some(name.to_string())
    }
}

fn copied_array(
    raw: *mut CFArray,
    call: &'static str,
) -> Result<CFRetained<CFArray>, SpaceError> {
    NonNull::new(raw)
        .map(|array| unsafe { CFRetained::from_raw(array) })
        .ok_or(SpaceError::NullResult(call))
}

fn space_ids(array: &CFArray) -> Vec<SpaceId> {
    cf_array_as::<CFNumber>(array)
        .filter_map(|number| unsafe { number.as_ref() }.as_i64())
        .map(|id| SpaceId(id as u64))
        .collect()
}

fn number(dict: &CFDictionary, key: &'static str) -> Option<i64> {
    cf_dictionary_value::<CFNumber>(dict, &CFString::from_static_str(key))
        .and_then(|number| unsafe { number.as_ref() }.as_i64())
}

fn string(dict: &CFDictionary, key: &'static str) -> Option<String> {
    cf_dictionary_value::<CFString>(dict, &CFString::from_static_str(key))
        .map(|string| unsafe { string.as_ref() }.to_string())
}

impl From<&CFDictionary> for SpaceEntry {
    fn from(value: &CFDictionary) -> Self {
        Self {
            id64: number(value, ID64),
            managed_space_id: number(value, MANAGED_SPACE_ID),
            uuid: string(value, UUID),
            kind: number(value, TYPE),
        }
    }
}

impl From<&CFDictionary> for DisplayEntry {
    fn from(value: &CFDictionary) -> Self {
        let current_space =
            cf_dictionary_value::<CFDictionary>(value, &CFString::from_static_str(CURRENT_SPACE))
                .map(|current| SpaceEntry::from(unsafe { current.as_ref() }));

        let spaces = cf_dictionary_value::<CFArray>(value, &CFString::from_static_str(SPACES))
            .map(|array| {
                cf_array_as::<CFDictionary>(unsafe { array.as_ref() })
                    .map(|entry| SpaceEntry::from(unsafe { entry.as_ref() }))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            identifier: string(value, DISPLAY_IDENTIFIER),
            current_space,
            spaces,
        }
    }
}
