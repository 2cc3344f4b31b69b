#![allow(non_upper_case_globals, non_snake_case)]

// Only read operations are permitted, and their usage and potential failure must
// never disrupt the caller

/// Connection to the window server
pub type CGSConnectionID = i32;

/// Space (desktop) identifier
pub type CGSSpaceID = u64;

/// Selector for `CGSCopySpacesForWindows` and `CGSCopySpaces` covering every Space
pub const kCGSAllSpacesMask: i32 = 0x1F;
/// Selector for `CGSCopySpacesForWindows` and `CGSCopySpaces` covering the active Space
pub const kCGSCurrentSpaceMask: i32 = 0x01;

#[cfg(target_os = "macos")]
pub use ffi::*;

#[cfg(target_os = "macos")]
mod ffi {
    use super::CGSConnectionID;
    use super::CGSSpaceID;
    use objc2_core_foundation::CFArray;
    use objc2_core_foundation::CFString;

    // every *Copy* function follows the create rule, callers own the result
    unsafe extern "C" {
        /// The default connection for the calling process.
        pub fn CGSMainConnectionID() -> CGSConnectionID;

        /// Information about all Spaces across all displays.
        pub fn CGSCopyManagedDisplaySpaces(cid: CGSConnectionID) -> *mut CFArray;

        /// The active Space.
        pub fn CGSGetActiveSpace(cid: CGSConnectionID) -> CGSSpaceID;

        /// The Spaces that the given windows belong to.
        pub fn CGSCopySpacesForWindows(
            cid: CGSConnectionID,
            selector: i32,
            window_ids: &CFArray,
        ) -> *mut CFArray;

        /// All Spaces across all displays matching `mask`.
        pub fn CGSCopySpaces(cid: CGSConnectionID, mask: i32) -> *mut CFArray;

        /// The user-assigned name for a Space, often a UUID or empty for regular desktops.
        pub fn CGSSpaceCopyName(cid: CGSConnectionID, space_id: CGSSpaceID) -> *mut CFString;
    }
}
