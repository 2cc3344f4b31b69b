#![warn(clippy::all)]

use crate::accessibility::error::AccessibilityError;
use crate::config::ConfigError;
use crate::space::error::SpaceError;
use lazy_static::lazy_static;
use std::path::PathBuf;

#[cfg(target_os = "macos")]
use objc2_core_foundation::CFArray;
#[cfg(target_os = "macos")]
use objc2_core_foundation::CFDictionary;
#[cfg(target_os = "macos")]
use objc2_core_foundation::CFString;
#[cfg(target_os = "macos")]
use std::ptr::NonNull;

pub mod accessibility;
pub mod config;
#[cfg(target_os = "macos")]
pub mod core_graphics;
#[cfg(target_os = "macos")]
pub mod key_monitor;
pub mod modifier;
#[cfg(target_os = "macos")]
pub mod overlay;
pub mod overview;
pub mod rect;
pub mod skylight;
pub mod space;
pub mod window;
pub mod window_manager;
pub mod window_server;

lazy_static! {
    pub static ref HOME_DIR: PathBuf = {
        std::env::var("SHADE_CONFIG_HOME").map_or_else(
            |_| dirs::home_dir().expect("there is no home directory").join(".config").join("shade"),
            |home_path| {
                let home = PathBuf::from(&home_path);

                assert!(
                    home.is_dir(),
                    "$SHADE_CONFIG_HOME is set to '{home_path}', which is not a valid directory"
                );

                home
            },
        )
    };
    pub static ref DATA_DIR: PathBuf = dirs::data_local_dir()
        .expect("there is no local data directory")
        .join("shade");
}

#[cfg(target_os = "macos")]
pub fn cf_array_as<T>(array: &CFArray) -> impl Iterator<Item = NonNull<T>> + use<'_, T> {
    let count = CFArray::count(array);
    (0..count).flat_map(move |idx| {
        NonNull::new(unsafe { CFArray::value_at_index(array, idx).cast_mut() })
            .map(|ptr| ptr.cast::<T>())
    })
}

#[cfg(target_os = "macos")]
pub fn cf_dictionary_value<T>(dict: &CFDictionary, key: &CFString) -> Option<NonNull<T>> {
    let ptr = unsafe { CFDictionary::value(dict, NonNull::from(key).as_ptr().cast()) };
    NonNull::new(ptr.cast_mut()).map(|ptr| ptr.cast::<T>())
}

#[derive(thiserror::Error, Debug)]
pub enum LibraryError {
    #[error(transparent)]
    Accessibility(#[from] AccessibilityError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Space(#[from] SpaceError),
}
