use crate::space::ManagedDisplay;
use crate::space::SpaceId;
use crate::space::SpaceMask;
use crate::space::error::SpaceError;
use crate::window::WindowInfo;

/// Read-only queries against the window server
pub trait WindowServer {
    fn active_space(&self) -> SpaceId;
    fn managed_displays(&self) -> Result<Vec<ManagedDisplay>, SpaceError>;
    fn spaces(&self, mask: SpaceMask) -> Result<Vec<SpaceId>, SpaceError>;
    fn space_for_window(&self, window_id: u32, mask: SpaceMask) -> Option<SpaceId>;
    fn space_name(&self, space: SpaceId) -> Option<String>;
    /// Windows with their Space left unresolved
    fn window_list(&self, include_offscreen: bool) -> Vec<WindowInfo>;
}

#[cfg(target_os = "macos")]
pub use skylight::SkylightWindowServer;

#[cfg(target_os = "macos")]
mod skylight {
    use super::WindowServer;
    use crate::cf_array_as;
    use crate::core_graphics::CoreGraphicsApi;
    use crate::space::ConnectionId;
    use crate::space::ManagedDisplay;
    use crate::space::SpaceApi;
    use crate::space::SpaceId;
    use crate::space::SpaceMask;
    use crate::space::error::SpaceError;
    use crate::window::WindowInfo;
    use objc2_core_foundation::CFDictionary;

    #[derive(Debug, Copy, Clone)]
    pub struct SkylightWindowServer {
        connection: ConnectionId,
    }

    impl SkylightWindowServer {
        pub fn new() -> Self {
            Self {
                connection: SpaceApi::main_connection(),
            }
        }

        pub fn connection(&self) -> ConnectionId {
            self.connection
        }
    }

    impl Default for SkylightWindowServer {
        fn default() -> Self {
            Self::new()
        }
    }

    impl WindowServer for SkylightWindowServer {
        fn active_space(&self) -> SpaceId {
            SpaceApi::active_space(self.connection)
        }

        fn managed_displays(&self) -> Result<Vec<ManagedDisplay>, SpaceError> {
            SpaceApi::managed_display_spaces(self.connection)
        }

        fn spaces(&self, mask: SpaceMask) -> Result<Vec<SpaceId>, SpaceError> {
            SpaceApi::spaces(self.connection, mask)
        }

        fn space_for_window(&self, window_id: u32, mask: SpaceMask) -> Option<SpaceId> {
            SpaceApi::space_for_window(self.connection, mask, window_id)
        }

        fn space_name(&self, space: SpaceId) -> Option<String> {
            SpaceApi::space_name(self.connection, space)
        }

        fn window_list(&self, include_offscreen: bool) -> Vec<WindowInfo> {
            let Some(window_list_info) = CoreGraphicsApi::window_list_info(include_offscreen) else {
                tracing::error!("failed to get window list");
                return vec![];
            };

            tracing::info!("found {} windows to process", window_list_info.len());

            cf_array_as::<CFDictionary>(&window_list_info)
                .filter_map(WindowInfo::new)
                .collect()
        }
    }
}
