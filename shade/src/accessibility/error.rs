#[derive(thiserror::Error, Debug)]
pub enum AccessibilityError {
    #[error("could not create a URL from {0}")]
    InvalidUrl(&'static str),
    #[error("NSWorkspace could not open {0}")]
    OpenFailed(&'static str),
}
