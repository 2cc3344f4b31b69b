#[derive(thiserror::Error, Debug)]
pub enum SpaceError {
    #[error("{0} returned NULL")]
    NullResult(&'static str),
    #[error("managed display entry is missing \"{0}\"")]
    MissingKey(&'static str),
}
