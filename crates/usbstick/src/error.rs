use thiserror::Error;
use usbstick_error::HalError;

pub type StickResult<T> = Result<T, StickError>;

/// Why the controller refused an operation in its current state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("No image selected, please upload and select an image")]
    NoImageSelected,

    #[error("Device still plugged in")]
    DeviceBusy,

    #[error("No such image available: {0}")]
    UnknownImage(String),

    #[error("Image is still mounted from an interrupted file access, run cleanup first")]
    MountActive,
}

#[derive(Error, Debug)]
pub enum StickError {
    #[error("State error: {0}")]
    State(#[from] StateError),

    #[error(transparent)]
    Transport(#[from] HalError),

    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

impl StickError {
    /// The state rejection, if this error is one.
    pub fn state(&self) -> Option<&StateError> {
        match self {
            StickError::State(err) => Some(err),
            _ => None,
        }
    }
}
