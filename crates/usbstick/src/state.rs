//! Controller state.

use crate::error::StateError;
use std::fmt;

/// Where the emulated stick currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UsbStatus {
    /// Not exposed to the device under test; images may be mounted on the board.
    #[default]
    Unplugged,
    /// Exposed through the mass-storage gadget; the image must not be touched.
    Plugged,
    /// The active image is attached to a loop device on the board.
    ///
    /// Only seen between the steps of a file access, or after one was interrupted.
    Mounted,
}

impl fmt::Display for UsbStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UsbStatus::Unplugged => write!(f, "unplugged"),
            UsbStatus::Plugged => write!(f, "plugged"),
            UsbStatus::Mounted => write!(f, "mounted"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StickState {
    pub status: UsbStatus,
    pub active_image: Option<String>,
    /// Uploaded image names in upload order; duplicates are kept.
    pub known_images: Vec<String>,
}

impl StickState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_known(&self, name: &str) -> bool {
        self.known_images.iter().any(|known| known == name)
    }

    /// Gate for operations that touch the image on the board.
    pub fn require_unplugged(&self) -> Result<(), StateError> {
        match self.status {
            UsbStatus::Unplugged => Ok(()),
            UsbStatus::Plugged => Err(StateError::DeviceBusy),
            UsbStatus::Mounted => Err(StateError::MountActive),
        }
    }

    /// Gate for the cleanup paths, which are also how a stale mount is recovered.
    pub fn require_not_plugged(&self) -> Result<(), StateError> {
        match self.status {
            UsbStatus::Plugged => Err(StateError::DeviceBusy),
            UsbStatus::Unplugged | UsbStatus::Mounted => Ok(()),
        }
    }

    pub fn require_active_image(&self) -> Result<&str, StateError> {
        self.active_image
            .as_deref()
            .ok_or(StateError::NoImageSelected)
    }
}
