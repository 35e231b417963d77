//! Controller for a USB mass-storage stick emulated by a target board.
//!
//! The board exposes a disk image to the device under test through the `g_mass_storage`
//! gadget driver. [`UsbStick`] tracks whether the stick is plugged in, which image is
//! active and which images have been uploaded, and sequences the loop-device/mount commands
//! needed to read and write files inside the image while it is unplugged.

pub mod commands;
pub mod config;
pub mod error;
pub mod state;
pub mod stick;

pub use commands::TargetLayout;
pub use config::{StickConfig, TransportConfig, TransportKind};
pub use error::{StateError, StickError, StickResult};
pub use state::{StickState, UsbStatus};
pub use stick::UsbStick;
