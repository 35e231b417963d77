//! Target-side capabilities for the USB stick controller.
//!
//! Every command and file transfer that touches the target board goes through the traits in
//! [`hal`], so the controller can be driven against a real board (`SshHal`, `LocalHal`) or a
//! recording double (`FakeHal`).

pub mod hal;
pub mod path;

pub use hal::*;
pub use usbstick_error::{HalError, HalResult};
