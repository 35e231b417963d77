//! Capability traits and their implementations.
//!
//! The controller only needs two narrow capabilities: running shell commands on the target
//! ([`CommandOps`]) and moving files to and from it ([`FileTransferOps`]).

pub mod command_ops;
pub mod fake_hal;
pub mod local_hal;
mod process;
pub mod ssh_hal;
pub mod transfer_ops;

pub use command_ops::{CommandOps, CommandOutput};
pub use fake_hal::{FakeHal, Operation};
pub use local_hal::LocalHal;
pub use ssh_hal::{SshHal, SshTarget};
pub use transfer_ops::FileTransferOps;

/// A backend providing both target capabilities.
pub trait TargetHal: CommandOps + FileTransferOps {}

/// Automatically implement TargetHal for any type implementing both capabilities.
impl<T> TargetHal for T where T: CommandOps + FileTransferOps {}
