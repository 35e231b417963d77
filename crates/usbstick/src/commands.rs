//! Shell commands issued on the target.
//!
//! The defaults match a board with a single loop device in use and the image's first
//! partition mounted at `/mnt/`.

use serde::Deserialize;
use usbstick_hal::path::join_remote;

/// Names of the gadget module, loop partition and mount point on the target.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TargetLayout {
    pub gadget_module: String,
    /// Device node of the image's first partition once attached with `losetup -P`.
    pub loop_partition: String,
    pub mount_point: String,
}

impl Default for TargetLayout {
    fn default() -> Self {
        Self {
            gadget_module: "g_mass_storage".to_string(),
            loop_partition: "/dev/loop0p1".to_string(),
            mount_point: "/mnt/".to_string(),
        }
    }
}

impl TargetLayout {
    pub fn gadget_load(&self, image_path: &str) -> String {
        format!("modprobe {} file={}", self.gadget_module, image_path)
    }

    pub fn gadget_unload(&self) -> String {
        format!("modprobe -r {}", self.gadget_module)
    }

    pub fn loop_attach(&self, image_path: &str) -> String {
        format!("losetup -Pf {}", image_path)
    }

    pub fn mount_partition(&self) -> String {
        format!("mount {} {}", self.loop_partition, self.mount_point)
    }

    pub fn unmount(&self) -> String {
        format!("umount {}", self.mount_point)
    }

    /// Detaches every loop device, not only the one this controller attached.
    pub fn loop_detach_all(&self) -> String {
        "losetup -D".to_string()
    }

    /// Path of `relative` inside the mounted partition.
    pub fn mounted_path(&self, relative: &str) -> String {
        join_remote(&self.mount_point, relative)
    }
}
