//! The USB stick controller.

use crate::commands::TargetLayout;
use crate::error::{StateError, StickError, StickResult};
use crate::state::{StickState, UsbStatus};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use usbstick_hal::path::{has_parent_component, join_remote};
use usbstick_hal::{CommandOps, FileTransferOps, HalResult};

/// A disk image on the target exposed as a removable USB stick.
///
/// Operations are synchronous and run their commands strictly in order. A failing command or
/// transfer is returned unchanged and nothing is rolled back; if that happens in the middle of
/// a file access the controller stays [`UsbStatus::Mounted`] until [`UsbStick::cleanup`] or
/// [`UsbStick::switch_image`] releases the mount.
#[derive(Debug)]
pub struct UsbStick<C, F> {
    commands: C,
    transfer: F,
    image_dir: String,
    layout: TargetLayout,
    state: StickState,
}

impl<C: CommandOps, F: FileTransferOps> UsbStick<C, F> {
    pub fn new(commands: C, transfer: F, image_dir: impl Into<String>) -> Self {
        Self {
            commands,
            transfer,
            image_dir: image_dir.into(),
            layout: TargetLayout::default(),
            state: StickState::new(),
        }
    }

    pub fn with_layout(mut self, layout: TargetLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn status(&self) -> UsbStatus {
        self.state.status
    }

    pub fn active_image(&self) -> Option<&str> {
        self.state.active_image.as_deref()
    }

    pub fn known_images(&self) -> &[String] {
        &self.state.known_images
    }

    pub fn state(&self) -> &StickState {
        &self.state
    }

    pub fn image_dir(&self) -> &str {
        &self.image_dir
    }

    pub fn layout(&self) -> &TargetLayout {
        &self.layout
    }

    fn active_image_path(&self) -> Result<String, StateError> {
        let image = self.state.require_active_image()?;
        Ok(join_remote(&self.image_dir, image))
    }

    /// Plug the stick in, exposing the active image to the device under test.
    ///
    /// Does nothing if it is already plugged in.
    pub fn plug_in(&mut self) -> StickResult<()> {
        let image = self.active_image_path()?;
        match self.state.status {
            UsbStatus::Plugged => return Ok(()),
            UsbStatus::Mounted => return Err(StateError::MountActive.into()),
            UsbStatus::Unplugged => {}
        }

        self.commands.run_check(&self.layout.gadget_load(&image))?;
        self.state.status = UsbStatus::Plugged;
        info!("USB stick plugged in with {}", image);
        Ok(())
    }

    /// Plug the stick out. Does nothing unless it is plugged in.
    pub fn plug_out(&mut self) -> StickResult<()> {
        if self.state.status != UsbStatus::Plugged {
            return Ok(());
        }

        self.commands.run_check(&self.layout.gadget_unload())?;
        self.state.status = UsbStatus::Unplugged;
        info!("USB stick plugged out");
        Ok(())
    }

    /// Copy `local` into the active image, at `destination` relative to its first partition.
    ///
    /// `destination` defaults to the file name of `local`.
    pub fn put_file(&mut self, local: &Path, destination: Option<&str>) -> StickResult<()> {
        self.state.require_unplugged()?;
        let destination = match destination.filter(|dest| !dest.is_empty()) {
            Some(dest) => dest.to_string(),
            None => file_name(local)?,
        };
        check_inside_image(&destination)?;

        let remote = self.layout.mounted_path(&destination);
        self.with_image_mounted(|transfer| transfer.put(local, &remote))?;
        info!("Put {} into image at {}", local.display(), destination);
        Ok(())
    }

    /// Copy `remote`, relative to the active image's first partition, out of the image.
    ///
    /// Returns the local path the file was written to; see [`FileTransferOps::get`] for where
    /// it lands when `local` is `None`.
    pub fn get_file(&mut self, remote: &str, local: Option<&Path>) -> StickResult<PathBuf> {
        self.state.require_unplugged()?;
        check_inside_image(remote)?;

        let source = self.layout.mounted_path(remote);
        let landed = self.with_image_mounted(|transfer| transfer.get(&source, local))?;
        info!("Got {} from image into {}", remote, landed.display());
        Ok(landed)
    }

    /// Attach the active image, mount its first partition, run `access`, then unmount and
    /// detach again.
    fn with_image_mounted<T>(
        &mut self,
        access: impl FnOnce(&F) -> HalResult<T>,
    ) -> StickResult<T> {
        let image = self.active_image_path()?;

        self.issue(&self.layout.loop_attach(&image))?;
        self.state.status = UsbStatus::Mounted;
        self.issue(&self.layout.mount_partition())?;

        let value = access(&self.transfer)?;

        self.issue(&self.layout.unmount())?;
        self.issue(&self.layout.loop_detach_all())?;
        self.state.status = UsbStatus::Unplugged;
        Ok(value)
    }

    fn issue(&self, cmd: &str) -> StickResult<()> {
        debug!("issuing: {}", cmd);
        self.commands.run_check(cmd)?;
        Ok(())
    }

    /// Upload a disk image into the image directory on the target.
    ///
    /// The image becomes available to [`UsbStick::switch_image`] under its file name, which is
    /// returned; it is not made active.
    pub fn upload_image(&mut self, local: &Path) -> StickResult<String> {
        self.state.require_unplugged()?;
        let name = file_name(local)?;

        self.transfer.put(local, &join_remote(&self.image_dir, &name))?;
        self.state.known_images.push(name.clone());
        info!("Uploaded image {}", name);
        Ok(name)
    }

    /// Make a previously uploaded image the active one.
    ///
    /// Releases any mount left behind by an interrupted file access first. Those cleanup
    /// commands are best-effort and their failures are ignored.
    pub fn switch_image(&mut self, name: &str) -> StickResult<()> {
        self.state.require_not_plugged()?;
        if !self.state.is_known(name) {
            return Err(StateError::UnknownImage(name.to_string()).into());
        }

        self.release_mount();
        self.state.status = UsbStatus::Unplugged;
        self.state.active_image = Some(name.to_string());
        info!("Switched to image {}", name);
        Ok(())
    }

    /// Release any mount and loop device left behind by an interrupted file access.
    ///
    /// Best-effort like the cleanup in [`UsbStick::switch_image`]; the active image is kept.
    pub fn cleanup(&mut self) -> StickResult<()> {
        self.state.require_not_plugged()?;

        self.release_mount();
        if self.state.status == UsbStatus::Mounted {
            info!("Released stale mount of {:?}", self.state.active_image);
        }
        self.state.status = UsbStatus::Unplugged;
        Ok(())
    }

    fn release_mount(&self) {
        for cmd in [self.layout.unmount(), self.layout.loop_detach_all()] {
            debug!("issuing (best-effort): {}", cmd);
            match self.commands.run(&cmd) {
                Ok(output) if !output.is_success() => {
                    debug!("ignoring exit {:?} of `{}`", output.code, cmd);
                }
                Ok(_) => {}
                Err(err) => warn!("ignoring failure of `{}`: {}", cmd, err),
            }
        }
    }
}

fn check_inside_image(relative: &str) -> StickResult<()> {
    if has_parent_component(relative) {
        return Err(StickError::InvalidPath(relative.to_string()));
    }
    Ok(())
}

fn file_name(path: &Path) -> StickResult<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(String::from)
        .ok_or_else(|| StickError::InvalidPath(path.display().to_string()))
}
