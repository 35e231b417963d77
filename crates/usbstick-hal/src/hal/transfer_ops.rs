//! File transfer between the harness and the target.

use crate::HalResult;
use std::path::{Path, PathBuf};

/// Moves files between a local path and a path on the target.
pub trait FileTransferOps {
    /// Copy `local` to `remote` on the target, replacing any existing file.
    fn put(&self, local: &Path, remote: &str) -> HalResult<()>;

    /// Copy `remote` from the target to `local`, returning where the file landed.
    ///
    /// With `local == None` the file is written to the current directory under the basename
    /// of `remote`.
    fn get(&self, remote: &str, local: Option<&Path>) -> HalResult<PathBuf>;
}
