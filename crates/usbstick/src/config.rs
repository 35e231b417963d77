//! TOML configuration for a stick and the transport used to reach its board.
//!
//! ```toml
//! image_dir = "/images/"
//!
//! [layout]
//! mount_point = "/mnt/"
//!
//! [transport]
//! kind = "ssh"
//! host = "riotboard"
//! user = "root"
//! ```

use crate::commands::TargetLayout;
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    #[default]
    Ssh,
    Local,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    pub kind: TransportKind,
    pub host: Option<String>,
    pub user: Option<String>,
    pub port: u16,
    pub command_timeout_secs: u64,
    pub transfer_timeout_secs: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            kind: TransportKind::Ssh,
            host: None,
            user: None,
            port: 22,
            command_timeout_secs: 60,
            transfer_timeout_secs: 600,
        }
    }
}

impl TransportConfig {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    pub fn transfer_timeout(&self) -> Duration {
        Duration::from_secs(self.transfer_timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StickConfig {
    /// Directory on the target holding the disk images.
    pub image_dir: String,
    #[serde(default)]
    pub layout: TargetLayout,
    #[serde(default)]
    pub transport: TransportConfig,
}

impl StickConfig {
    /// Parse without validating, so command-line overrides can fill gaps before
    /// [`StickConfig::validate`] runs.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Full validation, including what is needed to reach the target.
    pub fn validate(&self) -> Result<()> {
        self.validate_layout()?;
        if self.transport.kind == TransportKind::Ssh && self.transport.host.is_none() {
            bail!("transport.host is required for ssh transport");
        }
        Ok(())
    }

    /// Validation of everything except the transport endpoint.
    pub fn validate_layout(&self) -> Result<()> {
        if self.image_dir.trim().is_empty() {
            bail!("image_dir must not be empty");
        }
        if self.layout.mount_point.trim().is_empty() {
            bail!("layout.mount_point must not be empty");
        }
        if self.transport.command_timeout_secs == 0 || self.transport.transfer_timeout_secs == 0 {
            bail!("transport timeouts must be greater than zero");
        }
        Ok(())
    }
}
