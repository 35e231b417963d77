//! Steps accepted on the command line.

use anyhow::{bail, Result};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Upload(PathBuf),
    Switch(String),
    PlugIn,
    PlugOut,
    Put {
        local: PathBuf,
        destination: Option<String>,
    },
    Get {
        remote: String,
        local: Option<PathBuf>,
    },
    Cleanup,
    Status,
}

fn split_pair(value: &str) -> (&str, Option<&str>) {
    match value.split_once(':') {
        Some((first, second)) if !second.is_empty() => (first, Some(second)),
        Some((first, _)) => (first, None),
        None => (value, None),
    }
}

impl FromStr for Step {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (verb, value) = match s.split_once('=') {
            Some((verb, value)) => (verb, Some(value)),
            None => (s, None),
        };

        let step = match (verb, value) {
            ("plug-in", None) => Step::PlugIn,
            ("plug-out", None) => Step::PlugOut,
            ("cleanup", None) => Step::Cleanup,
            ("status", None) => Step::Status,
            ("upload", Some(path)) if !path.is_empty() => Step::Upload(PathBuf::from(path)),
            ("switch", Some(name)) if !name.is_empty() => Step::Switch(name.to_string()),
            ("put", Some(value)) if !split_pair(value).0.is_empty() => {
                let (local, destination) = split_pair(value);
                Step::Put {
                    local: PathBuf::from(local),
                    destination: destination.map(String::from),
                }
            }
            ("get", Some(value)) if !split_pair(value).0.is_empty() => {
                let (remote, local) = split_pair(value);
                Step::Get {
                    remote: remote.to_string(),
                    local: local.map(PathBuf::from),
                }
            }
            _ => bail!(
                "invalid step '{}' (expected upload=PATH, switch=NAME, plug-in, plug-out, \
                 put=LOCAL[:DEST], get=REMOTE[:LOCAL], cleanup or status)",
                s
            ),
        };
        Ok(step)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Upload(path) => write!(f, "upload={}", path.display()),
            Step::Switch(name) => write!(f, "switch={}", name),
            Step::PlugIn => write!(f, "plug-in"),
            Step::PlugOut => write!(f, "plug-out"),
            Step::Put { local, destination } => match destination {
                Some(dest) => write!(f, "put={}:{}", local.display(), dest),
                None => write!(f, "put={}", local.display()),
            },
            Step::Get { remote, local } => match local {
                Some(local) => write!(f, "get={}:{}", remote, local.display()),
                None => write!(f, "get={}", remote),
            },
            Step::Cleanup => write!(f, "cleanup"),
            Step::Status => write!(f, "status"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_steps() {
        assert_eq!("plug-in".parse::<Step>().unwrap(), Step::PlugIn);
        assert_eq!("plug-out".parse::<Step>().unwrap(), Step::PlugOut);
        assert_eq!("cleanup".parse::<Step>().unwrap(), Step::Cleanup);
    }

    #[test]
    fn parses_steps_with_values() {
        assert_eq!(
            "upload=build/foo.img".parse::<Step>().unwrap(),
            Step::Upload(PathBuf::from("build/foo.img"))
        );
        assert_eq!(
            "put=local.txt:dest.txt".parse::<Step>().unwrap(),
            Step::Put {
                local: PathBuf::from("local.txt"),
                destination: Some("dest.txt".to_string()),
            }
        );
        assert_eq!(
            "get=logs/boot.log".parse::<Step>().unwrap(),
            Step::Get {
                remote: "logs/boot.log".to_string(),
                local: None,
            }
        );
    }

    #[test]
    fn rejects_malformed_steps() {
        for bad in ["plug-in=foo", "upload", "upload=", "switch=", "unplug", "put=:x"] {
            assert!(bad.parse::<Step>().is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn display_matches_input() {
        for input in ["put=a.txt:b/c.txt", "get=x.log", "switch=foo.img", "status"] {
            assert_eq!(input.parse::<Step>().unwrap().to_string(), input);
        }
    }
}
