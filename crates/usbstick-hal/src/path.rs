//! Helpers for paths on the target, which are plain `/`-separated strings.

use std::path::{Path, PathBuf};

/// Join a target directory and a name with exactly one `/` between them.
pub fn join_remote(dir: &str, name: &str) -> String {
    let name = name.trim_start_matches('/');
    if dir.is_empty() {
        return name.to_string();
    }
    let dir = dir.trim_end_matches('/');
    format!("{}/{}", dir, name)
}

/// True when `relative` has a `..` component and could resolve outside the directory it is
/// joined onto.
pub fn has_parent_component(relative: &str) -> bool {
    relative.split('/').any(|component| component == "..")
}

/// Last component of a target path, ignoring trailing slashes.
pub fn remote_basename(remote: &str) -> Option<&str> {
    remote
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
}

/// Where a retrieved file lands when the caller does not name a destination.
pub fn default_local_destination(remote: &str) -> Option<PathBuf> {
    remote_basename(remote).map(|name| Path::new(".").join(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_inserts_single_separator() {
        assert_eq!(join_remote("/images", "foo.img"), "/images/foo.img");
        assert_eq!(join_remote("/images/", "foo.img"), "/images/foo.img");
        assert_eq!(join_remote("/images//", "/foo.img"), "/images/foo.img");
        assert_eq!(join_remote("/mnt/", "dir/dest.txt"), "/mnt/dir/dest.txt");
    }

    #[test]
    fn join_keeps_root() {
        assert_eq!(join_remote("/", "foo.img"), "/foo.img");
        assert_eq!(join_remote("", "foo.img"), "foo.img");
    }

    #[test]
    fn parent_components() {
        assert!(has_parent_component(".."));
        assert!(has_parent_component("../etc/shadow"));
        assert!(has_parent_component("logs/../../boot"));
        assert!(!has_parent_component("logs/boot.log"));
        assert!(!has_parent_component("..hidden/file"));
        assert!(!has_parent_component("./a.txt"));
    }

    #[test]
    fn basename_of_remote_paths() {
        assert_eq!(remote_basename("/mnt/logs/boot.log"), Some("boot.log"));
        assert_eq!(remote_basename("boot.log"), Some("boot.log"));
        assert_eq!(remote_basename("/mnt/logs/"), Some("logs"));
        assert_eq!(remote_basename("/"), None);
        assert_eq!(remote_basename(".."), None);
    }

    #[test]
    fn default_destination_is_cwd() {
        assert_eq!(
            default_local_destination("/mnt/a/b.txt"),
            Some(PathBuf::from("./b.txt"))
        );
        assert_eq!(default_local_destination(""), None);
    }
}
