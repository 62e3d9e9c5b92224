// ── Profile directory ──
//
// The configuration list is derived from the directory on every call.
// Nothing is cached, so a rename is visible to the next reader.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::CoreError;
use crate::model::ProfileName;

const PROFILE_EXTENSION: &str = "conf";

/// Scan `dir` for `*.conf` files and return their identifiers, sorted.
///
/// A missing or unreadable directory yields an empty list.
pub fn list_profiles(dir: &Path) -> Vec<ProfileName> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!(dir = %dir.display(), error = %e, "profile directory unreadable");
            return Vec::new();
        }
    };

    let mut names: Vec<ProfileName> = entries
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file() || t.is_symlink()))
        .filter_map(|entry| {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(PROFILE_EXTENSION) {
                return None;
            }
            let stem = path.file_stem()?.to_str()?;
            match ProfileName::new(stem) {
                Ok(name) => Some(name),
                Err(e) => {
                    debug!(file = %path.display(), error = %e, "skipping profile");
                    None
                }
            }
        })
        .collect();

    names.sort();
    names
}

/// Full path of a profile's configuration file.
pub fn profile_path(dir: &Path, name: &ProfileName) -> PathBuf {
    dir.join(name.file_name())
}

/// Path of an existing profile, or `ProfileNotFound`.
pub fn existing_profile_path(dir: &Path, name: &ProfileName) -> Result<PathBuf, CoreError> {
    let path = profile_path(dir, name);
    if path.is_file() {
        Ok(path)
    } else {
        Err(CoreError::ProfileNotFound {
            name: name.to_string(),
            path,
        })
    }
}

/// Rename `old.conf` to `new.conf` inside `dir`.
///
/// Refuses to overwrite an existing profile.
pub fn rename_profile(dir: &Path, old: &ProfileName, new: &str) -> Result<ProfileName, CoreError> {
    let new = ProfileName::new(new.trim())?;
    let from = existing_profile_path(dir, old)?;
    let to = profile_path(dir, &new);

    if old == &new {
        return Ok(new);
    }
    if to.exists() {
        return Err(CoreError::ProfileExists {
            name: new.to_string(),
        });
    }

    std::fs::rename(&from, &to).map_err(|e| CoreError::io(&from, e))?;
    debug!(from = %old, to = %new, "renamed profile");
    Ok(new)
}

/// Create the profile directory if it does not exist yet.
pub fn ensure_profiles_dir(dir: &Path) -> Result<(), CoreError> {
    std::fs::create_dir_all(dir).map_err(|e| CoreError::io(dir, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), "[Interface]\n").expect("write fixture");
    }

    fn names(list: &[ProfileName]) -> Vec<&str> {
        list.iter().map(ProfileName::as_str).collect()
    }

    #[test]
    fn lists_conf_files_sorted() {
        let dir = tempfile::tempdir().expect("tempdir");
        // Created out of order on purpose.
        touch(dir.path(), "b.conf");
        touch(dir.path(), "wg1.conf");
        touch(dir.path(), "a.conf");
        touch(dir.path(), "wg0.conf");

        assert_eq!(names(&list_profiles(dir.path())), ["a", "b", "wg0", "wg1"]);
    }

    #[test]
    fn ignores_other_files_and_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        touch(dir.path(), "a.conf");
        touch(dir.path(), "notes.txt");
        touch(dir.path(), "b.conf.bak");
        touch(dir.path(), "way-too-long-profile-name.conf");
        std::fs::create_dir(dir.path().join("nested.conf")).expect("mkdir");

        assert_eq!(names(&list_profiles(dir.path())), ["a"]);
    }

    #[test]
    fn missing_directory_is_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(list_profiles(&dir.path().join("absent")).is_empty());
    }

    #[test]
    fn rename_moves_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        touch(dir.path(), "old.conf");
        let old = ProfileName::new("old").expect("valid");

        let new = rename_profile(dir.path(), &old, "new").expect("rename");

        assert_eq!(new.as_str(), "new");
        assert!(dir.path().join("new.conf").is_file());
        assert!(!dir.path().join("old.conf").exists());
        assert_eq!(names(&list_profiles(dir.path())), ["new"]);
    }

    #[test]
    fn rename_refuses_to_overwrite() {
        let dir = tempfile::tempdir().expect("tempdir");
        touch(dir.path(), "a.conf");
        touch(dir.path(), "b.conf");
        let a = ProfileName::new("a").expect("valid");

        let err = rename_profile(dir.path(), &a, "b").expect_err("must fail");
        assert!(matches!(err, CoreError::ProfileExists { .. }), "{err:?}");
        assert!(dir.path().join("a.conf").is_file());
    }

    #[test]
    fn rename_missing_source() {
        let dir = tempfile::tempdir().expect("tempdir");
        let ghost = ProfileName::new("ghost").expect("valid");

        let err = rename_profile(dir.path(), &ghost, "real").expect_err("must fail");
        assert!(matches!(err, CoreError::ProfileNotFound { .. }), "{err:?}");
    }

    #[test]
    fn rename_rejects_invalid_target() {
        let dir = tempfile::tempdir().expect("tempdir");
        touch(dir.path(), "a.conf");
        let a = ProfileName::new("a").expect("valid");

        let err = rename_profile(dir.path(), &a, "bad name").expect_err("must fail");
        assert!(matches!(err, CoreError::InvalidProfileName { .. }), "{err:?}");
    }

    #[test]
    fn ensure_creates_nested_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        let target = dir.path().join("x").join("vpn-configs");
        ensure_profiles_dir(&target).expect("create");
        assert!(target.is_dir());
    }
}
