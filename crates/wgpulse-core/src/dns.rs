// ── DNS directive patch ──
//
// Comments out `DNS = ...` lines in a WireGuard profile so that
// `wg-quick` leaves the system resolver alone. Every other byte of the
// file is preserved, including line endings.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::CoreError;

const COMMENT_PREFIX: &str = "# ";

/// What a patch run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DnsPatch {
    /// Number of lines that were commented out.
    pub commented: usize,
}

impl DnsPatch {
    pub fn changed(self) -> bool {
        self.commented > 0
    }
}

/// True for lines matching `^\s*DNS\s*=`, case-insensitively.
fn is_dns_directive(line: &str) -> bool {
    let rest = line.trim_start();
    let Some(head) = rest.get(..3) else {
        return false;
    };
    head.eq_ignore_ascii_case("dns") && rest[3..].trim_start().starts_with('=')
}

/// Comment out DNS directives in `content`.
///
/// Returns `None` when nothing matched.
pub fn patch_dns_content(content: &str) -> Option<(String, usize)> {
    let mut out = String::with_capacity(content.len() + 16);
    let mut commented = 0;
    for line in content.split_inclusive('\n') {
        if is_dns_directive(line) {
            out.push_str(COMMENT_PREFIX);
            commented += 1;
        }
        out.push_str(line);
    }
    (commented > 0).then_some((out, commented))
}

/// Patch the profile at `path` in place.
///
/// The file is rewritten only when a line changed, and the new content
/// is fully written to a sibling file before replacing the original.
/// A symlinked profile is patched at its target; the link stays.
pub fn patch_dns(path: &Path) -> Result<DnsPatch, CoreError> {
    let target = std::fs::canonicalize(path).map_err(|e| CoreError::io(path, e))?;
    let path = target.as_path();
    let content = std::fs::read_to_string(path).map_err(|e| CoreError::io(path, e))?;

    let Some((patched, commented)) = patch_dns_content(&content) else {
        debug!(file = %path.display(), "no DNS directives to patch");
        return Ok(DnsPatch::default());
    };

    replace_file(path, &patched)?;
    debug!(file = %path.display(), commented, "patched DNS directives");
    Ok(DnsPatch { commented })
}

fn replace_file(path: &Path, content: &str) -> Result<(), CoreError> {
    let tmp = sibling_temp_path(path);
    write_and_swap(path, &tmp, content).map_err(|e| {
        let _ = std::fs::remove_file(&tmp);
        CoreError::io(path, e)
    })
}

fn write_and_swap(path: &Path, tmp: &Path, content: &str) -> std::io::Result<()> {
    std::fs::write(tmp, content)?;
    let perms = std::fs::metadata(path)?.permissions();
    std::fs::set_permissions(tmp, perms)?;
    std::fs::rename(tmp, path)
}

fn sibling_temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.wgpulse-tmp"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PROFILE: &str = "\
[Interface]
PrivateKey = abc
Address = 10.0.0.2/32
DNS = 1.1.1.1
  dns=9.9.9.9

[Peer]
PublicKey = xyz
";

    #[test]
    fn matches_directive_variants() {
        assert!(is_dns_directive("DNS = 1.1.1.1"));
        assert!(is_dns_directive("dns = 1.1.1.1"));
        assert!(is_dns_directive("DNS=1.1.1.1"));
        assert!(is_dns_directive("\t Dns\t= 1.1.1.1\n"));
        assert!(!is_dns_directive("; DNS=1.1.1.1"));
        assert!(!is_dns_directive("# DNS = 1.1.1.1"));
        assert!(!is_dns_directive("DNSServer = 1.1.1.1"));
        assert!(!is_dns_directive("Address = 10.0.0.2/32"));
        assert!(!is_dns_directive("dn"));
    }

    #[test]
    fn comments_only_dns_lines() {
        let (out, n) = patch_dns_content(PROFILE).expect("changed");
        assert_eq!(n, 2);
        assert_eq!(
            out,
            "\
[Interface]
PrivateKey = abc
Address = 10.0.0.2/32
# DNS = 1.1.1.1
#   dns=9.9.9.9

[Peer]
PublicKey = xyz
"
        );
    }

    #[test]
    fn preserves_crlf_and_missing_trailing_newline() {
        let (out, _) = patch_dns_content("a = 1\r\nDNS = 1.1.1.1").expect("changed");
        assert_eq!(out, "a = 1\r\n# DNS = 1.1.1.1");
    }

    #[test]
    fn patch_is_idempotent_on_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("wg0.conf");
        std::fs::write(&path, PROFILE).expect("write");

        let first = patch_dns(&path).expect("first patch");
        assert!(first.changed());
        let once = std::fs::read_to_string(&path).expect("read");

        let second = patch_dns(&path).expect("second patch");
        assert!(!second.changed());
        assert_eq!(std::fs::read_to_string(&path).expect("read"), once);
    }

    #[test]
    fn already_commented_file_is_untouched() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("wg0.conf");
        std::fs::write(&path, "; DNS=1.1.1.1\n").expect("write");

        assert_eq!(patch_dns(&path).expect("patch"), DnsPatch::default());
        assert_eq!(std::fs::read_to_string(&path).expect("read"), "; DNS=1.1.1.1\n");
        assert!(!sibling_temp_path(&path).exists());
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_profile_is_patched_at_its_target() {
        let dir = tempfile::tempdir().expect("tempdir");
        let target = dir.path().join("real-wg0.conf.txt");
        let link = dir.path().join("wg0.conf");
        std::fs::write(&target, "[Interface]\nDNS = 1.1.1.1\n").expect("write");
        std::os::unix::fs::symlink(&target, &link).expect("symlink");

        let patch = patch_dns(&link).expect("patch");
        assert_eq!(patch.commented, 1);

        let meta = std::fs::symlink_metadata(&link).expect("lstat");
        assert!(meta.file_type().is_symlink());
        assert_eq!(
            std::fs::read_to_string(&target).expect("read"),
            "[Interface]\n# DNS = 1.1.1.1\n"
        );
        assert_eq!(
            crate::profiles::list_profiles(dir.path()),
            vec![crate::ProfileName::new("wg0").expect("valid")]
        );
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = patch_dns(&dir.path().join("absent.conf")).expect_err("must fail");
        assert!(matches!(err, CoreError::Io { .. }), "{err:?}");
    }
}
