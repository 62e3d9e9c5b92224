// ── Profile identity ──
//
// A ProfileName is the base name of a `*.conf` file. The same string is
// handed to wg-quick, which turns it into the kernel interface name, so
// it must obey the interface naming rules wg-quick enforces.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Longest interface name the kernel accepts (IFNAMSIZ - 1).
pub const MAX_PROFILE_NAME_LEN: usize = 15;

/// Validated configuration identifier.
///
/// Ordering is plain byte-wise lexicographic, which is the order the
/// reconciliation loop uses to pick the first matching tunnel.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProfileName(String);

impl ProfileName {
    pub fn new(name: impl Into<String>) -> Result<Self, CoreError> {
        let name = name.into();
        validate(&name).map_err(|reason| CoreError::InvalidProfileName {
            name: name.clone(),
            reason: reason.into(),
        })?;
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name of the profile inside the configuration directory.
    pub fn file_name(&self) -> String {
        format!("{}.conf", self.0)
    }
}

fn validate(name: &str) -> Result<(), &'static str> {
    if name.is_empty() {
        return Err("name is empty");
    }
    if name.len() > MAX_PROFILE_NAME_LEN {
        return Err("name is longer than 15 characters");
    }
    if !name
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'=' | b'+' | b'.' | b'-'))
    {
        return Err("only letters, digits and _=+.- are allowed");
    }
    if name == "." || name == ".." {
        return Err("name is reserved");
    }
    Ok(())
}

impl fmt::Display for ProfileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ProfileName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for ProfileName {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ProfileName {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<ProfileName> for String {
    fn from(p: ProfileName) -> Self {
        p.0
    }
}
