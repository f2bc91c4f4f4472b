//! Package version extraction.
//!
//! The package version comes from the library's `AssemblyInfo.cs`:
//!
//! ```text
//! [assembly: AssemblyVersion("0.5.0.0")]
//! ```
//!
//! Only the leading `major.minor.patch` is used; the fourth (revision)
//! component is dropped. A file without such a declaration is a hard error.

use crate::types::PackError;
use regex::Regex;
use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

static ASSEMBLY_VERSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    // AssemblyVersion("1.2.3.4"), capturing the first three components
    Regex::new(r#"AssemblyVersion\("(\d+)\.(\d+)\.(\d+)\.\d+"\)"#)
        .expect("AssemblyVersion pattern is valid")
});

/// A `major.minor.patch` package version.
///
/// Components keep the digits exactly as declared, leading zeros included.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version {
    pub major: String,
    pub minor: String,
    pub patch: String,
}

impl Version {
    pub fn new(
        major: impl Into<String>,
        minor: impl Into<String>,
        patch: impl Into<String>,
    ) -> Self {
        Self {
            major: major.into(),
            minor: minor.into(),
            patch: patch.into(),
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Extracts the package version from the first `AssemblyVersion("a.b.c.d")`
/// declaration in `content`.
///
/// Returns `None` when there is no four-part declaration.
pub fn extract_version(content: &str) -> Option<Version> {
    let caps = ASSEMBLY_VERSION_PATTERN.captures(content)?;
    Some(Version::new(&caps[1], &caps[2], &caps[3]))
}

/// Reads `path` and extracts its package version.
///
/// # Returns
///
/// * `Err(PackError::Io)` if the file cannot be read
/// * `Err(PackError::VersionNotFound)` if it declares no assembly version
pub fn read_version(path: &Path) -> Result<Version, PackError> {
    let content = std::fs::read_to_string(path).map_err(|source| PackError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let version = extract_version(&content).ok_or_else(|| PackError::VersionNotFound {
        path: path.to_path_buf(),
    })?;
    tracing::debug!(%version, file = %path.display(), "extracted package version");
    Ok(version)
}
