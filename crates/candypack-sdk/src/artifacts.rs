//! Per-target artifact layout.
//!
//! Each target's build outputs land in `<output_dir>/<framework>/`:
//!
//! ```text
//! lib/
//! ├── net35/
//! │   ├── Candy.dll
//! │   └── Candy.xml
//! ├── net40/
//! └── net45/
//! ```

use crate::types::PackError;
use std::fs;
use std::path::{Path, PathBuf};

/// Creates `dir` and any missing parents. Succeeds if it already exists.
pub fn ensure_dir(dir: &Path) -> Result<(), PackError> {
    fs::create_dir_all(dir).map_err(|source| PackError::OutputDir {
        path: dir.to_path_buf(),
        source,
    })
}

/// Copies `src` into `dest_dir` under its own file name, overwriting any
/// existing copy. Returns the destination path.
pub fn copy_into(src: &Path, dest_dir: &Path) -> Result<PathBuf, PackError> {
    let file_name = src.file_name().ok_or_else(|| {
        PackError::Config(format!("artifact path has no file name: {}", src.display()))
    })?;
    let dest = dest_dir.join(file_name);

    fs::copy(src, &dest).map_err(|source| PackError::Artifact {
        path: src.to_path_buf(),
        source,
    })?;
    tracing::debug!(from = %src.display(), to = %dest.display(), "copied artifact");
    Ok(dest)
}
