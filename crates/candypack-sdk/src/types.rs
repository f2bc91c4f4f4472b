//! Core types for candypack-sdk.
//!
//! This module defines the fundamental types used throughout the SDK:
//!
//! - [`PackError`] - Error types for pipeline steps, version extraction and artifact copies
//! - [`BuildTarget`] - A (solution, framework) pair the pipeline builds
//! - [`Toolset`] - Names or paths of the external build, test and packaging tools
//! - [`PackLayout`] - Every fixed path and flag the pipeline reads
//! - [`PackReport`] / [`TargetReport`] - Output from a successful run

use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};

/// Error types for candypack-sdk operations.
///
/// The first three variants are *step failures*: an external tool ran and
/// exited non-zero. Their `Display` output is the one-line diagnostic the
/// CLI prints before exiting with status 1.
///
/// # Example
///
/// ```ignore
/// use candypack_sdk::{PackError, Pipeline};
///
/// match pipeline.run_pack() {
///     Ok(report) => println!("Packed {}", report.version),
///     Err(err) if err.is_step_failure() => println!("[!] {}", err),
///     Err(err) => eprintln!("error: {}", err),
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum PackError {
    /// The build tool exited non-zero for a target.
    #[error("Cannot build {solution}")]
    Build {
        solution: String,
        code: Option<i32>,
    },

    /// The test runner exited non-zero after a target was built.
    #[error("Cannot run tests for {solution}")]
    Test {
        solution: String,
        code: Option<i32>,
    },

    /// The packaging tool exited non-zero.
    #[error("Cannot make package")]
    Package { code: Option<i32> },

    /// An external tool could not be started at all.
    #[error("failed to start {tool}: {source}. Ensure the tool is installed and available on PATH")]
    Spawn {
        tool: String,
        #[source]
        source: io::Error,
    },

    /// The version file holds no `AssemblyVersion("x.y.z.w")` declaration.
    #[error(
        "no AssemblyVersion(\"major.minor.patch.revision\") declaration found in {}",
        path.display()
    )]
    VersionNotFound { path: PathBuf },

    /// Creating a target's output directory failed.
    #[error("failed to create output directory {}: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Copying an artifact failed.
    #[error("failed to copy artifact {}: {source}", path.display())]
    Artifact {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Reading an input file failed.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The layout is unusable, e.g. it has no targets.
    #[error("configuration error: {0}")]
    Config(String),
}

impl PackError {
    /// Returns `true` when an external tool ran and reported failure.
    pub fn is_step_failure(&self) -> bool {
        matches!(
            self,
            PackError::Build { .. } | PackError::Test { .. } | PackError::Package { .. }
        )
    }

    /// Exit code reported by the failing tool, if it exited normally.
    pub fn tool_exit_code(&self) -> Option<i32> {
        match self {
            PackError::Build { code, .. }
            | PackError::Test { code, .. }
            | PackError::Package { code } => *code,
            _ => None,
        }
    }
}

/// A single build target: the solution to compile and the framework
/// moniker naming its output subdirectory.
///
/// # Example
///
/// ```
/// use candypack_sdk::BuildTarget;
/// use std::path::Path;
///
/// let target = BuildTarget::new("../src/Candy.netfx45.sln", "net45");
/// assert_eq!(target.output_dir(Path::new("lib")), Path::new("lib/net45"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildTarget {
    /// Solution or project file handed to the build tool.
    pub solution: String,
    /// Framework moniker, e.g. `net35`.
    pub framework: String,
}

impl BuildTarget {
    pub fn new(solution: impl Into<String>, framework: impl Into<String>) -> Self {
        Self {
            solution: solution.into(),
            framework: framework.into(),
        }
    }

    /// Directory this target's artifacts are copied into.
    pub fn output_dir(&self, base: &Path) -> PathBuf {
        base.join(&self.framework)
    }
}

/// The three framework targets the Candy library ships for.
pub fn default_targets() -> Vec<BuildTarget> {
    vec![
        BuildTarget::new("../src/Candy.netfx35.sln", "net35"),
        BuildTarget::new("../src/Candy.netfx40.sln", "net40"),
        BuildTarget::new("../src/Candy.netfx45.sln", "net45"),
    ]
}

/// External tools the pipeline drives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolset {
    /// Build tool, invoked once per target.
    pub build: String,
    /// Test runner, invoked once per target after a successful build.
    pub test: String,
    /// Packaging tool, invoked once after every target succeeded.
    pub package: String,
}

impl Default for Toolset {
    fn default() -> Self {
        Self {
            build: "msbuild".to_string(),
            test: "nunit-console".to_string(),
            package: "../src/.nuget/nuget".to_string(),
        }
    }
}

/// Every path, flag and tool the pipeline reads.
///
/// Relative paths resolve against [`PackLayout::root`], which is also the
/// working directory of every spawned tool. The target list is never empty.
#[derive(Debug, Clone)]
pub struct PackLayout {
    /// Directory relative paths resolve against.
    pub root: PathBuf,
    pub tools: Toolset,
    /// Build configuration, passed as `/p:Configuration=...`.
    pub configuration: String,
    /// Build platform, passed as `/p:Platform=...`.
    pub platform: String,
    /// Strong-name key; signing is enabled only when this file exists.
    pub sign_key: PathBuf,
    /// Compiled test assembly handed to the test runner.
    pub test_assembly: PathBuf,
    /// Build outputs copied into each target's output directory.
    pub artifacts: Vec<PathBuf>,
    /// Base of the per-target output tree (`lib`).
    pub output_dir: PathBuf,
    /// Source file carrying the `AssemblyVersion` attribute.
    pub version_file: PathBuf,
    /// Package manifest handed to the packaging tool.
    pub manifest: PathBuf,
    targets: Vec<BuildTarget>,
}

impl PackLayout {
    /// Creates a layout with the Candy defaults rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            tools: Toolset::default(),
            configuration: "Release".to_string(),
            platform: "Any CPU".to_string(),
            sign_key: PathBuf::from("candy.snk"),
            test_assembly: PathBuf::from("../src/Candy.Tests/bin/Release/Candy.Tests.dll"),
            artifacts: vec![
                PathBuf::from("../src/Candy/bin/Release/Candy.dll"),
                PathBuf::from("../src/Candy/bin/Release/Candy.xml"),
            ],
            output_dir: PathBuf::from("lib"),
            version_file: PathBuf::from("../src/Candy/Properties/AssemblyInfo.cs"),
            manifest: PathBuf::from("Candy.nuspec"),
            targets: default_targets(),
        }
    }

    /// Replaces the target list.
    ///
    /// # Returns
    ///
    /// * `Err(PackError::Config)` if `targets` is empty
    pub fn with_targets(mut self, targets: Vec<BuildTarget>) -> Result<Self, PackError> {
        if targets.is_empty() {
            return Err(PackError::Config(
                "at least one build target is required".to_string(),
            ));
        }
        self.targets = targets;
        Ok(self)
    }

    /// Targets in build order.
    pub fn targets(&self) -> &[BuildTarget] {
        &self.targets
    }

    /// Resolves `path` against the root; absolute paths are returned as-is.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }

    /// Absolute path of the signing key, if the key file exists.
    pub fn signing_key(&self) -> Option<PathBuf> {
        let path = self.resolve(&self.sign_key);
        if path.is_file() {
            Some(std::path::absolute(&path).unwrap_or(path))
        } else {
            None
        }
    }
}

/// Artifacts produced for one target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetReport {
    pub solution: String,
    pub framework: String,
    /// Copied files, as written under the output directory.
    pub artifacts: Vec<PathBuf>,
}

/// Result of a successful [`run_pack`](crate::Pipeline::run_pack).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackReport {
    /// Version handed to the packaging tool.
    pub version: String,
    /// Whether the build step signed the assemblies.
    pub signed: bool,
    /// `true` when nothing was executed or written.
    pub dry_run: bool,
    pub targets: Vec<TargetReport>,
    /// RFC 3339 completion time.
    pub finished_at: String,
}
