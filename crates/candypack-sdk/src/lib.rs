//! Release pipeline for multi-framework .NET libraries.
//!
//! `candypack-sdk` drives the external build tool, test runner and packaging
//! tool that turn a library's solutions into one versioned NuGet package.
//!
//! # Pipeline
//!
//! For every [`BuildTarget`], in order:
//!
//! 1. build the target's solution (signed when the key file exists)
//! 2. run the test assembly
//! 3. copy the build outputs into `lib/<framework>/`
//!
//! Then read `major.minor.patch` from the `AssemblyVersion` attribute and
//! pack. The first failing step aborts the run.
//!
//! # Example
//!
//! ```ignore
//! use candypack_sdk::{PackLayout, Pipeline};
//!
//! fn main() -> Result<(), candypack_sdk::PackError> {
//!     let layout = PackLayout::new("build");
//!     let report = Pipeline::new(layout).run_pack()?;
//!     println!("packed {} for {} targets", report.version, report.targets.len());
//!     Ok(())
//! }
//! ```
//!
//! # Testing without tools
//!
//! Every process goes through the [`ProcessRunner`] trait, so a pipeline can be
//! driven by a fake runner via [`Pipeline::with_runner`].

pub mod artifacts;
pub mod pipeline;
pub mod toolchain;
pub mod types;
pub mod version;

pub use pipeline::Pipeline;
pub use toolchain::{DryRunner, Invocation, ProcessRunner, SystemRunner, ToolExit};
pub use types::{
    BuildTarget, PackError, PackLayout, PackReport, TargetReport, Toolset, default_targets,
};
pub use version::{Version, extract_version, read_version};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
