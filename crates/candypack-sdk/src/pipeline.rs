//! The build, test, copy and pack pipeline.
//!
//! [`Pipeline::run_pack`] walks the layout's targets strictly in order:
//!
//! 1. **Build** - run the build tool on the target's solution, signing when
//!    the key file exists
//! 2. **Test** - run the test runner on the compiled test assembly
//! 3. **Copy** - copy the build outputs into `<output_dir>/<framework>/`
//!
//! Once every target has passed all three steps it reads the package version
//! and runs the packaging tool. The first failure stops the run; nothing is
//! retried or rolled back.

use crate::artifacts;
use crate::toolchain::{self, DryRunner, Invocation, ProcessRunner, SystemRunner, ToolExit};
use crate::types::{BuildTarget, PackError, PackLayout, PackReport, TargetReport};
use crate::version::{self, Version};
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Runs the pack pipeline over a [`PackLayout`].
///
/// # Example
///
/// ```ignore
/// use candypack_sdk::{PackLayout, Pipeline};
///
/// let layout = PackLayout::new("build");
/// let report = Pipeline::new(layout).dry_run(true).run_pack()?;
/// println!("would pack {}", report.version);
/// # Ok::<(), candypack_sdk::PackError>(())
/// ```
pub struct Pipeline<R = SystemRunner> {
    layout: PackLayout,
    runner: R,
    dry_run: bool,
}

impl Pipeline<SystemRunner> {
    /// Creates a pipeline that spawns the real tools.
    pub fn new(layout: PackLayout) -> Self {
        Self::with_runner(layout, SystemRunner)
    }
}

impl<R: ProcessRunner> Pipeline<R> {
    /// Creates a pipeline that runs tools through `runner`.
    pub fn with_runner(layout: PackLayout, runner: R) -> Self {
        Self {
            layout,
            runner,
            dry_run: false,
        }
    }

    /// Prints invocations and planned copies instead of performing them.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn layout(&self) -> &PackLayout {
        &self.layout
    }

    /// Builds, tests and copies every target, then packs.
    ///
    /// # Returns
    ///
    /// * `Ok(PackReport)` once the packaging tool succeeded
    /// * `Err(PackError)` for the first failing step
    pub fn run_pack(&self) -> Result<PackReport, PackError> {
        let signing_key = self.layout.signing_key();
        match &signing_key {
            Some(key) => tracing::info!(key = %key.display(), "signing enabled"),
            None => tracing::info!(
                key = %self.layout.resolve(&self.layout.sign_key).display(),
                "signing key not found, building unsigned"
            ),
        }

        let mut targets = Vec::with_capacity(self.layout.targets().len());
        for target in self.layout.targets() {
            println!("Building {} ({})...", target.solution, target.framework);
            self.build_target(target, signing_key.as_deref())?;

            println!("Testing {}...", target.framework);
            self.test_target(target)?;

            let output_dir = target.output_dir(&self.layout.output_dir);
            println!("Copying artifacts to {}...", output_dir.display());
            let copied = self.copy_artifacts(target)?;

            targets.push(TargetReport {
                solution: target.solution.clone(),
                framework: target.framework.clone(),
                artifacts: copied,
            });
        }

        let version_file = self.layout.resolve(&self.layout.version_file);
        let version = version::read_version(&version_file)?;

        println!("Packing version {}...", version);
        self.package(&version)?;

        Ok(PackReport {
            version: version.to_string(),
            signed: signing_key.is_some(),
            dry_run: self.dry_run,
            targets,
            finished_at: OffsetDateTime::now_utc()
                .format(&Rfc3339)
                .unwrap_or_else(|_| "unknown".to_string()),
        })
    }

    fn exec(&self, invocation: &Invocation) -> Result<ToolExit, PackError> {
        if self.dry_run {
            DryRunner.run(invocation)
        } else {
            self.runner.run(invocation)
        }
    }

    fn build_target(
        &self,
        target: &BuildTarget,
        signing_key: Option<&Path>,
    ) -> Result<(), PackError> {
        let invocation = toolchain::build_invocation(&self.layout, target, signing_key);
        let exit = self.exec(&invocation)?;
        if !exit.success() {
            tracing::error!(command = %invocation, code = ?exit.code(), "build failed");
            return Err(PackError::Build {
                solution: target.solution.clone(),
                code: exit.code(),
            });
        }
        Ok(())
    }

    fn test_target(&self, target: &BuildTarget) -> Result<(), PackError> {
        let invocation = toolchain::test_invocation(&self.layout);
        let exit = self.exec(&invocation)?;
        if !exit.success() {
            tracing::error!(command = %invocation, code = ?exit.code(), "tests failed");
            return Err(PackError::Test {
                solution: target.solution.clone(),
                code: exit.code(),
            });
        }
        Ok(())
    }

    fn copy_artifacts(&self, target: &BuildTarget) -> Result<Vec<PathBuf>, PackError> {
        let dest_dir = self.layout.resolve(&target.output_dir(&self.layout.output_dir));

        if self.dry_run {
            let mut planned = Vec::with_capacity(self.layout.artifacts.len());
            for artifact in &self.layout.artifacts {
                let src = self.layout.resolve(artifact);
                println!("  [dry-run] copy {} -> {}", src.display(), dest_dir.display());
                if let Some(name) = src.file_name() {
                    planned.push(dest_dir.join(name));
                }
            }
            return Ok(planned);
        }

        artifacts::ensure_dir(&dest_dir)?;
        self.layout
            .artifacts
            .iter()
            .map(|artifact| artifacts::copy_into(&self.layout.resolve(artifact), &dest_dir))
            .collect()
    }

    fn package(&self, version: &Version) -> Result<(), PackError> {
        let invocation = toolchain::package_invocation(&self.layout, version);
        let exit = self.exec(&invocation)?;
        if !exit.success() {
            tracing::error!(command = %invocation, code = ?exit.code(), "packaging failed");
            return Err(PackError::Package { code: exit.code() });
        }
        Ok(())
    }
}
