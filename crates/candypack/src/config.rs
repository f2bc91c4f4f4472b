//! Configuration file support for candypack.
//!
//! An optional `candypack.toml` overrides any part of the pack layout. Every
//! field is optional; anything left out keeps the Candy default.
//!
//! ## Configuration File Location
//!
//! 1. The path given with `--config`
//! 2. `./candypack.toml`, then each parent directory up to the repository
//!    root (a directory containing `.git`) or the filesystem root
//!
//! Relative paths in the file resolve against the directory that holds it.
//! Without a config file they resolve against the working directory.
//!
//! ## Example Configuration
//!
//! ```toml
//! [project]
//! output_dir = "lib"
//! version_file = "../src/Candy/Properties/AssemblyInfo.cs"
//! manifest = "Candy.nuspec"
//! sign_key = "candy.snk"
//!
//! [tools]
//! build = "msbuild"
//! test = "nunit-console"
//! package = "../src/.nuget/nuget"
//!
//! [build]
//! configuration = "Release"
//! platform = "Any CPU"
//! test_assembly = "../src/Candy.Tests/bin/Release/Candy.Tests.dll"
//! artifacts = ["../src/Candy/bin/Release/Candy.dll", "../src/Candy/bin/Release/Candy.xml"]
//!
//! [[targets]]
//! solution = "../src/Candy.netfx45.sln"
//! framework = "net45"
//! ```

use anyhow::{Context, Result};
use candypack_sdk::{BuildTarget, PackLayout};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// The default configuration file name.
pub const CONFIG_FILE_NAME: &str = "candypack.toml";

/// Root configuration structure for `candypack.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CandypackConfig {
    /// Output tree, version source, manifest and signing key.
    pub project: ProjectConfig,

    /// External tool names or paths.
    pub tools: ToolsConfig,

    /// Build switches and build outputs.
    pub build: BuildConfig,

    /// Replaces the default target list when present. Must not be empty.
    pub targets: Option<Vec<BuildTarget>>,
}

/// Project-level paths.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    /// Base of the per-target output tree. Defaults to `lib`.
    pub output_dir: Option<PathBuf>,

    /// File holding the `AssemblyVersion` attribute.
    pub version_file: Option<PathBuf>,

    /// Package manifest handed to the packaging tool.
    pub manifest: Option<PathBuf>,

    /// Strong-name key file. Signing happens only when it exists.
    pub sign_key: Option<PathBuf>,
}

/// External tools.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolsConfig {
    pub build: Option<String>,
    pub test: Option<String>,
    pub package: Option<String>,
}

/// Build switches and outputs.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Defaults to `Release`.
    pub configuration: Option<String>,

    /// Defaults to `Any CPU`.
    pub platform: Option<String>,

    /// Compiled test assembly handed to the test runner.
    pub test_assembly: Option<PathBuf>,

    /// Files copied into every target's output directory.
    pub artifacts: Option<Vec<PathBuf>>,
}

impl CandypackConfig {
    /// Loads configuration from the specified file path.
    ///
    /// # Returns
    ///
    /// * `Ok(CandypackConfig)` - Successfully loaded configuration
    /// * `Err` - If the file cannot be read or parsed
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: CandypackConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        Ok(config)
    }

    /// Attempts to find and load configuration starting from the specified directory.
    ///
    /// # Returns
    ///
    /// * `Ok(Some((config, path)))` - Found and loaded configuration with its path
    /// * `Ok(None)` - No configuration file found
    /// * `Err` - If a config file was found but couldn't be parsed
    pub fn discover_from(start_dir: &Path) -> Result<Option<(Self, PathBuf)>> {
        let mut current = start_dir.to_path_buf();

        loop {
            let config_path = current.join(CONFIG_FILE_NAME);

            if config_path.is_file() {
                let config = Self::load_from_file(&config_path)?;
                return Ok(Some((config, config_path)));
            }

            // Stop at repository root or filesystem root
            if current.join(".git").exists() || !current.pop() {
                break;
            }
        }

        Ok(None)
    }

    /// Builds the pack layout rooted at `root`, applying every override.
    pub fn to_layout(&self, root: &Path) -> Result<PackLayout> {
        let mut layout = PackLayout::new(root);

        let project = &self.project;
        if let Some(dir) = &project.output_dir {
            layout.output_dir = dir.clone();
        }
        if let Some(file) = &project.version_file {
            layout.version_file = file.clone();
        }
        if let Some(manifest) = &project.manifest {
            layout.manifest = manifest.clone();
        }
        if let Some(key) = &project.sign_key {
            layout.sign_key = key.clone();
        }

        let tools = &self.tools;
        if let Some(build) = &tools.build {
            layout.tools.build = build.clone();
        }
        if let Some(test) = &tools.test {
            layout.tools.test = test.clone();
        }
        if let Some(package) = &tools.package {
            layout.tools.package = package.clone();
        }

        let build = &self.build;
        if let Some(configuration) = &build.configuration {
            layout.configuration = configuration.clone();
        }
        if let Some(platform) = &build.platform {
            layout.platform = platform.clone();
        }
        if let Some(assembly) = &build.test_assembly {
            layout.test_assembly = assembly.clone();
        }
        if let Some(artifacts) = &build.artifacts {
            layout.artifacts = artifacts.clone();
        }

        if let Some(targets) = &self.targets {
            layout = layout
                .with_targets(targets.clone())
                .context("Invalid [[targets]] in config")?;
        }

        Ok(layout)
    }

    /// Generates a starter configuration file as a formatted TOML string.
    ///
    /// Every value is the built-in default, so the file changes nothing until
    /// edited.
    pub fn generate_starter_toml() -> String {
        let defaults = PackLayout::new(".");
        let mut toml = format!(
            r#"# candypack configuration file
# Relative paths resolve against the directory holding this file.

[project]
# Base of the per-target output tree
output_dir = "{output_dir}"

# Source file declaring AssemblyVersion("major.minor.patch.revision")
version_file = "{version_file}"

# Package manifest handed to the packaging tool
manifest = "{manifest}"

# Strong-name key; assemblies are signed only when this file exists
sign_key = "{sign_key}"

[tools]
build = "{build_tool}"
test = "{test_tool}"
package = "{package_tool}"

[build]
configuration = "{configuration}"
platform = "{platform}"

# Compiled test assembly run after each build
test_assembly = "{test_assembly}"

# Build outputs copied into <output_dir>/<framework>/
artifacts = [{artifacts}]
"#,
            output_dir = defaults.output_dir.display(),
            version_file = defaults.version_file.display(),
            manifest = defaults.manifest.display(),
            sign_key = defaults.sign_key.display(),
            build_tool = defaults.tools.build,
            test_tool = defaults.tools.test,
            package_tool = defaults.tools.package,
            configuration = defaults.configuration,
            platform = defaults.platform,
            test_assembly = defaults.test_assembly.display(),
            artifacts = defaults
                .artifacts
                .iter()
                .map(|a| format!("\"{}\"", a.display()))
                .collect::<Vec<_>>()
                .join(", "),
        );

        toml.push_str("\n# Targets are built, tested and copied in this order\n");
        for target in defaults.targets() {
            toml.push_str(&format!(
                "[[targets]]\nsolution = \"{}\"\nframework = \"{}\"\n\n",
                target.solution, target.framework
            ));
        }
        toml
    }
}

/// Loaded configuration plus the root its relative paths resolve against.
#[derive(Debug)]
pub struct ConfigResolver {
    /// Loaded configuration, if any.
    pub config: Option<CandypackConfig>,

    /// Path to the loaded config file, if any.
    pub config_path: Option<PathBuf>,

    /// Directory of the config file, else the working directory.
    pub root: PathBuf,
}

impl ConfigResolver {
    /// Loads `explicit` if given, otherwise discovers a config file from `cwd`.
    pub fn load(explicit: Option<&Path>, cwd: &Path) -> Result<Self> {
        let found = match explicit {
            Some(path) => Some((CandypackConfig::load_from_file(path)?, path.to_path_buf())),
            None => CandypackConfig::discover_from(cwd)?,
        };

        match found {
            Some((config, path)) => {
                let root = match path.parent() {
                    Some(parent) if !parent.as_os_str().is_empty() => cwd.join(parent),
                    _ => cwd.to_path_buf(),
                };
                tracing::debug!(config = %path.display(), root = %root.display(), "loaded config");
                Ok(Self {
                    config: Some(config),
                    config_path: Some(path),
                    root,
                })
            }
            None => Ok(Self {
                config: None,
                config_path: None,
                root: cwd.to_path_buf(),
            }),
        }
    }

    /// Resolves the pack layout, falling back to defaults without a config.
    pub fn layout(&self) -> Result<PackLayout> {
        match &self.config {
            Some(config) => config.to_layout(&self.root),
            None => Ok(PackLayout::new(&self.root)),
        }
    }
}
