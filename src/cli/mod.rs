use crate::check::{AlignContext, CheckOptions};
use crate::config::KitType;
use crate::diff::DiffMode;
use crate::fsutil::{manifest_path, NodeModulesLocator};
use crate::preset::PresetRegistry;
use crate::reporter::ConsoleReporter;
use crate::workspaces;
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

pub mod commands;

use commands::Command;

#[derive(Parser, Debug)]
#[command(
    name = "align-deps",
    version,
    about = "Keep package dependencies aligned with capability presets",
    long_about = "align-deps: capability-driven dependency alignment.\n\nExamples:\n  align-deps\n  align-deps --write\n  align-deps --requirements react-native@0.80\n  align-deps --init library\n  align-deps --set-version 0.80,0.79"
)]
pub struct AlignCli {
    /// Package directories (or manifests) to check; defaults to the current package and its workspaces
    pub packages: Vec<PathBuf>,

    /// Write changes to the manifests instead of reporting them
    #[arg(long)]
    pub write: bool,

    /// Only warn when dependencies disagree on a profile
    #[arg(long)]
    pub loose: bool,

    #[arg(long)]
    pub verbose: bool,

    /// Presets used for packages configured from the command line
    #[arg(long, value_delimiter = ',')]
    pub presets: Vec<String>,

    /// Requirements for packages without configuration (enables vigilant mode)
    #[arg(long, value_delimiter = ',', conflicts_with = "set_version")]
    pub requirements: Option<Vec<String>>,

    /// Packages to skip
    #[arg(long = "exclude-packages", value_delimiter = ',')]
    pub exclude_packages: Vec<String>,

    #[arg(long = "diff-mode", value_enum, default_value = "strict")]
    pub diff_mode: DiffMode,

    /// Do not suggest capabilities for unmanaged dependencies
    #[arg(long = "no-unmanaged")]
    pub no_unmanaged: bool,

    /// Rewrite configuration in the old schema
    #[arg(long = "migrate-config")]
    pub migrate_config: bool,

    /// Write an initial configuration for an app or a library
    #[arg(long, value_enum, conflicts_with_all = ["requirements", "set_version"])]
    pub init: Option<KitType>,

    /// Versions to support, development version first (e.g. 0.80,0.79)
    #[arg(long = "set-version")]
    pub set_version: Option<String>,
}

impl AlignCli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Run the selected command on every manifest. Returns whether all of
    /// them ended in a non-failing state.
    pub fn run(&self) -> Result<bool> {
        let reporter = ConsoleReporter::new(self.verbose);
        let registry = PresetRegistry::builtin()?;
        let locator = NodeModulesLocator;
        let ctx = AlignContext { registry: &registry, locator: &locator, reporter: &reporter };

        let options = self.check_options();
        let command = Command::from_cli(self, &ctx)?;
        let mut failures = 0;
        for manifest in self.manifest_paths()? {
            let code = commands::run_command(&command, &manifest, &options, &ctx);
            if code.is_failure() {
                failures += 1;
            }
        }
        Ok(failures == 0)
    }

    pub fn check_options(&self) -> CheckOptions {
        CheckOptions {
            loose: self.loose,
            write: self.write,
            diff_mode: self.diff_mode,
            no_unmanaged: self.no_unmanaged,
            migrate_config: self.migrate_config,
            exclude_packages: self.exclude_packages.clone(),
            presets: self.presets.clone(),
            requirements: self.requirements.clone(),
        }
    }

    fn manifest_paths(&self) -> Result<Vec<PathBuf>> {
        if self.packages.is_empty() {
            let cwd = std::env::current_dir().context("determine current directory")?;
            return workspaces::manifests_in(&cwd);
        }
        Ok(self
            .packages
            .iter()
            .map(|p| {
                if p.file_name().map(|n| n == "package.json").unwrap_or(false) {
                    p.clone()
                } else {
                    manifest_path(p)
                }
            })
            .collect())
    }
}
