mod check;
mod init;
mod set_version;

pub(crate) use check::{cmd_check, cmd_vigilant};
pub(crate) use init::cmd_init;
pub(crate) use set_version::cmd_set_version;

use super::AlignCli;
use crate::check::{AlignContext, CheckOptions};
use crate::colors::*;
use crate::config::KitType;
use crate::error::{code_of, AlignResult, ErrorCode};
use crate::set_version::{parse_versions_for, VersionTarget};
use anyhow::Result;
use std::path::Path;

/// What to do with each manifest.
#[derive(Debug, Clone)]
pub enum Command {
    Check,
    Vigilant(Vec<String>),
    Init(KitType),
    SetVersion(VersionTarget),
}

impl Command {
    pub fn from_cli(cli: &AlignCli, ctx: &AlignContext<'_>) -> Result<Self> {
        if let Some(kit_type) = cli.init {
            return Ok(Command::Init(kit_type));
        }
        if let Some(versions) = &cli.set_version {
            return Ok(Command::SetVersion(parse_versions_for(versions, ctx)?));
        }
        match &cli.requirements {
            Some(requirements) => Ok(Command::Vigilant(requirements.clone())),
            None => Ok(Command::Check),
        }
    }
}

pub fn run_command(
    command: &Command,
    manifest_path: &Path,
    options: &CheckOptions,
    ctx: &AlignContext<'_>,
) -> ErrorCode {
    let result = match command {
        Command::Check => cmd_check(manifest_path, options, ctx),
        Command::Vigilant(requirements) => cmd_vigilant(manifest_path, requirements, options, ctx),
        Command::Init(kit_type) => {
            let presets = options.presets_or_default();
            cmd_init(manifest_path, *kit_type, &presets, ctx)
        }
        Command::SetVersion(versions) => cmd_set_version(manifest_path, versions, options, ctx),
    };
    report(manifest_path, &result)
}

/// One status line per manifest.
fn report(manifest_path: &Path, result: &AlignResult<()>) -> ErrorCode {
    let code = code_of(result);
    let path = manifest_path.display();
    let prefix = paint(C_GRAY, "[align-deps]");
    match result {
        Ok(()) => println!("{prefix} {} {path}", paint(C_GREEN, code.as_str())),
        Err(e) if code.is_failure() => {
            eprintln!("{prefix} {} {path}: {e}", paint(C_RED, code.as_str()))
        }
        Err(e) => println!("{prefix} {} {path}: {e}", paint(C_DIM, code.as_str())),
    }
    code
}
