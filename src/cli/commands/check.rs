use crate::check::{check_package_manifest, AlignContext, CheckOptions};
use crate::error::AlignResult;
use crate::vigilant::check_vigilant;
use std::path::Path;

pub fn cmd_check(manifest_path: &Path, options: &CheckOptions, ctx: &AlignContext<'_>) -> AlignResult<()> {
    ctx.reporter.debug(&format!("checking {}", manifest_path.display()));
    check_package_manifest(manifest_path, options, ctx)
}

pub fn cmd_vigilant(
    manifest_path: &Path,
    requirements: &[String],
    options: &CheckOptions,
    ctx: &AlignContext<'_>,
) -> AlignResult<()> {
    ctx.reporter.debug(&format!(
        "checking {} against {}",
        manifest_path.display(),
        requirements.join(", ")
    ));
    check_vigilant(manifest_path, requirements, options, ctx)
}
