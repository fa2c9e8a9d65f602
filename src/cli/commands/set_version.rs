use crate::check::{AlignContext, CheckOptions};
use crate::error::AlignResult;
use crate::set_version::{set_version, VersionTarget};
use std::path::Path;

pub fn cmd_set_version(
    manifest_path: &Path,
    versions: &VersionTarget,
    options: &CheckOptions,
    ctx: &AlignContext<'_>,
) -> AlignResult<()> {
    ctx.reporter.debug(&format!(
        "setting {} to {} (supports {})",
        manifest_path.display(),
        versions.target,
        versions.supported.join(", ")
    ));
    set_version(manifest_path, versions, options, ctx)
}
