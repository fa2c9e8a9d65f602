use crate::check::AlignContext;
use crate::config::KitType;
use crate::error::AlignResult;
use crate::initialize::init_package_manifest;
use std::path::Path;

pub fn cmd_init(
    manifest_path: &Path,
    kit_type: KitType,
    presets: &[String],
    ctx: &AlignContext<'_>,
) -> AlignResult<()> {
    ctx.reporter.debug(&format!("initializing {} as {kit_type}", manifest_path.display()));
    init_package_manifest(manifest_path, kit_type, presets, ctx)
}
