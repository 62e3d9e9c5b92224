//! `wgpulse dns-patch`: comment out DNS directives in a profile.

use serde::Serialize;

use wgpulse_core::{patch_dns, profiles};

use crate::cli::DnsPatchArgs;
use crate::config::Context;
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Serialize)]
struct PatchReport {
    profile: String,
    path: String,
    commented: usize,
    changed: bool,
}

pub fn handle(args: &DnsPatchArgs, ctx: &Context<'_>) -> Result<(), CliError> {
    let name = util::parse_profile(&args.name)?;
    let path = profiles::existing_profile_path(&ctx.profiles_dir(), &name)?;
    let patch = patch_dns(&path)?;

    let report = PatchReport {
        profile: name.to_string(),
        path: path.display().to_string(),
        commented: patch.commented,
        changed: patch.changed(),
    };
    let out = output::render_single(
        ctx.format,
        &report,
        |r| {
            if r.changed {
                format!("Commented out {} DNS line(s) in {}", r.commented, r.path)
            } else {
                format!("No DNS lines to patch in {}", r.path)
            }
        },
        |r| r.commented.to_string(),
    )?;
    output::print_output(&out, ctx.quiet());
    Ok(())
}
