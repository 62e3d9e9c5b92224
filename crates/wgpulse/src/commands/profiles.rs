//! Profile command handlers.

use std::path::PathBuf;

use serde::Serialize;
use tabled::Tabled;

use wgpulse_core::{ProfileName, profiles, reconcile};

use crate::cli::{ProfilesArgs, ProfilesCommand};
use crate::config::Context;
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ProfileEntry {
    name: ProfileName,
    up: bool,
    path: PathBuf,
}

#[derive(Tabled)]
struct ProfileRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Up")]
    up: &'static str,
    #[tabled(rename = "Path")]
    path: String,
}

impl From<&ProfileEntry> for ProfileRow {
    fn from(e: &ProfileEntry) -> Self {
        Self {
            name: e.name.to_string(),
            up: if e.up { "●" } else { "" },
            path: e.path.display().to_string(),
        }
    }
}

// ── Handler ──────────────────────────────────────────────────────────

pub async fn handle(args: ProfilesArgs, ctx: &Context<'_>) -> Result<(), CliError> {
    let dir = ctx.profiles_dir();

    match args.command {
        ProfilesCommand::List => {
            let listing = util::interface_listing(ctx).await;
            let live = reconcile::interface_names(&listing);

            let entries: Vec<ProfileEntry> = profiles::list_profiles(&dir)
                .into_iter()
                .map(|name| ProfileEntry {
                    up: live.contains(name.as_str()),
                    path: profiles::profile_path(&dir, &name),
                    name,
                })
                .collect();

            if entries.is_empty() {
                output::notice(
                    &format!("No profiles in {} (add *.conf files there)", dir.display()),
                    ctx.quiet(),
                );
                return Ok(());
            }

            let out = output::render_list(
                ctx.format,
                &entries,
                |e| ProfileRow::from(e),
                |e| e.name.to_string(),
            )?;
            output::print_output(&out, ctx.quiet());
            Ok(())
        }

        ProfilesCommand::Rename { old, new } => {
            let old = util::parse_profile(&old)?;
            // wg-quick derives the interface from the file name, so an up
            // tunnel could no longer be taken down after the rename.
            let listing = util::interface_listing(ctx).await;
            if reconcile::interface_names(&listing).contains(old.as_str()) {
                return Err(CliError::Validation {
                    field: "profile".into(),
                    reason: format!("{old} is up; run `wgpulse down {old}` before renaming it"),
                });
            }

            let renamed = profiles::rename_profile(&dir, &old, &new)?;
            output::notice(&format!("Renamed {old} → {renamed}"), ctx.quiet());
            Ok(())
        }

        ProfilesCommand::Path { name } => {
            let name = util::parse_profile(&name)?;
            let path = profiles::existing_profile_path(&dir, &name)?;
            output::print_output(&path.display().to_string(), ctx.quiet());
            Ok(())
        }
    }
}
