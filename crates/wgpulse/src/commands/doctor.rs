//! `wgpulse doctor`: distribution and dependency check.

use std::ffi::OsString;
use std::path::PathBuf;

use serde::Serialize;
use tabled::Tabled;

use wgpulse_core::system::{self, Distro, Package};

use crate::cli::{DoctorArgs, OutputFormat};
use crate::config::Context;
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Serialize)]
struct BinaryCheck {
    binary: &'static str,
    package: &'static str,
    path: Option<PathBuf>,
}

#[derive(Serialize)]
struct DoctorReport {
    distro: Distro,
    binaries: Vec<BinaryCheck>,
    install_command: Option<String>,
}

#[derive(Tabled)]
struct BinaryRow {
    #[tabled(rename = "Binary")]
    binary: &'static str,
    #[tabled(rename = "Package")]
    package: &'static str,
    #[tabled(rename = "Found")]
    found: String,
}

impl From<&BinaryCheck> for BinaryRow {
    fn from(c: &BinaryCheck) -> Self {
        Self {
            binary: c.binary,
            package: c.package,
            found: c
                .path
                .as_ref()
                .map_or_else(|| "missing".to_owned(), |p| p.display().to_string()),
        }
    }
}

pub async fn handle(args: &DoctorArgs, ctx: &Context<'_>) -> Result<(), CliError> {
    let distro = Distro::detect();
    let search_path = std::env::var_os("PATH").unwrap_or_else(OsString::new);

    let binaries: Vec<BinaryCheck> = system::REQUIRED_BINARIES
        .iter()
        .map(|&(bin, package)| BinaryCheck {
            binary: bin,
            package: distro.package_name(package),
            path: system::find_in_path(bin, &search_path),
        })
        .collect();
    let missing: Vec<(&str, Package)> = system::missing_binaries(distro, &search_path);
    let packages: Vec<Package> = missing.iter().map(|(_, p)| *p).collect();
    let report = DoctorReport {
        distro,
        install_command: system::install_command(distro, &packages),
        binaries,
    };

    if ctx.format == OutputFormat::Table {
        output::print_output(&format!("Distribution: {}", distro.label()), ctx.quiet());
    }
    let out = output::render_single(
        ctx.format,
        &report,
        |r| {
            let rows: Vec<BinaryRow> = r.binaries.iter().map(BinaryRow::from).collect();
            tabled::Table::new(rows)
                .with(tabled::settings::Style::rounded())
                .to_string()
        },
        |r| {
            r.binaries
                .iter()
                .filter(|c| c.path.is_none())
                .map(|c| c.binary)
                .collect::<Vec<_>>()
                .join("\n")
        },
    )?;
    output::print_output(&out, ctx.quiet());

    if distro == Distro::Unknown {
        output::notice(
            &output::paint_warning(
                "unknown distribution: install wireguard-tools and openresolv with your package manager",
                ctx.color,
            ),
            ctx.quiet(),
        );
        return Ok(());
    }

    let Some(command) = report.install_command else {
        output::notice("All required tools are installed.", ctx.quiet());
        return Ok(());
    };

    let missing_list = missing
        .iter()
        .map(|(bin, _)| *bin)
        .collect::<Vec<_>>()
        .join(", ");

    if !args.install {
        return Err(CliError::MissingDependencies {
            missing: missing_list,
            hint: format!("Install them with:\n  {command}\nor run: wgpulse doctor --install"),
        });
    }

    if !util::confirm(&format!("Run `{command}`?"), "doctor --install", ctx.global.yes)? {
        return Err(CliError::MissingDependencies {
            missing: missing_list,
            hint: format!("Install them with:\n  {command}"),
        });
    }
    run_install(&command).await?;
    output::notice("Installation finished.", ctx.quiet());
    Ok(())
}

async fn run_install(command: &str) -> Result<(), CliError> {
    tracing::info!(%command, "running install command");
    let status = tokio::process::Command::new("sh")
        .arg("-c")
        .arg(command)
        .status()
        .await
        .map_err(|source| CliError::LaunchFailed {
            program: "sh".into(),
            source,
        })?;
    if status.success() {
        Ok(())
    } else {
        Err(CliError::InstallFailed {
            command: command.into(),
            status: status.to_string(),
        })
    }
}
