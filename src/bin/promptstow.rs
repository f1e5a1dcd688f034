// SPDX-FileCopyrightText: 2026 Promptstow Contributors
// SPDX-License-Identifier: MIT

use promptstow::{
    deploy::ledger, path, CopyDeployer, DeploySummary, Deployment, PluginManifest,
    SymlinkDeployer, Target, TargetKind,
};

use anyhow::Result;
use clap::{CommandFactory, FromArgMatches, Parser};
use inquire::Select;
use std::{fs, path::Path, process::exit};
use tracing::{error, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Parser)]
#[command(
    about,
    override_usage = "promptstow [options]",
    disable_version_flag = true
)]
struct Cli {
    /// Deploy into the global target rooted at the home directory.
    #[arg(short, long, group = "target")]
    pub global: bool,

    /// Deploy into the local target rooted at the working directory.
    #[arg(short, long, group = "target")]
    pub local: bool,

    /// Remove a previous deployment instead of installing.
    #[arg(short, long)]
    pub uninstall: bool,

    /// Report the package version and the deployed version at each target.
    #[arg(short = 'v', long = "version")]
    pub version: bool,

    /// Symlink pristine sources into place instead of copying.
    #[arg(long)]
    pub link: bool,

    /// Replace drifted symlinks or files in the way (with --link).
    #[arg(long, requires = "link")]
    pub force: bool,

    /// Report every action without touching the filesystem (with --link).
    #[arg(long, requires = "link")]
    pub dry_run: bool,
}

fn main() {
    let layer = fmt::layer()
        .compact()
        .with_target(false)
        .with_timer(false)
        .without_time();
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    match run() {
        Ok(code) => exit(code),
        Err(error) => {
            error!("{error:?}");
            exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let work_dir = path::work_dir()?;
    let manifest = load_manifest(&work_dir)?;

    // Help output carries the full command roster, which only the manifest
    // knows, so the clap command gets finished by hand here.
    let matches = Cli::command()
        .after_help(roster_help(&manifest))
        .get_matches();
    let cli = Cli::from_arg_matches(&matches)?;

    let home = path::home_dir()?;

    if cli.version {
        report_versions(&manifest, &home, &work_dir);
        return Ok(0);
    }

    let kind = select_target(&cli);
    let target = Target::resolve(kind, &home, &work_dir, &manifest);

    if cli.uninstall {
        let removed = if cli.link {
            SymlinkDeployer::new(&manifest, &work_dir)
                .with_dry_run(cli.dry_run)
                .undeploy(&target)?
        } else {
            CopyDeployer::new(&manifest, &work_dir).undeploy(&target)?
        };
        println!("Removed {removed} file(s) from {}", target.label());
        return Ok(0);
    }

    let summary = if cli.link {
        SymlinkDeployer::new(&manifest, &work_dir)
            .with_force(cli.force)
            .with_dry_run(cli.dry_run)
            .deploy(&target)?
    } else {
        CopyDeployer::new(&manifest, &work_dir).deploy(&target)?
    };
    print_summary(&summary);

    // Drift skips mean the run only partially completed.
    Ok(if summary.drifted() { 2 } else { 0 })
}

/// Parse `manifest.toml` from the source tree, or fall back to the
/// compiled-in artifact set.
fn load_manifest(source_root: &Path) -> Result<PluginManifest> {
    let manifest_path = source_root.join("manifest.toml");
    if manifest_path.is_file() {
        Ok(fs::read_to_string(&manifest_path)?.parse::<PluginManifest>()?)
    } else {
        Ok(PluginManifest::default())
    }
}

/// Resolve the target kind from flags, prompting when neither was given.
///
/// Prompting stays at this boundary; the engine always receives a fully
/// resolved kind. An aborted or unusable prompt defaults to global.
fn select_target(cli: &Cli) -> TargetKind {
    if cli.global {
        return TargetKind::Global;
    }
    if cli.local {
        return TargetKind::Local;
    }

    match Select::new("Install target", TargetKind::ALL.to_vec()).prompt() {
        Ok(kind) => kind,
        Err(_) => {
            warn!("no usable answer, defaulting to the global target");
            TargetKind::Global
        }
    }
}

fn report_versions(manifest: &PluginManifest, home: &Path, work_dir: &Path) {
    let package = manifest.settings.version.as_str();
    println!("{} {package}", manifest.settings.name);

    for kind in TargetKind::ALL {
        let target = Target::resolve(kind, home, work_dir, manifest);
        let status = match ledger::read(&target.ledger_path) {
            Some(deployed) if deployed == package => format!("{deployed} (up to date)"),
            Some(deployed) => format!("{deployed} (outdated, package is {package})"),
            None => "not installed".to_string(),
        };
        println!("  {kind}: {status}");
    }
}

fn print_summary(summary: &DeploySummary) {
    println!(
        "Deployed {} command and {} knowledge document(s) to {}",
        summary.commands, summary.knowledge, summary.target_label
    );
    for (name, description) in &summary.roster {
        println!("  {name:<12} {description}");
    }
    for skip in &summary.skipped {
        println!("  skipped {}: {}", skip.name, skip.reason);
    }
    if summary.drifted() {
        warn!("drifted artifacts were left untouched, re-run with --force to replace them");
    }
}

fn roster_help(manifest: &PluginManifest) -> String {
    let mut help = String::from("Commands installed by this package:\n");
    for spec in &manifest.commands {
        help.push_str(format!("  {:<12} {}\n", spec.name, spec.description).as_str());
    }

    help
}
