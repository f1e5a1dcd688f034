// SPDX-FileCopyrightText: 2026 Promptstow Contributors
// SPDX-License-Identifier: MIT

use crate::SourceFixture;

use promptstow::{Deployment, SymlinkDeployer, TargetKind};

use pretty_assertions::assert_eq;
use sealed_test::prelude::*;
use std::fs;

fn fixture() -> anyhow::Result<SourceFixture> {
    SourceFixture::new(
        "plugin_src",
        &[("plan", "Read @knowledge/style.md first.\n")],
        &[("style.md", "style notes\n")],
    )
}

#[sealed_test]
fn link_install_points_at_pristine_sources() -> anyhow::Result<()> {
    let fixture = fixture()?;
    let deployer = SymlinkDeployer::new(&fixture.manifest, &fixture.root);
    let target = fixture.target(TargetKind::Global);

    let summary = deployer.deploy(&target)?;

    assert_eq!(summary.commands, 1);
    assert_eq!(summary.knowledge, 1);

    let command_dest = target.command_root.join("plan.md");
    assert!(command_dest.is_symlink());
    assert_eq!(
        fs::read_link(&command_dest)?,
        fs::canonicalize(fixture.root.join("commands/plan.md"))?
    );
    // Linked documents stay pristine: no reference rewrite in this strategy.
    assert!(fs::read_to_string(&command_dest)?.contains("@knowledge/"));

    Ok(())
}

#[sealed_test]
fn second_run_skips_correct_links() -> anyhow::Result<()> {
    let fixture = fixture()?;
    let deployer = SymlinkDeployer::new(&fixture.manifest, &fixture.root);
    let target = fixture.target(TargetKind::Global);

    deployer.deploy(&target)?;
    let summary = deployer.deploy(&target)?;

    assert_eq!(summary.commands, 0);
    assert_eq!(summary.knowledge, 0);
    assert_eq!(summary.skipped.len(), 2);
    assert!(summary.skipped.iter().all(|skip| !skip.drifted));
    assert!(!summary.drifted());

    Ok(())
}

#[sealed_test]
fn drifted_link_is_left_untouched_without_force() -> anyhow::Result<()> {
    let fixture = fixture()?;
    let deployer = SymlinkDeployer::new(&fixture.manifest, &fixture.root);
    let target = fixture.target(TargetKind::Global);

    fs::create_dir_all(&target.command_root)?;
    fs::write("elsewhere.md", "imposter\n")?;
    let elsewhere = fs::canonicalize("elsewhere.md")?;
    std::os::unix::fs::symlink(&elsewhere, target.command_root.join("plan.md"))?;

    let summary = deployer.deploy(&target)?;

    assert!(summary.drifted());
    assert_eq!(fs::read_link(target.command_root.join("plan.md"))?, elsewhere);

    Ok(())
}

#[sealed_test]
fn force_replaces_drifted_link() -> anyhow::Result<()> {
    let fixture = fixture()?;
    let deployer = SymlinkDeployer::new(&fixture.manifest, &fixture.root).with_force(true);
    let target = fixture.target(TargetKind::Global);

    fs::create_dir_all(&target.command_root)?;
    fs::write("elsewhere.md", "imposter\n")?;
    std::os::unix::fs::symlink(fs::canonicalize("elsewhere.md")?, target.command_root.join("plan.md"))?;

    let summary = deployer.deploy(&target)?;

    assert!(!summary.drifted());
    assert_eq!(
        fs::read_link(target.command_root.join("plan.md"))?,
        fs::canonicalize(fixture.root.join("commands/plan.md"))?
    );

    Ok(())
}

#[sealed_test]
fn occupied_destination_survives_without_force() -> anyhow::Result<()> {
    let fixture = fixture()?;
    let deployer = SymlinkDeployer::new(&fixture.manifest, &fixture.root);
    let target = fixture.target(TargetKind::Global);

    fs::create_dir_all(&target.command_root)?;
    fs::write(target.command_root.join("plan.md"), "user edits\n")?;

    let summary = deployer.deploy(&target)?;

    assert!(summary.drifted());
    assert_eq!(
        fs::read_to_string(target.command_root.join("plan.md"))?,
        "user edits\n"
    );

    Ok(())
}

#[sealed_test]
fn dry_run_previews_without_mutating() -> anyhow::Result<()> {
    let fixture = fixture()?;
    let deployer = SymlinkDeployer::new(&fixture.manifest, &fixture.root).with_dry_run(true);
    let target = fixture.target(TargetKind::Global);

    let summary = deployer.deploy(&target)?;

    // Every check ran and reported what it would do, but nothing landed.
    assert_eq!(summary.commands, 1);
    assert_eq!(summary.knowledge, 1);
    assert!(!target.command_root.exists());
    assert!(!target.knowledge_root.exists());

    Ok(())
}

#[sealed_test]
fn undeploy_removes_links_but_never_regular_files() -> anyhow::Result<()> {
    let fixture = fixture()?;
    let deployer = SymlinkDeployer::new(&fixture.manifest, &fixture.root);
    let target = fixture.target(TargetKind::Global);

    deployer.deploy(&target)?;
    fs::write(target.command_root.join("scratch.md"), "user content\n")?;

    let removed = deployer.undeploy(&target)?;

    assert_eq!(removed, 2);
    assert!(!target.command_root.join("plan.md").exists());
    // Non-symlink survives, which keeps its directory in place too.
    assert_eq!(
        fs::read_to_string(target.command_root.join("scratch.md"))?,
        "user content\n"
    );
    assert!(target.command_root.is_dir());
    assert!(!target.knowledge_root.exists());

    Ok(())
}
