// SPDX-FileCopyrightText: 2026 Promptstow Contributors
// SPDX-License-Identifier: MIT

use crate::{tree_snapshot, SourceFixture};

use promptstow::{
    deploy::ledger, CopyDeployer, DeployError, Deployment, InstallState, TargetKind,
    ValidateError,
};

use pretty_assertions::assert_eq;
use sealed_test::prelude::*;
use simple_test_case::test_case;
use std::fs;

const PLAN_DOC: &str = "Read @knowledge/style.md first.\n\
    Then @knowledge/style.md again, and @knowledge/workflow.md last.\n";

fn two_by_two() -> anyhow::Result<SourceFixture> {
    SourceFixture::new(
        "plugin_src",
        &[("a", "Alpha uses @knowledge/x.md.\n"), ("b", "Beta body.\n")],
        &[("x.md", "x notes\n"), ("y.md", "y notes\n")],
    )
}

#[sealed_test]
fn install_twice_yields_identical_tree() -> anyhow::Result<()> {
    let fixture = two_by_two()?;
    let deployer = CopyDeployer::new(&fixture.manifest, &fixture.root);
    let target = fixture.target(TargetKind::Global);

    deployer.deploy(&target)?;
    let first = tree_snapshot("home".as_ref())?;
    let first_version = ledger::read(&target.ledger_path);

    deployer.deploy(&target)?;
    let second = tree_snapshot("home".as_ref())?;

    assert_eq!(first, second);
    assert_eq!(ledger::read(&target.ledger_path), first_version);

    Ok(())
}

#[test_case("a"; "first declared command")]
#[test_case("b"; "second declared command")]
#[sealed_test]
fn any_missing_command_blocks_every_write(gone: &str) -> anyhow::Result<()> {
    use pretty_assertions::assert_eq;
    let fixture = two_by_two()?;
    fs::remove_file(fixture.root.join("commands").join(format!("{gone}.md")))?;
    let deployer = CopyDeployer::new(&fixture.manifest, &fixture.root);
    let target = fixture.target(TargetKind::Global);

    let result = deployer.deploy(&target);

    match result {
        Err(DeployError::Validate(ValidateError::MissingSources(paths))) => {
            assert_eq!(paths.len(), 1);
        }
        other => panic!("expected MissingSources, got {other:?}"),
    }
    assert!(!target.command_root.exists());
    assert!(!target.knowledge_root.exists());
    assert_eq!(ledger::read(&target.ledger_path), None);

    Ok(())
}

#[sealed_test]
fn transform_rewrites_every_marker_for_local_target() -> anyhow::Result<()> {
    let fixture = SourceFixture::new(
        "plugin_src",
        &[("plan", PLAN_DOC)],
        &[("style.md", "style\n"), ("workflow.md", "workflow\n")],
    )?;
    let deployer = CopyDeployer::new(&fixture.manifest, &fixture.root);
    let target = fixture.target(TargetKind::Local);

    deployer.deploy(&target)?;

    let deployed = fs::read_to_string(target.command_root.join("plan.md"))?;
    assert_eq!(deployed.matches("@.agent/sample/knowledge/").count(), 3);
    assert!(!deployed.contains("@knowledge/"));

    Ok(())
}

#[sealed_test]
fn install_then_uninstall_leaves_nothing_behind() -> anyhow::Result<()> {
    let fixture = two_by_two()?;
    let deployer = CopyDeployer::new(&fixture.manifest, &fixture.root);
    let target = fixture.target(TargetKind::Global);

    deployer.deploy(&target)?;
    let removed = deployer.undeploy(&target)?;

    // Two commands, two knowledge documents; the ledger is not a file of the
    // artifact set.
    assert_eq!(removed, 4);
    assert!(!target.command_root.exists());
    assert!(!target.knowledge_root.exists());
    assert_eq!(ledger::read(&target.ledger_path), None);
    assert_eq!(
        ledger::classify(&target.ledger_path, "0.3.1"),
        InstallState::Fresh
    );

    Ok(())
}

#[sealed_test]
fn uninstall_spares_unrelated_neighbors() -> anyhow::Result<()> {
    let fixture = two_by_two()?;
    let deployer = CopyDeployer::new(&fixture.manifest, &fixture.root);
    let target = fixture.target(TargetKind::Global);

    deployer.deploy(&target)?;
    let parent = target.knowledge_root.parent().unwrap().to_path_buf();
    fs::write(parent.join("notes.txt"), "user content\n")?;

    deployer.undeploy(&target)?;

    assert!(parent.is_dir());
    assert_eq!(fs::read_to_string(parent.join("notes.txt"))?, "user content\n");
    assert!(!target.knowledge_root.exists());

    Ok(())
}

#[sealed_test]
fn uninstall_of_clean_target_removes_nothing() -> anyhow::Result<()> {
    let fixture = two_by_two()?;
    let deployer = CopyDeployer::new(&fixture.manifest, &fixture.root);

    let removed = deployer.undeploy(&fixture.target(TargetKind::Local))?;
    assert_eq!(removed, 0);

    Ok(())
}

#[sealed_test]
fn global_install_produces_expected_layout() -> anyhow::Result<()> {
    let fixture = two_by_two()?;
    let deployer = CopyDeployer::new(&fixture.manifest, &fixture.root);
    let target = fixture.target(TargetKind::Global);

    let summary = deployer.deploy(&target)?;

    assert_eq!(summary.commands, 2);
    assert_eq!(summary.knowledge, 2);
    assert!(summary.skipped.is_empty());

    for relative in [
        ".agent/commands/sample/a.md",
        ".agent/commands/sample/b.md",
        ".agent/sample/knowledge/x.md",
        ".agent/sample/knowledge/y.md",
    ] {
        assert!(
            std::path::Path::new("home").join(relative).is_file(),
            "missing {relative}"
        );
    }

    // Ledger holds exactly the package version string.
    assert_eq!(fs::read_to_string("home/.agent/sample/.version")?, "0.3.1");
    assert_eq!(
        ledger::classify(&target.ledger_path, "0.3.1"),
        InstallState::UpToDate("0.3.1".to_string())
    );

    // The index file never deploys.
    assert!(!target.knowledge_root.join("README.md").exists());

    Ok(())
}

#[sealed_test]
fn upgrade_overwrites_prior_ledger() -> anyhow::Result<()> {
    let fixture = two_by_two()?;
    let deployer = CopyDeployer::new(&fixture.manifest, &fixture.root);
    let target = fixture.target(TargetKind::Global);

    ledger::write(&target.ledger_path, "0.2.0")?;
    assert_eq!(
        ledger::classify(&target.ledger_path, "0.3.1"),
        InstallState::Upgrade {
            from: "0.2.0".to_string()
        }
    );

    deployer.deploy(&target)?;

    assert_eq!(ledger::read(&target.ledger_path), Some("0.3.1".to_string()));

    Ok(())
}
