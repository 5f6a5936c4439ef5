// tests/repo.rs

//! Repository update tests using a stand-in indexer script

#![cfg(unix)]

mod common;

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use common::{payload, scratch, write_config, TestServer, NOARCH_RPM, SRC_RPM};
use rpmget::repo::manage_repo;
use rpmget::sync::{resolve_settings, run_sync};

/// Write an executable that mimics createrepo_c: it creates `repodata`
/// in its last argument and appends its arguments to `calls.log` there.
fn fake_indexer(dir: &Path) -> PathBuf {
    let path = dir.join("fake-createrepo");
    fs::write(
        &path,
        "#!/bin/sh\nfor last; do :; done\nmkdir -p \"$last/repodata\"\necho \"$@\" >> \"$last/calls.log\"\n",
    )
    .unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[test]
fn test_update_copies_and_indexes() {
    let server = TestServer::start();
    let bin = server.add(NOARCH_RPM, &payload(1, 64));
    let src = server.add(SRC_RPM, &payload(2, 64));
    let (dir, options) = scratch();
    let loaded = write_config(dir.path(), "repo.ini", "tree", &[bin, src]);
    run_sync(&loaded, &options).unwrap();

    let mut settings = resolve_settings(&loaded, options.root.as_deref()).unwrap();
    settings.repo_tool = fake_indexer(dir.path()).display().to_string();
    settings.repo_args = vec!["--compatibility".to_string()];

    let repo = dir.path().join("repo");
    let indexed = manage_repo(&settings, false).unwrap();
    assert_eq!(indexed, vec![repo.join("SRPMS"), repo.join("RPMS")]);

    assert!(repo.join("RPMS/Packages/noarch").join(NOARCH_RPM).is_file());
    assert!(repo.join("SRPMS/Packages").join(SRC_RPM).is_file());

    let log = fs::read_to_string(repo.join("RPMS/calls.log")).unwrap();
    assert_eq!(log.trim(), format!("--compatibility {}", repo.join("RPMS").display()));

    // Second run sees repodata and switches to an update
    manage_repo(&settings, true).unwrap();
    let log = fs::read_to_string(repo.join("RPMS/calls.log")).unwrap();
    let second = log.lines().nth(1).unwrap();
    assert_eq!(
        second,
        format!("--compatibility --update --verbose {}", repo.join("RPMS").display())
    );
}
