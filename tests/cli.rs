//! CLI integration tests for mailshare admin commands.
//!
//! Each test uses an isolated temp directory for the database, ensuring tests
//! can run in parallel safely.

#![allow(deprecated)] // Command::cargo_bin deprecation only affects custom build dirs

use std::path::Path;

use assert_cmd::Command;
use assert_fs::TempDir;
use mailshare::store::{SqliteStore, Store};
use predicates::prelude::*;

struct TestContext {
    temp_dir: TempDir,
}

impl TestContext {
    fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("failed to create temp dir"),
        }
    }

    fn data_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    fn data_dir_str(&self) -> String {
        self.data_dir().to_string_lossy().to_string()
    }

    fn init(&self) -> assert_cmd::assert::Assert {
        Command::cargo_bin("mailshare")
            .expect("failed to find binary")
            .args([
                "admin",
                "init",
                "--data-dir",
                &self.data_dir_str(),
                "--non-interactive",
            ])
            .assert()
    }
}

#[test]
fn test_init_creates_database_and_superadmin() {
    let ctx = TestContext::new();

    ctx.init()
        .success()
        .stdout(predicate::str::contains("Superadmin account 'admin' created"))
        .stdout(predicate::str::contains("Generated password"));

    let db_path = ctx.data_dir().join("mailshare.db");
    assert!(db_path.exists());

    let store = SqliteStore::new(&db_path).expect("open store");
    assert!(store.has_superadmin().expect("query superadmin"));
}

#[test]
fn test_init_twice_fails() {
    let ctx = TestContext::new();

    ctx.init().success();
    ctx.init()
        .failure()
        .stderr(predicate::str::contains("already initialized"));
}

#[test]
fn test_serve_without_init_fails() {
    let ctx = TestContext::new();

    Command::cargo_bin("mailshare")
        .expect("failed to find binary")
        .args(["serve", "--data-dir", &ctx.data_dir_str()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not initialized"));
}
