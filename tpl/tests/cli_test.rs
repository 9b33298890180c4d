//! End-to-end tests for the `tpl` binary
//!
//! Each test gets its own HOME, working directory and store root.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

struct Sandbox {
    temp: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp dir");
        for dir in ["home", "work"] {
            fs::create_dir_all(temp.path().join(dir)).unwrap();
        }
        Self { temp }
    }

    fn path(&self, rel: &str) -> PathBuf {
        self.temp.path().join(rel)
    }

    fn home(&self) -> PathBuf {
        self.path("home")
    }

    fn work(&self) -> PathBuf {
        self.path("work")
    }

    fn config_file(&self) -> PathBuf {
        self.path("home/tpl/config.json")
    }

    /// Write a config pointing the store at `root`
    fn use_store(&self, root: &Path) {
        fs::create_dir_all(self.config_file().parent().unwrap()).unwrap();
        let json = serde_json::json!({ "StorePath": root });
        fs::write(self.config_file(), json.to_string()).unwrap();
    }

    fn write(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.path(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    /// `tpl --yes` running in the work dir with HOME pointed at the sandbox
    fn tpl(&self) -> Command {
        let mut cmd = Command::cargo_bin("tpl").unwrap();
        cmd.current_dir(self.work())
            .env("HOME", self.home())
            .env_remove("TPL_CONFIG")
            .env_remove("RUST_LOG")
            .arg("--yes");
        cmd
    }
}

#[test]
fn test_directory_round_trip() {
    let sb = Sandbox::new();
    let store = sb.path("store");
    sb.use_store(&store);
    sb.write("src_dir/a.txt", "alpha");
    sb.write("src_dir/sub/b.txt", "beta");

    sb.tpl()
        .args(["save", "proj"])
        .arg(sb.path("src_dir"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved"));
    assert_eq!(fs::read_to_string(store.join("proj/sub/b.txt")).unwrap(), "beta");

    sb.tpl().args(["get", "proj"]).assert().success();
    assert_eq!(fs::read_to_string(sb.work().join("a.txt")).unwrap(), "alpha");
    assert_eq!(fs::read_to_string(sb.work().join("sub/b.txt")).unwrap(), "beta");

    sb.tpl().args(["delete", "proj"]).assert().success();
    sb.tpl()
        .args(["get", "proj"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown key: proj"));
}

#[test]
fn test_single_file_is_listed() {
    let sb = Sandbox::new();
    let store = sb.path("store");
    sb.use_store(&store);
    sb.write("work/single.txt", "one");

    sb.tpl().args(["s", "notes", "single.txt"]).assert().success();
    sb.tpl().args(["s", "other", "single.txt"]).assert().success();

    assert!(store.join("notes/single.txt").is_file());
    sb.tpl()
        .arg("ls")
        .assert()
        .success()
        .stdout("notes\nother\n");
    sb.tpl()
        .args(["l", "no"])
        .assert()
        .success()
        .stdout("notes\n");
}

#[test]
fn test_save_missing_source_fails() {
    let sb = Sandbox::new();
    sb.use_store(&sb.path("store"));

    sb.tpl()
        .args(["save", "proj", "does-not-exist"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid template path"));
}

#[test]
fn test_config_shows_and_relocates_store() {
    let sb = Sandbox::new();
    let old_root = sb.path("store");
    sb.use_store(&old_root);
    sb.write("work/single.txt", "one");
    sb.tpl().args(["save", "before", "single.txt"]).assert().success();

    sb.tpl()
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("StorePath: {}", old_root.display())));

    let new_root = sb.path("newroot");
    sb.tpl()
        .args(["config", "StorePath"])
        .arg(&new_root)
        .assert()
        .success();
    assert!(new_root.is_dir());

    sb.tpl().args(["save", "after", "single.txt"]).assert().success();
    assert!(new_root.join("after/single.txt").is_file());
    assert!(!new_root.join("before").exists(), "relocation does not migrate entries");
    assert!(old_root.join("before").exists());

    let canonical = fs::canonicalize(&new_root).unwrap();
    sb.tpl()
        .arg("c")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("StorePath: {}", canonical.display())));
}

#[test]
fn test_config_rejects_unknown_type() {
    let sb = Sandbox::new();

    sb.tpl()
        .args(["config", "Color", "red"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Valid configuration types: StorePath"));
    assert!(!sb.config_file().exists());
}

#[test]
fn test_defaults_live_under_home() {
    let sb = Sandbox::new();
    sb.write("work/single.txt", "one");

    sb.tpl().args(["save", "notes", "single.txt"]).assert().success();

    assert!(sb.home().join("tpl/store/notes/single.txt").is_file());
    assert!(!sb.config_file().exists(), "defaults are not written until relocated");
}

#[test]
fn test_explicit_config_flag() {
    let sb = Sandbox::new();
    let config = sb.path("elsewhere/custom.json");
    fs::create_dir_all(config.parent().unwrap()).unwrap();
    fs::write(&config, serde_json::json!({ "StorePath": sb.path("custom-store") }).to_string()).unwrap();
    sb.write("work/single.txt", "one");

    sb.tpl()
        .arg("--config")
        .arg(&config)
        .args(["save", "k", "single.txt"])
        .assert()
        .success();

    assert!(sb.path("custom-store/k/single.txt").is_file());
}

#[test]
fn test_corrupt_config_is_fatal() {
    let sb = Sandbox::new();
    fs::create_dir_all(sb.config_file().parent().unwrap()).unwrap();
    fs::write(sb.config_file(), "{ this is not json").unwrap();

    sb.tpl()
        .arg("ls")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"))
        .stderr(predicate::str::contains("corrupt"));
}
