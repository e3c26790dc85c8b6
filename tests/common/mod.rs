#![allow(dead_code)]

use assert_cmd::Command;
use assert_fs::TempDir;
use assert_fs::fixture::{FileWriteStr, PathChild};
use fake::Fake;
use fake::faker::internet::en::FreeEmail;
use fake::faker::name::en::Name;
use std::path::Path;

/// Build a `nit` command running in the given repository directory
pub fn run_nit_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("nit").expect("failed to find nit binary");
    cmd.current_dir(dir);
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}

/// `nit commit -m <message>` with a random author identity
pub fn nit_commit(dir: &Path, message: &str) -> Command {
    let name = Name().fake::<String>().replace(' ', "_");
    let email = FreeEmail().fake::<String>();

    let mut cmd = run_nit_command(dir, &["commit", "-m", message]);
    cmd.env("GIT_AUTHOR_NAME", name).env("GIT_AUTHOR_EMAIL", email);
    cmd
}

/// Create an initialized repository in a fresh temp dir
pub fn init_repository() -> TempDir {
    let dir = TempDir::new().expect("failed to create temp dir");
    run_nit_command(dir.path(), &["init"]).assert().success();
    dir
}

/// Create a repository with `a.txt = "hello\n"` committed as `m1`
pub fn repository_with_initial_commit() -> TempDir {
    let dir = init_repository();
    write_file(&dir, "a.txt", "hello\n");
    run_nit_command(dir.path(), &["add", "a.txt"]).assert().success();
    nit_commit(dir.path(), "m1").assert().success();
    dir
}

pub fn write_file(dir: &TempDir, rel: &str, content: &str) {
    let child = dir.child(rel);
    if let Some(parent) = child.path().parent() {
        std::fs::create_dir_all(parent).expect("failed to create parent directories");
    }
    child.write_str(content).expect("failed to write file");
}

pub fn read_file(dir: &TempDir, rel: &str) -> String {
    std::fs::read_to_string(dir.child(rel).path()).expect("failed to read file")
}

pub fn file_exists(dir: &TempDir, rel: &str) -> bool {
    dir.child(rel).path().exists()
}

/// Captured stdout of a successful command
pub fn stdout_of(mut cmd: Command) -> String {
    let output = cmd.assert().success().get_output().stdout.clone();
    String::from_utf8(output).expect("stdout is not utf-8")
}

/// Full id a revision name resolves to
pub fn resolve(dir: &TempDir, name: &str) -> String {
    stdout_of(run_nit_command(dir.path(), &["rev-parse", name]))
        .trim()
        .to_string()
}

pub fn head_sha(dir: &TempDir) -> String {
    resolve(dir, "HEAD")
}

/// Raw index file content
pub fn index_content(dir: &TempDir) -> String {
    read_file(dir, ".nit/index")
}
