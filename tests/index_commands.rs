use predicates::prelude::predicate;
use pretty_assertions::assert_eq;

mod common;

use common::{
    file_exists, index_content, init_repository, nit_commit, read_file,
    repository_with_initial_commit, run_nit_command, stdout_of, write_file,
};

const HELLO_BLOB_SHA: &str = "ce013625030ba8dba906f756967f9e9ca394464a";
const EMPTY_TREE_SHA: &str = "4b825dc642cb6eb9a060e54bf8d69288fbee4904";

#[test]
fn add_stages_a_file_as_a_sorted_index_line() {
    let dir = init_repository();
    write_file(&dir, "a.txt", "hello\n");

    run_nit_command(dir.path(), &["add", "a.txt"]).assert().success();

    assert_eq!(
        index_content(&dir),
        format!("100644 {} 0\ta.txt\n", HELLO_BLOB_SHA)
    );
}

#[test]
fn add_dot_expands_to_nested_files() {
    let dir = init_repository();
    write_file(&dir, "1.txt", "one");
    write_file(&dir, "a/2.txt", "two");
    write_file(&dir, "a/b/3.txt", "three");

    run_nit_command(dir.path(), &["add", "."]).assert().success();

    let content = index_content(&dir);
    let paths: Vec<&str> = content
        .lines()
        .map(|line| line.split_once('\t').unwrap().1)
        .collect();
    assert_eq!(paths, vec!["1.txt", "a/2.txt", "a/b/3.txt"]);
}

#[test]
fn adding_a_missing_pathspec_fails_but_stages_the_rest() {
    let dir = init_repository();
    write_file(&dir, "real.txt", "content\n");

    run_nit_command(dir.path(), &["add", "real.txt", "ghost.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "pathspec 'ghost.txt' did not match any files",
        ));

    assert!(index_content(&dir).contains("real.txt"));
}

#[test]
fn rm_unstages_and_deletes_the_file() {
    let dir = repository_with_initial_commit();

    run_nit_command(dir.path(), &["rm", "a.txt"]).assert().success();

    assert_eq!(index_content(&dir), "");
    assert!(!file_exists(&dir, "a.txt"));
}

#[test]
fn rm_cached_keeps_the_working_tree_file() {
    let dir = repository_with_initial_commit();

    run_nit_command(dir.path(), &["rm", "--cached", "a.txt"])
        .assert()
        .success();

    assert_eq!(index_content(&dir), "");
    assert!(file_exists(&dir, "a.txt"));
    assert_eq!(read_file(&dir, "a.txt"), "hello\n");
}

#[test]
fn rm_with_no_matching_files_fails() {
    let dir = init_repository();

    run_nit_command(dir.path(), &["rm", "ghost.txt"])
        .assert()
        .failure()
        .code(1);
}

#[test]
fn write_tree_of_an_empty_index_prints_the_empty_tree_id() {
    let dir = init_repository();

    run_nit_command(dir.path(), &["write-tree"])
        .assert()
        .success()
        .stdout(format!("{}\n", EMPTY_TREE_SHA));
}

#[test]
fn write_tree_then_ls_tree_shows_the_staged_hierarchy() {
    let dir = init_repository();
    write_file(&dir, "a.txt", "hello\n");
    write_file(&dir, "dir/b.txt", "b\n");
    run_nit_command(dir.path(), &["add", "."]).assert().success();

    let tree_sha = stdout_of(run_nit_command(dir.path(), &["write-tree"]))
        .trim()
        .to_string();

    let listing = stdout_of(run_nit_command(dir.path(), &["ls-tree", &tree_sha]));
    assert!(listing.contains(&format!("100644 blob {}\ta.txt", HELLO_BLOB_SHA)));
    assert!(listing.contains("40000 tree "));
    assert!(listing.contains("\tdir"));

    let recursive = stdout_of(run_nit_command(dir.path(), &["ls-tree", "-r", &tree_sha]));
    assert!(recursive.contains("\ta.txt"));
    assert!(recursive.contains("\tdir/b.txt"));
    assert!(!recursive.contains("40000"));
}

#[test]
fn read_tree_restores_the_index_from_a_tree() {
    let dir = repository_with_initial_commit();
    let before = index_content(&dir);

    // stage something else, then read the committed tree back
    write_file(&dir, "extra.txt", "extra\n");
    run_nit_command(dir.path(), &["add", "extra.txt"]).assert().success();
    assert!(index_content(&dir).contains("extra.txt"));

    let tree_sha = stdout_of(run_nit_command(dir.path(), &["write-tree"]));
    assert!(tree_sha.trim().len() == 40);

    run_nit_command(dir.path(), &["read-tree", "HEAD"]).assert().success();

    assert_eq!(index_content(&dir), before);
    // the working tree is untouched without -u
    assert!(file_exists(&dir, "extra.txt"));
}

#[test]
fn read_tree_with_update_workdir_rewrites_files() {
    let dir = repository_with_initial_commit();

    write_file(&dir, "a.txt", "scribbled over\n");
    run_nit_command(dir.path(), &["read-tree", "-u", "HEAD"])
        .assert()
        .success();

    assert_eq!(read_file(&dir, "a.txt"), "hello\n");
}

#[test]
fn read_tree_merge_mode_is_refused() {
    let dir = repository_with_initial_commit();

    run_nit_command(dir.path(), &["read-tree", "-m", "HEAD"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("merge command"));
}

#[test]
fn build_then_read_tree_reconstructs_the_same_index() {
    let dir = init_repository();
    write_file(&dir, "one.txt", "1\n");
    write_file(&dir, "deep/two.txt", "2\n");
    write_file(&dir, "deep/er/three.txt", "3\n");
    run_nit_command(dir.path(), &["add", "."]).assert().success();
    let before = index_content(&dir);

    let tree_sha = stdout_of(run_nit_command(dir.path(), &["write-tree"]))
        .trim()
        .to_string();
    run_nit_command(dir.path(), &["read-tree", &tree_sha])
        .assert()
        .success();

    assert_eq!(index_content(&dir), before);
    nit_commit(dir.path(), "snapshot").assert().success();
}
