use predicates::prelude::predicate;

mod common;

use common::{
    nit_commit, init_repository, repository_with_initial_commit, run_nit_command, stdout_of,
    write_file,
};

#[test]
fn fresh_repository_reports_a_clean_tree() {
    let dir = init_repository();

    run_nit_command(dir.path(), &["status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("On branch main"))
        .stdout(predicate::str::contains(
            "nothing to commit, working tree clean",
        ));
}

#[test]
fn untracked_files_are_listed() {
    let dir = init_repository();
    write_file(&dir, "new.txt", "new\n");

    let output = stdout_of(run_nit_command(dir.path(), &["status"]));
    assert!(output.contains("Untracked files:"));
    assert!(output.contains("  new.txt"));
    assert!(!output.contains("nothing to commit"));
}

#[test]
fn staged_additions_show_as_new_files() {
    let dir = init_repository();
    write_file(&dir, "new.txt", "new\n");
    run_nit_command(dir.path(), &["add", "new.txt"]).assert().success();

    let output = stdout_of(run_nit_command(dir.path(), &["status"]));
    assert!(output.contains("Changes to be committed:"));
    assert!(output.contains("new file:   new.txt"));
}

#[test]
fn status_after_a_clean_commit_is_empty() {
    let dir = repository_with_initial_commit();

    run_nit_command(dir.path(), &["status"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "nothing to commit, working tree clean",
        ));
}

#[test]
fn workdir_edits_show_as_unstaged_modifications() {
    let dir = repository_with_initial_commit();
    write_file(&dir, "a.txt", "edited\n");

    let output = stdout_of(run_nit_command(dir.path(), &["status"]));
    assert!(output.contains("Changes not staged for commit:"));
    assert!(output.contains("modified:   a.txt"));
}

#[test]
fn staged_edits_show_under_changes_to_be_committed() {
    let dir = repository_with_initial_commit();
    write_file(&dir, "a.txt", "edited\n");
    run_nit_command(dir.path(), &["add", "a.txt"]).assert().success();

    let output = stdout_of(run_nit_command(dir.path(), &["status"]));
    assert!(output.contains("Changes to be committed:"));
    assert!(output.contains("modified:   a.txt"));
    assert!(!output.contains("Changes not staged for commit:"));
}

#[test]
fn deleted_workdir_files_show_as_unstaged_deletions() {
    let dir = repository_with_initial_commit();
    std::fs::remove_file(dir.path().join("a.txt")).unwrap();

    let output = stdout_of(run_nit_command(dir.path(), &["status"]));
    assert!(output.contains("Changes not staged for commit:"));
    assert!(output.contains("deleted:    a.txt"));
}

#[test]
fn rm_cached_leaves_a_staged_deletion_and_an_untracked_file() {
    let dir = repository_with_initial_commit();
    run_nit_command(dir.path(), &["rm", "--cached", "a.txt"])
        .assert()
        .success();

    let output = stdout_of(run_nit_command(dir.path(), &["status"]));
    assert!(output.contains("deleted:    a.txt"));
    assert!(output.contains("Untracked files:"));
    assert!(output.contains("  a.txt"));
}

#[test]
fn status_is_total_over_all_three_sources() {
    let dir = repository_with_initial_commit();

    // one staged addition, one unstaged edit, one untracked file
    write_file(&dir, "staged.txt", "s\n");
    run_nit_command(dir.path(), &["add", "staged.txt"]).assert().success();
    write_file(&dir, "a.txt", "edited\n");
    write_file(&dir, "loose.txt", "l\n");

    let output = stdout_of(run_nit_command(dir.path(), &["status"]));
    assert!(output.contains("new file:   staged.txt"));
    assert!(output.contains("modified:   a.txt"));
    assert!(output.contains("  loose.txt"));

    nit_commit(dir.path(), "sweep").assert().success();
    let after = stdout_of(run_nit_command(dir.path(), &["status"]));
    // the staged file is committed; the other two remain
    assert!(!after.contains("staged.txt"));
    assert!(after.contains("modified:   a.txt"));
    assert!(after.contains("  loose.txt"));
}
