use predicates::prelude::predicate;
use pretty_assertions::assert_eq;

mod common;

use common::{
    file_exists, head_sha, index_content, nit_commit, read_file, repository_with_initial_commit,
    run_nit_command, stdout_of, write_file,
};

/// Branch off, commit the given files there, then return to main
fn commit_on_branch(dir: &assert_fs::TempDir, branch: &str, files: &[(&str, &str)], message: &str) {
    run_nit_command(dir.path(), &["branch", branch]).assert().success();
    run_nit_command(dir.path(), &["checkout", branch]).assert().success();

    for &(path, content) in files {
        write_file(dir, path, content);
        run_nit_command(dir.path(), &["add", path]).assert().success();
    }
    nit_commit(dir.path(), message).assert().success();

    run_nit_command(dir.path(), &["checkout", "main"]).assert().success();
}

#[test]
fn merging_the_current_commit_is_up_to_date() {
    let dir = repository_with_initial_commit();
    run_nit_command(dir.path(), &["branch", "feat"]).assert().success();

    run_nit_command(dir.path(), &["merge", "feat"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Already up to date."));
}

#[test]
fn merging_an_ancestor_is_up_to_date() {
    let dir = repository_with_initial_commit();
    run_nit_command(dir.path(), &["branch", "old"]).assert().success();

    write_file(&dir, "b.txt", "b\n");
    run_nit_command(dir.path(), &["add", "b.txt"]).assert().success();
    nit_commit(dir.path(), "m2").assert().success();

    run_nit_command(dir.path(), &["merge", "old"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Already up to date."));
}

#[test]
fn fast_forward_moves_the_branch_without_a_new_commit() {
    let dir = repository_with_initial_commit();
    commit_on_branch(&dir, "feat", &[("a.txt", "hello2\n")], "m2");
    let feat_sha = common::resolve(&dir, "feat");

    run_nit_command(dir.path(), &["merge", "feat"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Fast-forward"));

    // main now IS the feat commit; no merge commit, no MERGE_HEAD
    assert_eq!(head_sha(&dir), feat_sha);
    assert_eq!(read_file(&dir, "a.txt"), "hello2\n");
    assert!(!file_exists(&dir, ".nit/MERGE_HEAD"));
}

#[test]
fn disjoint_changes_merge_automatically_into_a_two_parent_commit() {
    let dir = repository_with_initial_commit();
    let base_sha = head_sha(&dir);
    commit_on_branch(&dir, "feat", &[("b.txt", "b\n")], "add b");

    write_file(&dir, "c.txt", "c\n");
    run_nit_command(dir.path(), &["add", "c.txt"]).assert().success();
    nit_commit(dir.path(), "add c").assert().success();
    let main_sha = head_sha(&dir);
    let feat_sha = common::resolve(&dir, "feat");

    run_nit_command(dir.path(), &["merge", "feat"]).assert().success();

    // all three files in the working tree and the index
    assert_eq!(read_file(&dir, "a.txt"), "hello\n");
    assert_eq!(read_file(&dir, "b.txt"), "b\n");
    assert_eq!(read_file(&dir, "c.txt"), "c\n");
    let index = index_content(&dir);
    for path in ["a.txt", "b.txt", "c.txt"] {
        assert!(index.contains(&format!("\t{}", path)));
    }

    // a new commit with both parents, merge concluded
    let merged_sha = head_sha(&dir);
    assert_ne!(merged_sha, main_sha);
    assert_ne!(merged_sha, base_sha);
    let payload = stdout_of(run_nit_command(dir.path(), &["cat-object", "-p", &merged_sha]));
    assert!(payload.contains(&format!("parent {}\n", main_sha)));
    assert!(payload.contains(&format!("parent {}\n", feat_sha)));
    assert!(payload.contains("Merge branch 'feat'"));
    assert!(!file_exists(&dir, ".nit/MERGE_HEAD"));
}

#[test]
fn divergent_edits_conflict_and_leave_resolution_state() {
    let dir = repository_with_initial_commit();
    commit_on_branch(&dir, "feat", &[("a.txt", "hello-from-feat\n")], "feat edit");

    write_file(&dir, "a.txt", "hello-from-main\n");
    run_nit_command(dir.path(), &["add", "a.txt"]).assert().success();
    nit_commit(dir.path(), "main edit").assert().success();
    let main_sha = head_sha(&dir);
    let feat_sha = common::resolve(&dir, "feat");

    run_nit_command(dir.path(), &["merge", "feat"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("CONFLICT (content)"))
        .stderr(predicate::str::contains("Automatic merge failed"));

    // three stages for a.txt
    let index = index_content(&dir);
    assert!(index.contains(" 1\ta.txt"));
    assert!(index.contains(" 2\ta.txt"));
    assert!(index.contains(" 3\ta.txt"));
    assert!(!index.contains(" 0\ta.txt"));

    // the conflict envelope in the working tree
    assert_eq!(
        read_file(&dir, "a.txt"),
        "<<<<<<< HEAD\nhello-from-main\n=======\nhello-from-feat\n>>>>>>> feat\n"
    );

    // MERGE_HEAD marks the merge in progress
    assert_eq!(read_file(&dir, ".nit/MERGE_HEAD"), format!("{}\n", feat_sha));

    let status = stdout_of(run_nit_command(dir.path(), &["status"]));
    assert!(status.contains("You have unmerged paths."));
    assert!(status.contains("both modified:   a.txt"));

    // commit is refused while stages remain
    nit_commit(dir.path(), "premature")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unmerged files"));

    // resolve, stage, conclude
    write_file(&dir, "a.txt", "hello-resolved\n");
    run_nit_command(dir.path(), &["add", "a.txt"]).assert().success();
    nit_commit(dir.path(), "merge feat")
        .assert()
        .success()
        .stdout(predicate::str::contains("(merge)"));

    let merged_sha = head_sha(&dir);
    let payload = stdout_of(run_nit_command(dir.path(), &["cat-object", "-p", &merged_sha]));
    assert!(payload.contains(&format!("parent {}\n", main_sha)));
    assert!(payload.contains(&format!("parent {}\n", feat_sha)));
    assert!(!file_exists(&dir, ".nit/MERGE_HEAD"));
    assert_eq!(read_file(&dir, "a.txt"), "hello-resolved\n");
}

#[test]
fn modify_delete_conflicts_record_two_stages() {
    let dir = repository_with_initial_commit();

    // feat deletes a.txt, main modifies it
    run_nit_command(dir.path(), &["branch", "feat"]).assert().success();
    run_nit_command(dir.path(), &["checkout", "feat"]).assert().success();
    run_nit_command(dir.path(), &["rm", "a.txt"]).assert().success();
    nit_commit(dir.path(), "delete a").assert().success();
    run_nit_command(dir.path(), &["checkout", "main"]).assert().success();

    write_file(&dir, "a.txt", "modified on main\n");
    run_nit_command(dir.path(), &["add", "a.txt"]).assert().success();
    nit_commit(dir.path(), "modify a").assert().success();

    run_nit_command(dir.path(), &["merge", "feat"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("CONFLICT (modify/delete)"));

    // base and ours stages; theirs deleted the file
    let index = index_content(&dir);
    assert!(index.contains(" 1\ta.txt"));
    assert!(index.contains(" 2\ta.txt"));
    assert!(!index.contains(" 3\ta.txt"));
}

#[test]
fn merge_refuses_a_dirty_working_tree() {
    let dir = repository_with_initial_commit();
    commit_on_branch(&dir, "feat", &[("a.txt", "hello2\n")], "feat edit");

    write_file(&dir, "a.txt", "uncommitted\n");

    run_nit_command(dir.path(), &["merge", "feat"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("local changes"));
}

#[test]
fn merge_refuses_while_another_merge_is_in_progress() {
    let dir = repository_with_initial_commit();
    commit_on_branch(&dir, "feat", &[("a.txt", "hello-from-feat\n")], "feat edit");

    write_file(&dir, "a.txt", "hello-from-main\n");
    run_nit_command(dir.path(), &["add", "a.txt"]).assert().success();
    nit_commit(dir.path(), "main edit").assert().success();

    run_nit_command(dir.path(), &["merge", "feat"]).assert().failure();

    run_nit_command(dir.path(), &["merge", "feat"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("unmerged paths"));
}

#[test]
fn merge_of_an_unknown_branch_fails_with_128() {
    let dir = repository_with_initial_commit();

    run_nit_command(dir.path(), &["merge", "ghost"])
        .assert()
        .failure()
        .code(128);
}
