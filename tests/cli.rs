//! Command-line surface tests. None of these reach the network: they cover
//! argument validation, dry runs, and the missing-credential path.

mod common;

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;

use common::write_fixture_corpus;

fn workspace() -> (tempfile::TempDir, std::path::PathBuf, std::path::PathBuf) {
    let root = tempfile::tempdir().unwrap();
    let posts_dir = root.path().join("_posts");
    let output_dir = root.path().join("translations");
    fs::create_dir_all(&posts_dir).unwrap();
    (root, posts_dir, output_dir)
}

fn polyglot(root: &tempfile::TempDir) -> Command {
    let mut cmd = Command::cargo_bin("polyglot").unwrap();
    // Run from the temp dir so a developer's .env cannot leak in, and strip
    // the credential so no test can accidentally go live.
    cmd.current_dir(root.path())
        .env_remove("TRANSLATOR_API_KEY")
        .env_remove("TRANSLATOR_BASE_URL")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_lists_the_main_flags() {
    let (root, _, _) = workspace();
    polyglot(&root)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--dry-run"))
        .stdout(predicate::str::contains("--force"))
        .stdout(predicate::str::contains("--lang"));
}

#[test]
fn dry_run_plans_without_a_credential() {
    let (root, posts_dir, output_dir) = workspace();
    write_fixture_corpus(&posts_dir);

    polyglot(&root)
        .arg("--dry-run")
        .arg("--posts-dir")
        .arg(&posts_dir)
        .arg("--output-dir")
        .arg(&output_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run"))
        .stdout(predicate::str::contains("first-post"));

    assert!(!output_dir.exists(), "dry run must not write translations");
}

#[test]
fn dry_run_with_language_filter_plans_one_language() {
    let (root, posts_dir, output_dir) = workspace();
    write_fixture_corpus(&posts_dir);

    polyglot(&root)
        .arg("--dry-run")
        .arg("--lang")
        .arg("es")
        .arg("--posts-dir")
        .arg(&posts_dir)
        .arg("--output-dir")
        .arg(&output_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 language(s)"));
}

#[test]
fn live_run_without_credential_fails_before_any_work() {
    let (root, posts_dir, output_dir) = workspace();
    write_fixture_corpus(&posts_dir);

    polyglot(&root)
        .arg("--posts-dir")
        .arg(&posts_dir)
        .arg("--output-dir")
        .arg(&output_dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("TRANSLATOR_API_KEY"));

    assert!(!output_dir.exists());
}

#[test]
fn unsupported_language_code_is_rejected() {
    let (root, posts_dir, output_dir) = workspace();
    write_fixture_corpus(&posts_dir);

    polyglot(&root)
        .arg("--dry-run")
        .arg("--lang")
        .arg("xx")
        .arg("--posts-dir")
        .arg(&posts_dir)
        .arg("--output-dir")
        .arg(&output_dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported language code"));
}

#[test]
fn unknown_post_filter_is_rejected() {
    let (root, posts_dir, output_dir) = workspace();
    write_fixture_corpus(&posts_dir);

    polyglot(&root)
        .arg("--dry-run")
        .arg("--post")
        .arg("no-such-post")
        .arg("--posts-dir")
        .arg(&posts_dir)
        .arg("--output-dir")
        .arg(&output_dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("post not found"));
}
