use crate::common::file::{FileSpec, write_file};
use assert_cmd::Command;
use assert_fs::TempDir;
use rstest::fixture;
use std::path::Path;

pub const AUTHOR_DATE: &str = "2023-01-01 12:00:00 +0000";

#[fixture]
pub fn repository_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

#[fixture]
pub fn init_repository_dir(repository_dir: TempDir) -> TempDir {
    run_twig_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    write_file(FileSpec::new(
        repository_dir.path().join("1.txt"),
        "one".to_string(),
    ));
    write_file(FileSpec::new(
        repository_dir.path().join("a").join("2.txt"),
        "two".to_string(),
    ));
    write_file(FileSpec::new(
        repository_dir.path().join("a").join("b").join("3.txt"),
        "three".to_string(),
    ));

    run_twig_command(repository_dir.path(), &["add", "."])
        .assert()
        .success();
    twig_commit(repository_dir.path(), "Initial commit")
        .assert()
        .success();

    repository_dir
}

pub fn run_twig_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("twig").expect("Failed to find twig binary");
    cmd.envs([
        ("TWIG_AUTHOR_NAME", "fake_user"),
        ("TWIG_AUTHOR_EMAIL", "fake_email@email.com"),
        ("TWIG_AUTHOR_DATE", AUTHOR_DATE),
    ]);
    cmd.env_remove("TWIG_LOG");
    cmd.current_dir(dir);
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}

pub fn twig_commit(dir: &Path, message: &str) -> Command {
    run_twig_command(dir, &["commit", "-m", message])
}

/// Commit id the current branch points at
pub fn get_head_commit_sha(dir: &Path) -> String {
    let head = std::fs::read_to_string(dir.join(".twig").join("HEAD")).expect("Failed to read HEAD");

    match head.trim().strip_prefix("ref: ") {
        Some(reference) => std::fs::read_to_string(dir.join(".twig").join(reference))
            .expect("Failed to read branch ref")
            .trim()
            .to_string(),
        None => head.trim().to_string(),
    }
}
