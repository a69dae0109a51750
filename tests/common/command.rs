use assert_cmd::Command;
use assert_fs::TempDir;
use assert_fs::prelude::*;
use rstest::fixture;
use std::path::Path;

pub const AUTHOR_NAME: &str = "Jane Doe";
pub const AUTHOR_EMAIL: &str = "jane@example.com";
pub const AUTHOR_DATE: &str = "1700000000 +0000";

#[fixture]
pub fn repository_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

#[fixture]
pub fn init_repository_dir(repository_dir: TempDir) -> TempDir {
    run_sg_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    repository_dir
}

/// Repository holding `1.txt`, `a/2.txt` and `a/b/3.txt`, none of them staged
#[fixture]
pub fn populated_repository_dir(init_repository_dir: TempDir) -> TempDir {
    init_repository_dir.child("1.txt").write_str("one").unwrap();
    init_repository_dir.child("a/2.txt").write_str("two").unwrap();
    init_repository_dir.child("a/b/3.txt").write_str("three").unwrap();

    init_repository_dir
}

/// `sg` invocation with a fixed identity and no inherited repository override
pub fn run_sg_command(dir: &Path, args: &[&str]) -> Command {
    let mut sg_cmd = Command::cargo_bin("sg").expect("Failed to find sg binary");
    sg_cmd
        .current_dir(dir)
        .args(args)
        .env_remove("GIT_DIR")
        .env_remove("GIT_COMMITTER_NAME")
        .env_remove("GIT_COMMITTER_EMAIL")
        .env_remove("GIT_COMMITTER_DATE")
        .env("GIT_AUTHOR_NAME", AUTHOR_NAME)
        .env("GIT_AUTHOR_EMAIL", AUTHOR_EMAIL)
        .env("GIT_AUTHOR_DATE", AUTHOR_DATE);
    sg_cmd
}

/// Run `sg` and return its trimmed stdout, failing the test on a non-zero exit
pub fn sg_output(dir: &Path, args: &[&str]) -> String {
    let output = run_sg_command(dir, args).assert().success().get_output().clone();

    String::from_utf8(output.stdout)
        .expect("sg output should be UTF-8")
        .trim()
        .to_string()
}
