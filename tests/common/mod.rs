#![allow(dead_code)]

use assert_cmd::Command;
use assert_fs::TempDir;
use assert_fs::fixture::{FileWriteStr, PathChild};
use fake::Fake;
use fake::faker::lorem::en::{Word, Words};
use rstest::fixture;
use std::path::Path;

const TMPDIR: &str = "../playground";

pub const AUTHOR_NAME: &str = "fake_user";
pub const AUTHOR_EMAIL: &str = "fake_email@email.com";
// %Y-%m-%d %H:%M:%S %z
pub const AUTHOR_DATE: &str = "2023-01-01 12:00:00 +0000";

pub fn redirect_temp_dir() {
    unsafe {
        std::env::set_var("TMPDIR", TMPDIR);
    }

    // Ensure the TMPDIR exists
    if !Path::new(TMPDIR).exists() {
        std::fs::create_dir_all(TMPDIR).expect("Failed to create TMPDIR");
    }
}

#[fixture]
pub fn repository_dir() -> TempDir {
    redirect_temp_dir();
    TempDir::new().expect("Failed to create temp dir")
}

#[fixture]
pub fn init_repository_dir(repository_dir: TempDir) -> TempDir {
    run_plumbit_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    repository_dir
}

pub fn run_plumbit_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("plumbit").expect("Failed to find plumbit binary");
    cmd.env_remove("PLUMBIT_LOG");
    cmd.current_dir(dir);
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}

/// Run a command with a fixed author and committer identity
pub fn run_with_identity(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = run_plumbit_command(dir, args);
    cmd.envs(vec![
        ("GIT_AUTHOR_NAME", AUTHOR_NAME),
        ("GIT_AUTHOR_EMAIL", AUTHOR_EMAIL),
        ("GIT_AUTHOR_DATE", AUTHOR_DATE),
    ]);
    cmd.env_remove("GIT_COMMITTER_NAME")
        .env_remove("GIT_COMMITTER_EMAIL")
        .env_remove("GIT_COMMITTER_DATE");
    cmd
}

/// Stdout of a successful command, without the trailing newline
pub fn stdout_of(mut cmd: Command) -> String {
    let output = cmd.assert().success().get_output().stdout.clone();
    String::from_utf8(output)
        .expect("stdout is not UTF-8")
        .trim_end()
        .to_string()
}

/// Write a file with a random name and random words, returning both
pub fn write_random_file(dir: &TempDir) -> (String, String) {
    let file_name = format!("{}-{}.txt", Word().fake::<String>(), (0..10_000).fake::<u32>());
    let file_content = Words(5..10).fake::<Vec<String>>().join(" ");
    dir.child(&file_name)
        .write_str(&file_content)
        .expect("Failed to write file");

    (file_name, file_content)
}
