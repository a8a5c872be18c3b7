mod replace;
mod split;

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

#[test]
fn invalid_pattern() {
    Command::cargo_bin("rt")
        .unwrap()
        .arg("grep")
        .arg("a{5,2}")
        .write_stdin("aaa")
        .assert()
        .failure()
        .code(1)
        .stderr(
            "error: invalid pattern `a{5,2}`: malformed quantifier at offset 1\n",
        );
}

#[test]
fn missing_file() {
    Command::cargo_bin("rt")
        .unwrap()
        .arg("split")
        .arg(",")
        .arg("src/tests/testdata/missing.txt")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains(
            "error: can not read `src/tests/testdata/missing.txt`",
        ));
}

#[test]
fn config_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.child("config.toml");

    config_file.write_str("[grep]\nline_number = true\n").unwrap();

    Command::cargo_bin("rt")
        .unwrap()
        .arg("--config")
        .arg(config_file.path())
        .arg("grep")
        .arg("b")
        .write_stdin("a\nb\n")
        .assert()
        .success()
        .stdout("2:b\n");
}

#[test]
fn invalid_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.child("config.toml");

    config_file.write_str("[grep]\ncolour = true\n").unwrap();

    Command::cargo_bin("rt")
        .unwrap()
        .arg("--config")
        .arg(config_file.path())
        .arg("grep")
        .arg("b")
        .write_stdin("b\n")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("unknown field"));
}
