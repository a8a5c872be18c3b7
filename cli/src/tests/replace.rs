use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;

#[test]
fn template() {
    Command::cargo_bin("rt")
        .unwrap()
        .arg("replace")
        .arg(r"(?<key>\w+)=(\w+)")
        .arg("$2=${key}")
        .write_stdin("a=1, b=2\n")
        .assert()
        .success()
        .stdout("1=a, 2=b\n");
}

#[test]
fn limit() {
    Command::cargo_bin("rt")
        .unwrap()
        .arg("replace")
        .arg("--limit")
        .arg("2")
        .arg("o")
        .arg("0")
        .write_stdin("foo boo")
        .assert()
        .success()
        .stdout("f00 boo");
}

#[test]
fn literal() {
    Command::cargo_bin("rt")
        .unwrap()
        .arg("replace")
        .arg("--literal")
        .arg(r"\.")
        .arg("$1")
        .write_stdin("a.b.c")
        .assert()
        .success()
        .stdout("a$1b$1c");
}

#[test]
fn group_modes() {
    Command::cargo_bin("rt")
        .unwrap()
        .arg("replace")
        .arg(r"\w+")
        .arg("${/0}")
        .write_stdin("abc de")
        .assert()
        .success()
        .stdout("cba ed");
}

#[test]
fn unknown_group() {
    Command::cargo_bin("rt")
        .unwrap()
        .arg("replace")
        .arg("(a)")
        .arg("${nope}")
        .write_stdin("a")
        .assert()
        .failure()
        .code(1)
        .stderr("error: invalid template `${nope}`: unknown group: \"nope\"\n");
}

#[test]
fn from_file() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.child("input.txt");

    input.write_str("héllo wörld\n").unwrap();

    Command::cargo_bin("rt")
        .unwrap()
        .arg("replace")
        .arg("-u")
        .arg(r"\b\w")
        .arg("[$&]")
        .arg(input.path())
        .assert()
        .success()
        .stdout("[h]éllo [w]örld\n");
}
