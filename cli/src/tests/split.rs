use assert_cmd::Command;

#[test]
fn tokens() {
    Command::cargo_bin("rt")
        .unwrap()
        .arg("split")
        .arg(r"\s*,\s*")
        .write_stdin("a , b,,c")
        .assert()
        .success()
        .stdout("a\nb\nc\n");
}

#[test]
fn empty_tokens() {
    Command::cargo_bin("rt")
        .unwrap()
        .arg("split")
        .arg("--empty")
        .arg(":")
        .write_stdin("a::b")
        .assert()
        .success()
        .stdout("a\n\nb\n");
}

#[test]
fn multiline() {
    Command::cargo_bin("rt")
        .unwrap()
        .arg("split")
        .arg("-m")
        .arg(r"^-+$\n?")
        .write_stdin("one\n---\ntwo")
        .assert()
        .success()
        .stdout("one\n\ntwo\n");
}
