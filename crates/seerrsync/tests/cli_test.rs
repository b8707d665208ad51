use assert_cmd::Command;
use predicates::prelude::*;

fn seerrsync() -> Command {
    Command::cargo_bin("seerrsync").unwrap()
}

#[test]
fn help_lists_the_subcommands() {
    seerrsync()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("apply"))
        .stdout(predicate::str::contains("dump-config"));
}

#[test]
fn version_matches_the_package() {
    seerrsync()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn generates_bash_completions() {
    seerrsync()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("seerrsync"));
}

#[test]
fn missing_config_file_is_a_usage_error() {
    seerrsync()
        .args(["plan", "--config", "/nonexistent/seerrsync.yml"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn malformed_config_is_a_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("seerrsync.yml");
    std::fs::write(&path, "instances: [").unwrap();

    seerrsync()
        .arg("plan")
        .arg("-c")
        .arg(&path)
        .assert()
        .failure()
        .code(2);
}

#[test]
fn unreachable_instance_exits_with_the_connection_code() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("seerrsync.yml");
    std::fs::write(
        &path,
        "instances:\n  main:\n    hostname: 127.0.0.1\n    port: 1\n    api_key: test-key\n",
    )
    .unwrap();

    seerrsync()
        .arg("plan")
        .arg("-c")
        .arg(&path)
        .args(["--retries", "0", "--no-cache"])
        .assert()
        .failure()
        .code(7)
        .stderr(predicate::str::contains("main"));
}
