use assert_cmd::Command;

fn shelf() -> Command {
    let mut cmd = Command::cargo_bin("shelf").unwrap();
    cmd.env_remove("SHELF_ENV").env_remove("SHELF_CONFIG_DIR");
    cmd
}

#[test]
fn check_config_prints_layered_settings() {
    let dir = std::env::temp_dir().join(format!("shelf-cli-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("base.toml"), "[server]\nport = 9090\n").unwrap();

    let assert = shelf()
        .args(["check-config", "--env", "staging", "--config-dir"])
        .arg(&dir)
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();

    assert!(stdout.contains("Staging"), "{stdout}");
    assert!(stdout.contains("9090"), "{stdout}");

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn unknown_environment_fails() {
    shelf()
        .args(["check-config", "--env", "qa"])
        .assert()
        .failure();
}
