//! vsim 命令行端到端测试
//!
//! 使用 "mock" 接口（内存总线），配置文件通过 VSIM_CONFIG 指向临时目录。

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn vsim(config_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("vsim").unwrap();
    cmd.env("VSIM_CONFIG", config_dir.path().join("config.toml"));
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_run_odometer_on_mock_bus() {
    let dir = TempDir::new().unwrap();
    vsim(&dir)
        .args(["run", "--interface", "mock", "--odometer", "--duration-ms", "250"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Streaming on mock"))
        .stdout(predicate::str::contains("signals: odometer\n"))
        .stdout(predicate::str::is_match(r"odometer\s+[1-9]").unwrap())
        .stdout(predicate::str::is_match(r"vehicle_speed\s+0").unwrap())
        .stdout(predicate::str::contains("failures 0"))
        .stdout(predicate::str::contains("failure rate 0.0%"));
}

#[test]
fn test_run_without_signals_warns() {
    let dir = TempDir::new().unwrap();
    vsim(&dir)
        .args(["run", "--interface", "mock", "--duration-ms", "50"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--all"))
        .stdout(predicate::str::contains("signals:").not())
        .stdout(predicate::str::contains("frames sent 0"));
}

#[test]
fn test_run_on_missing_interface_fails() {
    let dir = TempDir::new().unwrap();
    vsim(&dir)
        .args(["run", "--interface", "vsimnone0", "--all", "--duration-ms", "50"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("vsimnone0"));
}

#[test]
fn test_config_set_then_get() {
    let dir = TempDir::new().unwrap();

    vsim(&dir)
        .args(["config", "set", "--interface", "mock", "--signals", "speed,odo"])
        .assert()
        .success();

    vsim(&dir)
        .args(["config", "get", "interface"])
        .assert()
        .success()
        .stdout("mock\n");

    vsim(&dir)
        .args(["config", "get", "signals"])
        .assert()
        .success()
        .stdout("vehicle_speed,odometer\n");

    // 配置中的接口和信号被 run 使用
    vsim(&dir)
        .args(["run", "--duration-ms", "150"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Streaming on mock"))
        .stdout(predicate::str::is_match(r"vehicle_speed\s+[1-9]").unwrap())
        .stdout(predicate::str::is_match(r"engine_speed\s+0").unwrap());
}

#[test]
fn test_config_defaults_and_path() {
    let dir = TempDir::new().unwrap();

    vsim(&dir)
        .args(["config", "get"])
        .assert()
        .success()
        .stdout(predicate::str::contains("can0"))
        .stdout(predicate::str::contains("250000"))
        .stdout(predicate::str::contains("(none)"));

    vsim(&dir)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_rejects_unknown_signal() {
    let dir = TempDir::new().unwrap();
    vsim(&dir)
        .args(["config", "set", "--signals", "brakes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("brakes"));
}
