//! CLI tests for the `router` binary.
//!
//! Seeds `.router/` in a temp directory, spawns the binary and checks exit
//! codes and stdout.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use router::core::types::FunctionId;
use router::exit_codes;
use router::io::RouterPaths;
use router::io::config::{RouterConfig, write_config};
use router::io::snapshot::write_snapshot;
use router::test_support::{MODULE_X, MODULE_Y, MODULE_Z, OWNER, addr, fid, scenario_router};

fn seed(root: &Path) -> RouterConfig {
    let config = RouterConfig {
        linked_modules: vec![MODULE_X, MODULE_Y, MODULE_Z],
        ..RouterConfig::default()
    };
    write_config(&RouterPaths::new(root).config_path, &config).expect("write config");
    write_snapshot(
        &config.state_path_in(root),
        &scenario_router().snapshot(),
        config.pretty,
    )
    .expect("write snapshot");
    config
}

fn run_router(root: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_router"))
        .current_dir(root)
        .args(args)
        .output()
        .expect("spawn router")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn loupe_prints_modules_with_their_functions() {
    let temp = tempfile::tempdir().expect("tempdir");
    seed(temp.path());

    let output = run_router(temp.path(), &["loupe"]);
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let expected = format!(
        "{MODULE_X}\n  {}\n  {}\n{MODULE_Y}\n  {}\n",
        fid(1),
        fid(2),
        fid(3)
    );
    assert_eq!(stdout(&output), expected);
}

#[test]
fn loupe_filters_by_module() {
    let temp = tempfile::tempdir().expect("tempdir");
    seed(temp.path());

    let module = MODULE_Y.to_string();
    let output = run_router(temp.path(), &["loupe", "--module", &module]);
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert_eq!(stdout(&output), format!("{MODULE_Y}\n  {}\n", fid(3)));
}

#[test]
fn resolve_exits_not_found_for_unrouted_function() {
    let temp = tempfile::tempdir().expect("tempdir");
    seed(temp.path());

    let known = fid(2).to_string();
    let output = run_router(temp.path(), &["resolve", &known]);
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert_eq!(stdout(&output).trim(), MODULE_X.to_string());

    let unknown = fid(42).to_string();
    let output = run_router(temp.path(), &["resolve", &unknown]);
    assert_eq!(output.status.code(), Some(exit_codes::NOT_FOUND));
}

#[test]
fn selector_prints_function_id() {
    let temp = tempfile::tempdir().expect("tempdir");
    let output = run_router(temp.path(), &["selector", "transfer(address,uint256)"]);
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert_eq!(
        stdout(&output).trim(),
        FunctionId::from_signature("transfer(address,uint256)").to_string()
    );

    let output = run_router(temp.path(), &["selector", "not a signature"]);
    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
}

#[test]
fn cut_from_owner_is_persisted() {
    let temp = tempfile::tempdir().expect("tempdir");
    seed(temp.path());
    let cut_path = temp.path().join("cut.toml");
    fs::write(
        &cut_path,
        format!(
            "[[entries]]\nmodule = \"{MODULE_Z}\"\naction = \"add\"\nfunctions = [\"{}\"]\n",
            fid(4)
        ),
    )
    .expect("write cut");

    let owner = OWNER.to_string();
    let output = run_router(temp.path(), &["cut", "--caller", &owner, "cut.toml"]);
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert!(stdout(&output).contains("\"event\""));

    let output = run_router(temp.path(), &["modules"]);
    assert_eq!(
        stdout(&output),
        format!("{MODULE_X}\n{MODULE_Y}\n{MODULE_Z}\n")
    );
}

#[test]
fn cut_from_stranger_exits_unauthorized_and_keeps_state() {
    let temp = tempfile::tempdir().expect("tempdir");
    let config = seed(temp.path());
    let state_path = config.state_path_in(temp.path());
    let before = fs::read_to_string(&state_path).expect("read state");
    fs::write(
        temp.path().join("cut.toml"),
        "[[entries]]\naction = \"remove\"\nfunctions = [\"0x00000001\"]\n",
    )
    .expect("write cut");

    let stranger = addr(0xbad).to_string();
    let output = run_router(temp.path(), &["cut", "--caller", &stranger, "cut.toml"]);
    assert_eq!(output.status.code(), Some(exit_codes::UNAUTHORIZED));
    assert_eq!(fs::read_to_string(&state_path).expect("read state"), before);
}

#[test]
fn transfer_owner_updates_owner() {
    let temp = tempfile::tempdir().expect("tempdir");
    seed(temp.path());

    let owner = OWNER.to_string();
    let next = addr(0x60).to_string();
    let output = run_router(temp.path(), &["transfer-owner", "--caller", &owner, &next]);
    assert_eq!(output.status.code(), Some(exit_codes::OK));

    let output = run_router(temp.path(), &["owner"]);
    assert_eq!(stdout(&output).trim(), next);
}

#[test]
fn validate_rejects_snapshot_with_shared_function() {
    let temp = tempfile::tempdir().expect("tempdir");
    let config = seed(temp.path());
    let state_path = config.state_path_in(temp.path());

    let output = run_router(temp.path(), &["validate"]);
    assert_eq!(output.status.code(), Some(exit_codes::OK));

    let mut snapshot = scenario_router().snapshot();
    snapshot.modules[1].functions.push(fid(1));
    write_snapshot(&state_path, &snapshot, true).expect("write snapshot");

    let output = run_router(temp.path(), &["validate"]);
    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
}
