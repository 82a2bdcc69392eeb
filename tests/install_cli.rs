//! `easy-crud install` against a scratch controller file.

use std::fs;
use std::process::Command;

const CONTROLLER: &str = "use axum::Router;\n\npub struct Controller {\n    pub crud: easy_crud::Crud,\n}\n";

fn easy_crud() -> Command {
    Command::new(env!("CARGO_BIN_EXE_easy-crud"))
}

#[test]
fn install_patches_the_controller_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mod.rs");
    fs::write(&path, CONTROLLER).unwrap();

    let status = easy_crud().arg("install").arg("--path").arg(&path).status().unwrap();
    assert!(status.success());
    let patched = fs::read_to_string(&path).unwrap();
    assert!(patched.starts_with("use easy_crud::EasyCrud;\nuse axum::Router;"));
    assert!(patched.contains("impl EasyCrud for Controller {"));

    let status = easy_crud().arg("install").arg("--path").arg(&path).status().unwrap();
    assert!(status.success());
    assert_eq!(fs::read_to_string(&path).unwrap(), patched);
}

#[test]
fn dry_run_leaves_the_file_alone() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("api.rs");
    fs::write(&path, CONTROLLER.replace("Controller", "Api")).unwrap();

    let output = easy_crud()
        .args(["install", "--controller", "Api", "--crud-field", "crud", "--dry-run", "--path"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());
    let printed = String::from_utf8(output.stdout).unwrap();
    assert!(printed.contains("impl EasyCrud for Api {"));
    assert!(!fs::read_to_string(&path).unwrap().contains("EasyCrud"));
}

#[test]
fn missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let status = easy_crud()
        .arg("install")
        .arg("--path")
        .arg(dir.path().join("nope.rs"))
        .status()
        .unwrap();
    assert!(!status.success());
}
