use assert_cmd::prelude::*;
use once_cell::sync::Lazy;
use predicates::str::contains;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

static SCENE: Lazy<String> = Lazy::new(|| {
    r#"<scene>
  <object>
    <name>Crate</name>
    <vertex>0 0 0</vertex>
  </object>
  <object>
    <name>Crate_hull_0</name>
    <position>0 0 1</position>
    <vertex>1 2 3</vertex>
    <vertex>0 0 0</vertex>
  </object>
  <object>
    <name>Camera</name>
    <type>camera</type>
  </object>
</scene>
"#
    .to_string()
});

fn write_scene(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("scene.xml");
    fs::write(&path, SCENE.as_str()).expect("write scene");
    path
}

fn tool() -> Command {
    Command::cargo_bin("bphysics-tools").expect("binary exists")
}

#[test]
fn import_writes_obj_file() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("Crate.physics.yml");
    fs::write(
        &input,
        "vertex_num: 2\nvertex_0: [1, 2, 3]\nvertex_1: [4, 5, 6]\n",
    )
    .unwrap();

    tool()
        .arg("import")
        .arg(&input)
        .assert()
        .success()
        .stdout(contains("Imported 1 shape(s)"));
    assert_eq!(
        fs::read_to_string(dir.path().join("Crate.physics.yml.obj")).unwrap(),
        "o Shape_0\nv 1 2 3\nv 4 5 6\n"
    );
}

#[test]
fn import_reports_malformed_vertex() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("Bad.physics.yml");
    fs::write(&input, "vertex_num: 1\nvertex_0: 1, 2, 3\n").unwrap();

    tool()
        .arg("import")
        .arg(&input)
        .assert()
        .failure()
        .stderr(contains("parse error on line 2"));
}

#[test]
fn grouped_export_writes_rigid_bodies() {
    let dir = TempDir::new().unwrap();
    let scene = write_scene(&dir);
    let output = dir.path().join("Crate.physics.yml");

    tool()
        .arg("export")
        .arg(&scene)
        .arg(&output)
        .arg("--grouped")
        .assert()
        .success()
        .stdout(contains("Loaded scene with 3 objects"))
        .stdout(contains("Exported 1 shape(s) in 1 rigid body(ies)"));

    let text = fs::read_to_string(&output).unwrap();
    assert!(text.contains("rigid_body_name: !str64 Crate\n"));
    assert!(text.contains("ShapeParam_0: !obj # Crate_hull_0\n"));
    assert!(text.contains("vertex_0: !vec3 [1.0, 4.0, -2.0]\n"));
}

#[test]
fn grouped_export_without_proxies_fails() {
    let dir = TempDir::new().unwrap();
    let scene = write_scene(&dir);
    let output = dir.path().join("Crate.physics.yml");

    tool()
        .arg("export")
        .arg(&scene)
        .arg(&output)
        .args(["--grouped", "--marker", "_collision"])
        .assert()
        .failure()
        .stderr(contains("no collision proxies found"));
    assert!(!output.exists());
}

#[test]
fn binary_export_with_missing_compiler_keeps_text() {
    let dir = TempDir::new().unwrap();
    let scene = write_scene(&dir);
    let output = dir.path().join("Crate.bphysics");

    tool()
        .arg("export")
        .arg(&scene)
        .arg(&output)
        .arg("--compiler")
        .arg(dir.path().join("missing-compiler"))
        .assert()
        .failure()
        .stderr(contains("compiler invocation failed"));
    assert!(!output.exists());
    assert!(dir.path().join("Crate.physics.yml").exists());
}

#[test]
fn material_pairs_are_deduplicated() {
    let dir = TempDir::new().unwrap();
    let params = dir.path().join("params");
    fs::create_dir(&params).unwrap();
    for name in ["a.physics.yml", "b.physics.yml"] {
        fs::write(
            params.join(name),
            "material: Stone\nsub_material: Stone_DgnHeavy\n",
        )
        .unwrap();
    }

    tool()
        .arg("material-pairs")
        .arg(&params)
        .assert()
        .success()
        .stdout(contains("Confirmed material pair number: 1"));
    let output = fs::read_to_string(dir.path().join("confirmed_material_pairs.yml")).unwrap();
    assert!(output.starts_with("Confirmed material pair number: 1\n"));
}

#[test]
fn unknown_command_prints_usage() {
    tool()
        .arg("frobnicate")
        .assert()
        .failure()
        .stderr(contains("Unknown command: frobnicate"))
        .stderr(contains("Usage:"));
}
