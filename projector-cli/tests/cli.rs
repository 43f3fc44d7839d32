//! End-to-end tests driving the compiled `config-projector` binary.

use anyhow::{Result, ensure};
use assert_cmd::Command;
use rstest::{fixture, rstest};
use test_helpers::tree::ContentTree;

const MANIFEST: &str = "\
name: web
namespace: apps
data:
  - source: app.conf
  - source: conf/*.conf
";

fn command() -> Command {
    #[expect(
        deprecated,
        clippy::expect_used,
        reason = "cargo_bin is the standard assert_cmd API and test panics are acceptable"
    )]
    let mut cmd = Command::cargo_bin("config-projector").expect("binary should exist");
    for key in [
        "CONFIG_PROJECTOR_CONFIG_REPO",
        "CONFIG_PROJECTOR_MANIFESTS",
        "CONFIG_PROJECTOR_OUTPUT",
        "CONFIG_PROJECTOR_GENERATION",
        "CONFIG_PROJECTOR_DEBUG",
        "RUST_LOG",
    ] {
        cmd.env_remove(key);
    }
    cmd.env("RUST_BACKTRACE", "0");
    cmd
}

#[fixture]
#[expect(clippy::expect_used, reason = "test panics are acceptable")]
fn tree() -> ContentTree {
    ContentTree::new().expect("create workspace")
}

fn populate(tree: &ContentTree) -> Result<()> {
    tree.write("repo/app.conf", "listen 8080\n")?;
    tree.write("repo/conf/a.conf", "alpha\n")?;
    tree.write("manifests/web.yaml", MANIFEST)?;
    tree.create_dir("out")
}

fn dir_args(tree: &ContentTree) -> Vec<String> {
    let root = tree.path();
    vec![
        String::from("--config-repo"),
        root.join("repo").into_string(),
        String::from("--manifests"),
        root.join("manifests").into_string(),
        String::from("--output"),
        root.join("out").into_string(),
    ]
}

#[rstest]
fn writes_labelled_config_maps(tree: ContentTree) -> Result<()> {
    populate(&tree)?;
    command()
        .args(dir_args(&tree))
        .args(["--generation", "99", "--label-managed-key", "example.com/managed"])
        .assert()
        .success();
    let names = tree.file_names("out")?;
    ensure!(names.len() == 1, "unexpected outputs {names:?}");
    let name = names.concat();
    ensure!(
        name.starts_with("apps--web--") && name.ends_with(".yaml"),
        "unexpected output name {name}"
    );
    let rendered = tree.read_to_string(format!("out/{name}"))?;
    ensure!(
        rendered.contains("config-projector/config-version: '99'"),
        "generation label missing:\n{rendered}"
    );
    ensure!(
        rendered.contains("example.com/managed: 'true'"),
        "managed label missing:\n{rendered}"
    );
    ensure!(rendered.contains("a.conf: alpha"), "glob content missing:\n{rendered}");
    Ok(())
}

#[rstest]
fn settings_file_supplies_directories(tree: ContentTree) -> Result<()> {
    populate(&tree)?;
    let root = tree.path();
    tree.write(
        "settings.toml",
        format!(
            "config_repo = \"{}\"\nmanifests = \"{}\"\noutput = \"{}\"\ngeneration = \"5\"\n",
            root.join("repo"),
            root.join("manifests"),
            root.join("out"),
        ),
    )?;
    command()
        .args(["--config", root.join("settings.toml").as_str()])
        .assert()
        .success();
    ensure!(tree.file_names("out")?.len() == 1, "expected one output");
    Ok(())
}

#[rstest]
fn missing_directories_fail(tree: ContentTree) -> Result<()> {
    populate(&tree)?;
    let output = command()
        .args(["--manifests", tree.path().join("manifests").as_str()])
        .output()?;
    ensure!(!output.status.success(), "run should fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    ensure!(stderr.contains("requires an argument"), "unexpected stderr:\n{stderr}");
    Ok(())
}

#[rstest]
fn invalid_manifests_abort_the_run(tree: ContentTree) -> Result<()> {
    populate(&tree)?;
    tree.write(
        "manifests/bad.yaml",
        "name: bad\nnamespace: apps\ndata:\n  - source: /etc/hosts\n",
    )?;
    let output = command().args(dir_args(&tree)).output()?;
    ensure!(!output.status.success(), "run should fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    ensure!(stderr.contains("bad.yaml"), "error should name the manifest:\n{stderr}");
    ensure!(tree.file_names("out")?.is_empty(), "nothing should be written");
    Ok(())
}

#[rstest]
fn size_limit_is_enforced(tree: ContentTree) -> Result<()> {
    populate(&tree)?;
    let output = command()
        .args(dir_args(&tree))
        .args(["--size-limit", "10"])
        .output()?;
    ensure!(!output.status.success(), "run should fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    ensure!(stderr.contains("exceeding size limit"), "unexpected stderr:\n{stderr}");
    Ok(())
}
