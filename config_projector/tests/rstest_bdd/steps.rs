//! Step definitions for projection scenarios.

use crate::fixtures::ProjectionContext;
use anyhow::{Result, anyhow, ensure};
use config_projector::{ConfigBundle, ContentRoot, Manifest, ProjectionResult};
use rstest_bdd_macros::{given, then, when};
use test_helpers::text::{normalize_scalar, unescape};
use test_helpers::tree::ContentTree;

fn ensure_tree(ctx: &ProjectionContext) -> Result<()> {
    if ctx.tree.is_empty() {
        ctx.tree.set(ContentTree::new()?);
    }
    Ok(())
}

fn manifest_yaml(ctx: &ProjectionContext) -> String {
    let sources = ctx.sources.take().unwrap_or_default();
    let mut yaml = String::from("name: demo\nnamespace: tests\ndata:\n");
    for source in &sources {
        yaml.push_str("  - ");
        yaml.push_str(source);
        yaml.push('\n');
    }
    yaml
}

fn load(ctx: &ProjectionContext) -> ProjectionResult<Manifest> {
    Manifest::from_yaml_str(&manifest_yaml(ctx))
}

#[given("a file {path} containing {contents}")]
fn file_containing(
    projection_context: &ProjectionContext,
    path: String,
    contents: String,
) -> Result<()> {
    ensure_tree(projection_context)?;
    let relative = normalize_scalar(&path);
    let body = unescape(&normalize_scalar(&contents));
    projection_context
        .tree
        .with_ref(|tree| tree.write(&relative, &body))
        .ok_or_else(|| anyhow!("content tree unavailable"))?
}

#[given("a source {entry}")]
fn source_entry(projection_context: &ProjectionContext, entry: String) -> Result<()> {
    let normalised = normalize_scalar(&entry);
    ensure!(
        normalised.starts_with('{'),
        "source entries must be flow mappings: {normalised}"
    );
    projection_context
        .sources
        .get_or_insert_with(Vec::new)
        .push(normalised);
    Ok(())
}

#[when("the manifest is loaded")]
fn manifest_loaded(projection_context: &ProjectionContext) {
    let loaded = load(projection_context);
    projection_context.loaded.set(loaded);
}

#[when("the manifest is projected")]
fn manifest_projected(projection_context: &ProjectionContext) -> Result<()> {
    ensure_tree(projection_context)?;
    let manifest = load(projection_context)?;
    let outcome = projection_context
        .tree
        .with_ref(|tree| ContentRoot::open(tree.path()).and_then(|root| manifest.project(&root)))
        .ok_or_else(|| anyhow!("content tree unavailable"))?;
    projection_context.projected.set(outcome);
    Ok(())
}

fn bundle(ctx: &ProjectionContext) -> Result<ConfigBundle> {
    let outcome = ctx
        .projected
        .take()
        .ok_or_else(|| anyhow!("manifest was not projected"))?;
    Ok(outcome?)
}

#[then("the manifest is accepted")]
fn manifest_accepted(projection_context: &ProjectionContext) -> Result<()> {
    let loaded = projection_context
        .loaded
        .take()
        .ok_or_else(|| anyhow!("manifest was not loaded"))?;
    loaded?;
    Ok(())
}

#[then("loading fails with {variant}")]
fn loading_fails(projection_context: &ProjectionContext, variant: String) -> Result<()> {
    let loaded = projection_context
        .loaded
        .take()
        .ok_or_else(|| anyhow!("manifest was not loaded"))?;
    let err = loaded
        .err()
        .ok_or_else(|| anyhow!("expected loading to fail"))?;
    let debug = format!("{err:?}");
    ensure!(
        debug.starts_with(&normalize_scalar(&variant)),
        "expected {variant}, got {debug}"
    );
    Ok(())
}

#[then("projection fails with {variant}")]
fn projection_fails(projection_context: &ProjectionContext, variant: String) -> Result<()> {
    let outcome = projection_context
        .projected
        .take()
        .ok_or_else(|| anyhow!("manifest was not projected"))?;
    let err = outcome
        .err()
        .ok_or_else(|| anyhow!("expected projection to fail"))?;
    let debug = format!("{err:?}");
    ensure!(
        debug.starts_with(&normalize_scalar(&variant)),
        "expected {variant}, got {debug}"
    );
    Ok(())
}

#[then("the bundle holds {key} with {contents}")]
fn bundle_holds(
    projection_context: &ProjectionContext,
    key: String,
    contents: String,
) -> Result<()> {
    let projected = bundle(projection_context)?;
    let wanted = normalize_scalar(&key);
    let actual = projected
        .data()
        .get(&wanted)
        .ok_or_else(|| anyhow!("bundle has no key {wanted}"))?;
    let expected = unescape(&normalize_scalar(&contents));
    ensure!(*actual == expected, "expected {expected:?}, got {actual:?}");
    Ok(())
}

#[then("the bundle keys are {keys}")]
fn bundle_keys(projection_context: &ProjectionContext, keys: String) -> Result<()> {
    let projected = bundle(projection_context)?;
    let actual: Vec<&str> = projected.data().keys().map(String::as_str).collect();
    let normalised = normalize_scalar(&keys);
    let expected: Vec<&str> = normalised
        .split(',')
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .collect();
    ensure!(actual == expected, "expected keys {expected:?}, got {actual:?}");
    Ok(())
}
