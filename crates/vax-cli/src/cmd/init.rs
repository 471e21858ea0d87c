use anyhow::Context;
use std::path::Path;
use vax_core::catalog::Catalog;
use vax_core::config::Config;
use vax_core::io::{self, FileStatus};
use vax_core::paths;

fn report(root: &Path, path: &Path, status: FileStatus) {
    let shown = path.strip_prefix(root).unwrap_or(path);
    println!("  {} {}", status.label(), shown.display());
}

pub fn run(root: &Path) -> anyhow::Result<()> {
    println!("Initializing vax in: {}", root.display());

    let config_path = paths::config_path(root);
    let defaults = serde_yaml::to_string(&Config::default())?;
    let status = io::seed_file(&config_path, defaults.as_bytes())
        .with_context(|| format!("failed to write {}", config_path.display()))?;
    report(root, &config_path, status);

    // An existing config may point the catalog somewhere else.
    let config = Config::load(root).context("failed to load config")?;
    let catalog_path = config.catalog_path(root);
    let status = io::seed_file(&catalog_path, Catalog::sample_yaml().as_bytes())
        .with_context(|| format!("failed to write {}", catalog_path.display()))?;
    report(root, &catalog_path, status);

    println!("\nvax initialized. Run 'vax serve' to accept a client.");
    Ok(())
}
