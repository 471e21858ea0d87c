use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const VAX_DIR: &str = ".vax";
pub const CONFIG_FILE: &str = ".vax/config.yaml";
pub const DEFAULT_CATALOG_FILE: &str = "catalog.yaml";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn vax_dir(root: &Path) -> PathBuf {
    root.join(VAX_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// Resolve a catalog path from config. Relative paths are taken from `.vax/`.
pub fn catalog_path(root: &Path, configured: &Path) -> PathBuf {
    if configured.is_absolute() {
        configured.to_path_buf()
    } else {
        vax_dir(root).join(configured)
    }
}
