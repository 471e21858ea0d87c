use crate::error::Result;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Outcome of seeding a managed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Created,
    Exists,
}

impl FileStatus {
    pub fn label(self) -> &'static str {
        match self {
            FileStatus::Created => "created:",
            FileStatus::Exists => "exists: ",
        }
    }
}

/// Replace `path` in one rename. Missing parent directories are created.
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;
    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Write `data` unless something is already at `path`.
pub fn seed_file(path: &Path, data: &[u8]) -> Result<FileStatus> {
    if path.exists() {
        return Ok(FileStatus::Exists);
    }
    write_atomic(path, data)?;
    Ok(FileStatus::Created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn write_atomic_creates_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".vax/nested/config.yaml");
        write_atomic(&path, b"version: 1").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "version: 1");
    }

    #[test]
    fn seed_file_keeps_existing_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catalog.yaml");
        std::fs::write(&path, b"- edited").unwrap();
        assert_eq!(seed_file(&path, b"[]").unwrap(), FileStatus::Exists);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "- edited");

        let fresh = dir.path().join("other.yaml");
        assert_eq!(seed_file(&fresh, b"[]").unwrap(), FileStatus::Created);
    }
}
