use crate::archive::compression::auto_decompress;
use crate::catalog::model::{CatalogPackage, CatalogRepository};
use crate::error::{AlpmHtmlError, Result};
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use tar::Archive;
use tracing::{debug, info};

const SYNC_DB_EXTENSION: &str = "db";

/// Source of the external package catalog
pub trait CatalogProvider {
    fn list_repositories(&self) -> Result<Vec<CatalogRepository>>;
}

/// Reads pacman sync databases (`<dbpath>/sync/<repo>.db`)
#[derive(Debug, Clone)]
pub struct SyncDbCatalog {
    sync_dir: PathBuf,
}

impl SyncDbCatalog {
    pub fn new(sync_dir: impl Into<PathBuf>) -> Self {
        Self {
            sync_dir: sync_dir.into(),
        }
    }

    fn unavailable(path: &Path, reason: impl std::fmt::Display) -> AlpmHtmlError {
        AlpmHtmlError::CatalogUnavailable(format!("{}: {}", path.display(), reason))
    }

    /// Sync database files, sorted by file name
    fn database_files(&self) -> Result<Vec<PathBuf>> {
        let entries =
            fs::read_dir(&self.sync_dir).map_err(|e| Self::unavailable(&self.sync_dir, e))?;

        let mut files = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| Self::unavailable(&self.sync_dir, e))?.path();
            if path.is_file()
                && path.extension().and_then(|ext| ext.to_str()) == Some(SYNC_DB_EXTENSION)
            {
                files.push(path);
            }
        }
        files.sort();

        Ok(files)
    }

    /// Read every `<pkg>-<ver>/desc` member of one sync database
    fn read_database(path: &Path) -> Result<Vec<CatalogPackage>> {
        let file = File::open(path).map_err(|e| Self::unavailable(path, e))?;
        let reader = auto_decompress(file).map_err(|e| Self::unavailable(path, e))?;
        let mut archive = Archive::new(reader);

        let mut packages = Vec::new();
        for entry in archive.entries().map_err(|e| Self::unavailable(path, e))? {
            let mut entry = entry.map_err(|e| Self::unavailable(path, e))?;
            let is_desc = entry.path_bytes().ends_with(b"/desc");
            if !is_desc {
                continue;
            }

            let mut content = String::new();
            entry
                .read_to_string(&mut content)
                .map_err(|e| Self::unavailable(path, e))?;

            match parse_desc(&content) {
                Some(package) => packages.push(package),
                None => debug!(db = %path.display(), "Skipping desc entry without %NAME%"),
            }
        }

        Ok(packages)
    }
}

impl CatalogProvider for SyncDbCatalog {
    fn list_repositories(&self) -> Result<Vec<CatalogRepository>> {
        let mut repositories = Vec::new();

        for path in self.database_files()? {
            let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            let packages = Self::read_database(&path)?;
            debug!(repo = name, packages = packages.len(), "Read sync database");

            repositories.push(CatalogRepository {
                name: name.to_string(),
                packages,
            });
        }

        info!(
            sync_dir = %self.sync_dir.display(),
            repositories = repositories.len(),
            "Loaded sync databases"
        );

        Ok(repositories)
    }
}

/// Parse the `%NAME%` and `%ARCH%` blocks of a sync database `desc` file
pub fn parse_desc(content: &str) -> Option<CatalogPackage> {
    let mut name = None;
    let mut architecture = String::new();
    let mut section = "";

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            section = "";
            continue;
        }
        if line.len() > 2 && line.starts_with('%') && line.ends_with('%') {
            section = line;
            continue;
        }

        match section {
            "%NAME%" if name.is_none() => name = Some(line.to_string()),
            "%ARCH%" if architecture.is_empty() => architecture = line.to_string(),
            _ => {}
        }
    }

    name.map(|name| CatalogPackage { name, architecture })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_sync_db(path: &Path, packages: &[(&str, &str)]) {
        let mut builder = tar::Builder::new(Vec::new());
        for (name, arch) in packages {
            let desc = format!(
                "%FILENAME%\n{name}-1-1-{arch}.pkg.tar.zst\n\n%NAME%\n{name}\n\n%VERSION%\n1-1\n\n%ARCH%\n{arch}\n\n"
            );
            let mut header = tar::Header::new_gnu();
            header.set_size(desc.len() as u64);
            header.set_mode(0o644);
            header.set_mtime(0);
            builder
                .append_data(&mut header, format!("{name}-1-1/desc"), desc.as_bytes())
                .unwrap();
        }
        let tar = builder.into_inner().unwrap();

        let mut encoder =
            flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(&tar).unwrap();
        fs::write(path, encoder.finish().unwrap()).unwrap();
    }

    #[test]
    fn test_parse_desc() {
        let content = "%FILENAME%\nbash-5.2-1-x86_64.pkg.tar.zst\n\n%NAME%\nbash\n\n%BASE%\nbash\n\n%ARCH%\nx86_64\n";
        let package = parse_desc(content).unwrap();
        assert_eq!(package.name, "bash");
        assert_eq!(package.architecture, "x86_64");
    }

    #[test]
    fn test_parse_desc_without_name() {
        assert!(parse_desc("%ARCH%\nany\n").is_none());
    }

    #[test]
    fn test_list_repositories_sorted() {
        let dir = TempDir::new().unwrap();
        write_sync_db(&dir.path().join("extra.db"), &[("python", "x86_64")]);
        write_sync_db(
            &dir.path().join("core.db"),
            &[("bash", "x86_64"), ("tzdata", "any")],
        );
        fs::write(dir.path().join("core.db.sig"), b"sig").unwrap();

        let repos = SyncDbCatalog::new(dir.path()).list_repositories().unwrap();
        let names: Vec<&str> = repos.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["core", "extra"]);
        assert_eq!(repos[0].packages.len(), 2);
        assert_eq!(repos[0].packages[1].architecture, "any");
    }

    #[test]
    fn test_missing_sync_dir_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let err = SyncDbCatalog::new(dir.path().join("missing"))
            .list_repositories()
            .unwrap_err();
        assert!(matches!(err, AlpmHtmlError::CatalogUnavailable(_)));
    }
}
