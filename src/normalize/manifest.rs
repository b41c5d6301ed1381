use crate::archive::model::RawFileEntry;
use serde::{Deserialize, Serialize};

/// One installed path, as listed on the package page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileEntry {
    pub name: String,
    pub size_bytes: u64,
    /// Octal mode in Rust's alternate form, e.g. `0o100644`
    pub mode: String,
}

/// File listing of one package with file/directory counts
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileManifest {
    pub file_count: usize,
    pub dir_count: usize,
    pub entries: Vec<FileEntry>,
}

impl FileManifest {
    /// Aggregate raw archive entries, keeping archive order.
    ///
    /// Entries whose path ends in `/` count as directories. Paths are passed
    /// through untouched.
    pub fn from_entries<'a, I>(raw: I) -> Self
    where
        I: IntoIterator<Item = &'a RawFileEntry>,
    {
        let mut manifest = Self::default();

        for entry in raw {
            if entry.path.ends_with('/') {
                manifest.dir_count += 1;
            } else {
                manifest.file_count += 1;
            }
            manifest.entries.push(FileEntry {
                name: entry.path.clone(),
                size_bytes: entry.size,
                mode: format!("{:#o}", entry.mode),
            });
        }

        manifest
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
