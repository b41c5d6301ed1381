use serde::{Deserialize, Serialize};

/// One tar member as listed by the package: `(path, size, mode)`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawFileEntry {
    /// Path relative to the install root; directories end with `/`
    pub path: String,
    pub size: u64,
    /// Mode bits including the file-type bits (e.g. `0o100644`)
    pub mode: u32,
}

impl RawFileEntry {
    pub fn new(path: impl Into<String>, size: u64, mode: u32) -> Self {
        Self {
            path: path.into(),
            size,
            mode,
        }
    }
}

/// Raw package metadata as read from a `.pkg.tar.*` archive
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArchiveRecord {
    pub name: Option<String>,
    pub base: Option<String>,
    pub version: String,
    pub description: String,
    pub url: String,
    pub packager: String,
    pub architecture: String,
    pub licenses: Vec<String>,
    pub groups: Vec<String>,
    pub provides: Vec<String>,
    /// Dependency names, possibly carrying version constraints (`glibc>=2.38`)
    pub depends: Vec<String>,
    /// `name[: description]` strings
    pub optdepends: Vec<String>,
    pub conflicts: Vec<String>,
    pub replaces: Vec<String>,
    pub backup: Vec<String>,
    /// Size of the archive on disk
    pub compressed_size: u64,
    pub installed_size: u64,
    /// Seconds since the Unix epoch
    pub build_date: i64,
    /// Basename of the archive file
    pub filename: Option<String>,
    pub files: Vec<RawFileEntry>,
    pub has_scriptlet: bool,
}
