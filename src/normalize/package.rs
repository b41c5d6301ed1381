use super::manifest::FileManifest;
use super::resolve::{OptionalDependency, ResolvedDependency, Resolver};
use crate::archive::model::ArchiveRecord;
use crate::error::{AlpmHtmlError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

const PACKAGE_TAR_SUFFIX: &str = ".pkg.tar";
const PAGE_EXTENSION: &str = ".html";

/// Normalized package model handed to the page templates
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PackageRecord {
    pub name: String,
    pub base: String,
    pub version: String,
    pub architecture: String,
    pub url: String,
    pub description: String,
    pub packager: String,
    pub licenses: Vec<String>,
    pub groups: Vec<String>,
    pub provides: Vec<String>,
    pub conflicts: Vec<String>,
    pub replaces: Vec<String>,
    pub backup: Vec<String>,
    pub depends: Vec<ResolvedDependency>,
    pub optdepends: Vec<OptionalDependency>,
    pub compressed_size: u64,
    pub installed_size: u64,
    pub build_date: DateTime<Utc>,
    pub files: FileManifest,
    pub absolute_path: String,
    pub filename: String,
    pub output_path: String,
    pub scriptlet: bool,
}

/// Page file name for a package archive file name.
///
/// `foo-1.2.3-1-x86_64.pkg.tar.zst` becomes `foo-1.2.3-1-x86_64.html`:
/// directories and the final extension are dropped, then the `.pkg.tar`
/// that remains.
pub fn output_path(archive_filename: &str) -> String {
    let basename = archive_filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(archive_filename);

    // A leading dot does not start an extension
    let stem = match basename.rfind('.') {
        Some(idx) if basename[..idx].chars().any(|c| c != '.') => &basename[..idx],
        _ => basename,
    };
    let stem = stem.strip_suffix(PACKAGE_TAR_SUFFIX).unwrap_or(stem);

    format!("{stem}{PAGE_EXTENSION}")
}

impl PackageRecord {
    /// Check the fields every page needs: package name, archive file name
    /// and a representable build date.
    ///
    /// Archives failing this never get a page, so they must not be offered
    /// as link targets either.
    pub fn required_fields<'a>(
        archive: &'a ArchiveRecord,
        source: &Path,
    ) -> Result<(&'a str, &'a str, DateTime<Utc>)> {
        let malformed = |field| AlpmHtmlError::MalformedArchiveMetadata {
            path: source.to_path_buf(),
            field,
        };

        let name = archive
            .name
            .as_deref()
            .filter(|name| !name.is_empty())
            .ok_or_else(|| malformed("pkgname"))?;
        let archive_filename = archive
            .filename
            .as_deref()
            .filter(|filename| !filename.is_empty())
            .ok_or_else(|| malformed("filename"))?;
        let build_date =
            DateTime::from_timestamp(archive.build_date, 0).ok_or_else(|| malformed("builddate"))?;

        Ok((name, archive_filename, build_date))
    }

    /// Build the canonical record for one loaded archive.
    ///
    /// Fails with `MalformedArchiveMetadata` when the package name or the
    /// archive file name is missing, or the build date is out of range.
    pub fn from_archive(
        archive: &ArchiveRecord,
        source: &Path,
        resolver: &Resolver<'_>,
    ) -> Result<Self> {
        let (name, archive_filename, build_date) = Self::required_fields(archive, source)?;
        let name = name.to_string();

        let absolute_path = std::path::absolute(source).unwrap_or_else(|_| source.to_path_buf());
        let filename = source
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| archive_filename.to_string());

        Ok(Self {
            base: archive.base.clone().unwrap_or_else(|| name.clone()),
            name,
            version: archive.version.clone(),
            architecture: archive.architecture.clone(),
            url: archive.url.clone(),
            description: archive.description.clone(),
            packager: archive.packager.clone(),
            licenses: archive.licenses.clone(),
            groups: archive.groups.clone(),
            provides: archive.provides.clone(),
            conflicts: archive.conflicts.clone(),
            replaces: archive.replaces.clone(),
            backup: archive.backup.clone(),
            depends: resolver.resolve_all(&archive.depends),
            optdepends: resolver.resolve_all_optional(&archive.optdepends),
            compressed_size: archive.compressed_size,
            installed_size: archive.installed_size,
            build_date,
            files: FileManifest::from_entries(&archive.files),
            absolute_path: absolute_path.to_string_lossy().into_owned(),
            filename,
            output_path: output_path(archive_filename),
            scriptlet: archive.has_scriptlet,
        })
    }

    /// Name and version, as shown in page titles
    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::model::RawFileEntry;
    use crate::catalog::CatalogIndex;
    use crate::normalize::resolve::{Sibling, SiblingSet};
    use std::path::PathBuf;

    fn archive(name: Option<&str>, filename: Option<&str>) -> ArchiveRecord {
        ArchiveRecord {
            name: name.map(str::to_string),
            base: None,
            version: "1.2.3-1".to_string(),
            architecture: "x86_64".to_string(),
            licenses: vec!["MIT".to_string()],
            depends: vec!["bar".to_string(), "glibc".to_string()],
            optdepends: vec!["python: scripting support".to_string()],
            build_date: 1_700_000_000,
            filename: filename.map(str::to_string),
            files: vec![
                RawFileEntry::new("usr/", 0, 0o40755),
                RawFileEntry::new("usr/bin/foo", 42, 0o100755),
            ],
            has_scriptlet: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_output_path() {
        assert_eq!(
            output_path("foo-1.2.3-1-x86_64.pkg.tar.zst"),
            "foo-1.2.3-1-x86_64.html"
        );
        assert_eq!(output_path("bar-2-1-any.pkg.tar.xz"), "bar-2-1-any.html");
        assert_eq!(output_path("baz-1-1-any.pkg.tar.gz"), "baz-1-1-any.html");
        assert_eq!(output_path("qux-1-1-any.pkg.tar.bz2"), "qux-1-1-any.html");
        assert_eq!(
            output_path("/srv/repo/foo-1.2.3-1-x86_64.pkg.tar.zst"),
            "foo-1.2.3-1-x86_64.html"
        );
    }

    #[test]
    fn test_from_archive() {
        let siblings = SiblingSet::new(vec![Sibling {
            path: PathBuf::from("/repo/bar-2-1-any.pkg.tar.zst"),
            archive: archive(Some("bar"), Some("bar-2-1-any.pkg.tar.zst")),
        }]);
        let catalog = CatalogIndex::default();
        let resolver = Resolver::new(&siblings, &catalog);

        let source = PathBuf::from("/repo/foo-1.2.3-1-x86_64.pkg.tar.zst");
        let record = PackageRecord::from_archive(
            &archive(Some("foo"), Some("foo-1.2.3-1-x86_64.pkg.tar.zst")),
            &source,
            &resolver,
        )
        .unwrap();

        assert_eq!(record.name, "foo");
        assert_eq!(record.base, "foo");
        assert_eq!(record.full_name(), "foo 1.2.3-1");
        assert_eq!(record.filename, "foo-1.2.3-1-x86_64.pkg.tar.zst");
        assert_eq!(record.output_path, "foo-1.2.3-1-x86_64.html");
        assert_eq!(record.absolute_path, "/repo/foo-1.2.3-1-x86_64.pkg.tar.zst");
        assert_eq!(record.build_date.to_rfc3339(), "2023-11-14T22:13:20+00:00");
        assert_eq!(record.depends[0].link.as_deref(), Some("bar-2-1-any.html"));
        assert!(record.depends[1].link.is_none());
        assert_eq!(record.optdepends[0].name, "python");
        assert_eq!(record.optdepends[0].description, "scripting support");
        assert_eq!(record.files.file_count, 1);
        assert_eq!(record.files.dir_count, 1);
        assert_eq!(record.files.entries[1].mode, "0o100755");
        assert!(record.scriptlet);
    }

    #[test]
    fn test_missing_name_is_malformed() {
        let siblings = SiblingSet::default();
        let catalog = CatalogIndex::default();
        let resolver = Resolver::new(&siblings, &catalog);

        let err = PackageRecord::from_archive(
            &archive(None, Some("foo-1-1-any.pkg.tar.zst")),
            Path::new("/repo/foo-1-1-any.pkg.tar.zst"),
            &resolver,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            AlpmHtmlError::MalformedArchiveMetadata { field: "pkgname", .. }
        ));
    }

    #[test]
    fn test_missing_filename_is_malformed() {
        let siblings = SiblingSet::default();
        let catalog = CatalogIndex::default();
        let resolver = Resolver::new(&siblings, &catalog);

        let err = PackageRecord::from_archive(
            &archive(Some("foo"), None),
            Path::new("/repo/foo-1-1-any.pkg.tar.zst"),
            &resolver,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            AlpmHtmlError::MalformedArchiveMetadata { field: "filename", .. }
        ));
    }

    #[test]
    fn test_out_of_range_build_date_is_malformed() {
        let mut record = archive(Some("foo"), Some("foo-1-1-any.pkg.tar.zst"));
        record.build_date = i64::MAX;

        let err =
            PackageRecord::required_fields(&record, Path::new("/repo/foo-1-1-any.pkg.tar.zst"))
                .unwrap_err();
        assert!(matches!(
            err,
            AlpmHtmlError::MalformedArchiveMetadata { field: "builddate", .. }
        ));
    }
}
