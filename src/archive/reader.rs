use crate::archive::compression::auto_decompress;
use crate::archive::model::{ArchiveRecord, RawFileEntry};
use crate::archive::pkginfo::apply_pkginfo;
use crate::error::{AlpmHtmlError, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tar::{Archive, EntryType};
use tracing::debug;

const S_IFREG: u32 = 0o100000;
const S_IFDIR: u32 = 0o040000;
const S_IFLNK: u32 = 0o120000;
const S_IFCHR: u32 = 0o020000;
const S_IFBLK: u32 = 0o060000;
const S_IFIFO: u32 = 0o010000;

/// Source of package metadata
pub trait ArchiveReader {
    fn load(&self, path: &Path) -> Result<ArchiveRecord>;
}

/// Reads `.pkg.tar.{zst,xz,gz,bz2}` archives built by makepkg
#[derive(Debug, Default, Clone, Copy)]
pub struct PackageArchiveReader;

impl PackageArchiveReader {
    pub fn new() -> Self {
        Self
    }

    fn unreadable(path: &Path, reason: impl std::fmt::Display) -> AlpmHtmlError {
        AlpmHtmlError::ArchiveUnreadable {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }

    /// Type bits as libarchive reports them alongside the permission bits
    fn type_bits(entry_type: EntryType) -> u32 {
        match entry_type {
            EntryType::Directory => S_IFDIR,
            EntryType::Symlink => S_IFLNK,
            EntryType::Char => S_IFCHR,
            EntryType::Block => S_IFBLK,
            EntryType::Fifo => S_IFIFO,
            _ => S_IFREG,
        }
    }

    /// Package metadata members (`.PKGINFO`, `.MTREE`, ...) live at the root
    /// and start with a dot; they are not part of the installed file list.
    fn is_metadata_member(path: &str) -> bool {
        path.starts_with('.') && !path.trim_end_matches('/').contains('/')
    }
}

impl ArchiveReader for PackageArchiveReader {
    fn load(&self, path: &Path) -> Result<ArchiveRecord> {
        debug!(path = %path.display(), "Loading package archive");

        let file = File::open(path).map_err(|e| Self::unreadable(path, e))?;
        let compressed_size = file
            .metadata()
            .map_err(|e| Self::unreadable(path, e))?
            .len();
        let reader = auto_decompress(file).map_err(|e| Self::unreadable(path, e))?;
        let mut archive = Archive::new(reader);

        let mut record = ArchiveRecord {
            compressed_size,
            filename: path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned()),
            ..Default::default()
        };
        let mut pkginfo = None;

        let entries = archive.entries().map_err(|e| Self::unreadable(path, e))?;
        for entry in entries {
            let mut entry = entry.map_err(|e| Self::unreadable(path, e))?;
            let mut entry_path = String::from_utf8_lossy(&entry.path_bytes()).into_owned();
            if let Some(stripped) = entry_path.strip_prefix("./") {
                entry_path = stripped.to_string();
            }
            if entry_path.is_empty() {
                continue;
            }

            if Self::is_metadata_member(&entry_path) {
                match entry_path.as_str() {
                    ".PKGINFO" => {
                        let mut content = String::new();
                        entry
                            .read_to_string(&mut content)
                            .map_err(|e| Self::unreadable(path, e))?;
                        pkginfo = Some(content);
                    }
                    ".INSTALL" => record.has_scriptlet = true,
                    _ => {}
                }
                continue;
            }

            let header = entry.header();
            let entry_type = header.entry_type();
            let permissions = header.mode().map_err(|e| Self::unreadable(path, e))?;
            let size = header.size().map_err(|e| Self::unreadable(path, e))?;

            if entry_type.is_dir() && !entry_path.ends_with('/') {
                entry_path.push('/');
            }

            record.files.push(RawFileEntry::new(
                entry_path,
                size,
                Self::type_bits(entry_type) | (permissions & 0o7777),
            ));
        }

        let pkginfo =
            pkginfo.ok_or_else(|| Self::unreadable(path, "no .PKGINFO member in archive"))?;
        apply_pkginfo(&mut record, &pkginfo);

        if record.base.is_none() {
            record.base = record.name.clone();
        }

        debug!(
            name = ?record.name,
            files = record.files.len(),
            scriptlet = record.has_scriptlet,
            "Loaded package archive"
        );

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn append_file(builder: &mut tar::Builder<Vec<u8>>, path: &str, mode: u32, data: &[u8]) {
        let mut header = tar::Header::new_gnu();
        header.set_entry_type(EntryType::Regular);
        header.set_size(data.len() as u64);
        header.set_mode(mode);
        header.set_mtime(0);
        builder.append_data(&mut header, path, data).unwrap();
    }

    fn append_dir(builder: &mut tar::Builder<Vec<u8>>, path: &str) {
        let mut header = tar::Header::new_gnu();
        header.set_entry_type(EntryType::Directory);
        header.set_size(0);
        header.set_mode(0o755);
        header.set_mtime(0);
        builder.append_data(&mut header, path, std::io::empty()).unwrap();
    }

    fn build_package(with_pkginfo: bool, with_install: bool) -> Vec<u8> {
        let mut builder = tar::Builder::new(Vec::new());
        if with_pkginfo {
            append_file(
                &mut builder,
                ".PKGINFO",
                0o644,
                b"pkgname = hello\npkgver = 2.12-1\narch = x86_64\ndepend = glibc\n",
            );
        }
        append_file(&mut builder, ".MTREE", 0o644, b"");
        if with_install {
            append_file(&mut builder, ".INSTALL", 0o644, b"post_install() {\n  true\n}\n");
        }
        append_dir(&mut builder, "usr/");
        append_dir(&mut builder, "usr/bin");
        append_file(&mut builder, "usr/bin/hello", 0o755, b"#!/bin/sh\necho hi\n");
        builder.into_inner().unwrap()
    }

    #[test]
    fn test_load_zstd_package() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hello-2.12-1-x86_64.pkg.tar.zst");
        let compressed = zstd::encode_all(&build_package(true, true)[..], 3).unwrap();
        std::fs::write(&path, &compressed).unwrap();

        let record = PackageArchiveReader::new().load(&path).unwrap();

        assert_eq!(record.name.as_deref(), Some("hello"));
        assert_eq!(record.base.as_deref(), Some("hello"));
        assert_eq!(record.version, "2.12-1");
        assert_eq!(record.depends, vec!["glibc"]);
        assert_eq!(
            record.filename.as_deref(),
            Some("hello-2.12-1-x86_64.pkg.tar.zst")
        );
        assert_eq!(record.compressed_size, compressed.len() as u64);
        assert!(record.has_scriptlet);

        let paths: Vec<&str> = record.files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["usr/", "usr/bin/", "usr/bin/hello"]);
        assert_eq!(record.files[0].mode, 0o40755);
        assert_eq!(record.files[2].mode, 0o100755);
        assert_eq!(record.files[2].size, 18);
    }

    #[test]
    fn test_load_without_install_script() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hello-2.12-1-x86_64.pkg.tar");
        std::fs::write(&path, build_package(true, false)).unwrap();

        let record = PackageArchiveReader::new().load(&path).unwrap();
        assert!(!record.has_scriptlet);
    }

    #[test]
    fn test_missing_pkginfo_is_unreadable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken-1-1-any.pkg.tar.zst");
        let compressed = zstd::encode_all(&build_package(false, false)[..], 3).unwrap();
        std::fs::write(&path, compressed).unwrap();

        let err = PackageArchiveReader::new().load(&path).unwrap_err();
        assert!(matches!(err, AlpmHtmlError::ArchiveUnreadable { .. }));
    }

    #[test]
    fn test_garbage_is_unreadable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("garbage-1-1-any.pkg.tar.zst");
        std::fs::write(&path, [0x28, 0xb5, 0x2f, 0xfd, 0x01, 0x02, 0x03]).unwrap();

        let err = PackageArchiveReader::new().load(&path).unwrap_err();
        assert!(err.is_per_package());
    }

    #[test]
    fn test_metadata_member_detection() {
        assert!(PackageArchiveReader::is_metadata_member(".PKGINFO"));
        assert!(PackageArchiveReader::is_metadata_member(".BUILDINFO"));
        assert!(!PackageArchiveReader::is_metadata_member("usr/.hidden"));
        assert!(!PackageArchiveReader::is_metadata_member(".config/app/rc"));
    }
}
