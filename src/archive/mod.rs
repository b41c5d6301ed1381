pub mod compression;
pub mod model;
pub mod pkginfo;
pub mod reader;

pub use model::{ArchiveRecord, RawFileEntry};
pub use reader::{ArchiveReader, PackageArchiveReader};

/// Infix present in every package archive file name
pub const PACKAGE_INFIX: &str = ".pkg.tar.";

/// Suffix of detached signatures sitting next to the archives
pub const SIGNATURE_SUFFIX: &str = ".sig";

/// Whether a directory entry name looks like a package archive
pub fn is_package_file(filename: &str) -> bool {
    filename.contains(PACKAGE_INFIX) && !filename.ends_with(SIGNATURE_SUFFIX)
}
