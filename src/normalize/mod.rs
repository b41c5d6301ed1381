pub mod manifest;
pub mod package;
pub mod resolve;

pub use manifest::{FileEntry, FileManifest};
pub use package::{output_path, PackageRecord};
pub use resolve::{
    parse_optdepend, OptionalDependency, ResolvedDependency, Resolver, Sibling, SiblingSet,
};
