use serde::{Deserialize, Serialize};

/// A package known to a sync database
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogPackage {
    pub name: String,
    pub architecture: String,
}

/// One repository as enumerated by a catalog provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogRepository {
    pub name: String,
    pub packages: Vec<CatalogPackage>,
}

/// Where a package lives in the official catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogEntry {
    pub repository_name: String,
    pub architecture: String,
    pub package_name: String,
}

impl CatalogEntry {
    /// Package page URL below `base_url`, e.g.
    /// `https://archlinux.org/packages/core/x86_64/bash/`
    pub fn url(&self, base_url: &str) -> String {
        format!(
            "{}/{}/{}/{}/",
            base_url.trim_end_matches('/'),
            self.repository_name,
            self.architecture,
            self.package_name
        )
    }
}
