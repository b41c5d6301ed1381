use crate::catalog::model::{CatalogEntry, CatalogRepository};
use crate::catalog::syncdb::CatalogProvider;
use crate::error::Result;
use std::collections::HashMap;
use tracing::{debug, info};

/// Name lookup over the packages of the official repositories.
///
/// Built once per run and read-only afterwards. When a name exists in more
/// than one allowed repository, the repository listed first in the
/// allow-list wins.
#[derive(Debug, Clone, Default)]
pub struct CatalogIndex {
    entries: HashMap<String, CatalogEntry>,
    base_url: String,
}

impl CatalogIndex {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            entries: HashMap::new(),
            base_url: base_url.into(),
        }
    }

    /// Build the index from a provider, keeping allow-listed repositories only
    pub fn build<P: CatalogProvider + ?Sized>(
        provider: &P,
        allow_list: &[String],
        base_url: &str,
    ) -> Result<Self> {
        let repositories = provider.list_repositories()?;
        let index = Self::from_repositories(&repositories, allow_list, base_url);

        info!(
            packages = index.len(),
            repositories = ?allow_list,
            "Built catalog index"
        );

        Ok(index)
    }

    pub fn from_repositories(
        repositories: &[CatalogRepository],
        allow_list: &[String],
        base_url: &str,
    ) -> Self {
        let mut index = Self::new(base_url);

        for allowed in allow_list {
            for repo in repositories.iter().filter(|r| &r.name == allowed) {
                for package in &repo.packages {
                    index
                        .entries
                        .entry(package.name.clone())
                        .or_insert_with(|| CatalogEntry {
                            repository_name: repo.name.clone(),
                            architecture: package.architecture.clone(),
                            package_name: package.name.clone(),
                        });
                }
            }
        }

        for repo in repositories.iter().filter(|r| !allow_list.contains(&r.name)) {
            debug!(repo = %repo.name, "Ignoring repository outside the official set");
        }

        index
    }

    pub fn get(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.get(name)
    }

    /// External link for `name`, if the catalog knows it
    pub fn link(&self, name: &str) -> Option<String> {
        self.get(name).map(|entry| entry.url(&self.base_url))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::model::CatalogPackage;

    const BASE: &str = "https://archlinux.org/packages";

    fn repo(name: &str, packages: &[(&str, &str)]) -> CatalogRepository {
        CatalogRepository {
            name: name.to_string(),
            packages: packages
                .iter()
                .map(|(name, arch)| CatalogPackage {
                    name: name.to_string(),
                    architecture: arch.to_string(),
                })
                .collect(),
        }
    }

    fn allow(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_only_allowed_repositories() {
        let repos = vec![
            repo("core", &[("bash", "x86_64")]),
            repo("chaotic-aur", &[("yay", "x86_64")]),
        ];
        let index = CatalogIndex::from_repositories(&repos, &allow(&["core", "extra"]), BASE);

        assert_eq!(index.len(), 1);
        assert!(index.get("yay").is_none());
        assert_eq!(
            index.link("bash").as_deref(),
            Some("https://archlinux.org/packages/core/x86_64/bash/")
        );
    }

    #[test]
    fn test_allow_list_order_decides_duplicates() {
        // extra enumerated first, but core has priority in the allow-list
        let repos = vec![
            repo("extra", &[("openssl", "x86_64")]),
            repo("core", &[("openssl", "x86_64")]),
        ];
        let index = CatalogIndex::from_repositories(&repos, &allow(&["core", "extra"]), BASE);
        assert_eq!(index.get("openssl").unwrap().repository_name, "core");

        let index = CatalogIndex::from_repositories(&repos, &allow(&["extra", "core"]), BASE);
        assert_eq!(index.get("openssl").unwrap().repository_name, "extra");
    }

    #[test]
    fn test_unknown_name_has_no_link() {
        let index = CatalogIndex::new(BASE);
        assert!(index.is_empty());
        assert!(index.link("anything").is_none());
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let repos = vec![repo("extra", &[("tzdata", "any")])];
        let index = CatalogIndex::from_repositories(
            &repos,
            &allow(&["extra"]),
            "https://mirror.example/packages/",
        );
        assert_eq!(
            index.link("tzdata").as_deref(),
            Some("https://mirror.example/packages/extra/any/tzdata/")
        );
    }
}
