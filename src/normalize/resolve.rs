use crate::archive::model::ArchiveRecord;
use crate::catalog::CatalogIndex;
use crate::normalize::package::output_path;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// A dependency name with its cross-reference, if any
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResolvedDependency {
    pub name: String,
    pub link: Option<String>,
}

/// An optional dependency: `name[: description]` split and resolved
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OptionalDependency {
    pub name: String,
    pub description: String,
    pub link: Option<String>,
}

/// A package loaded from the input directory during this run
#[derive(Debug, Clone)]
pub struct Sibling {
    pub path: PathBuf,
    pub archive: ArchiveRecord,
}

/// All packages loaded in this run, in file-name order.
///
/// Frozen on construction: the name lookup is computed once and never
/// changes, so every resolution sees the complete set.
#[derive(Debug, Clone, Default)]
pub struct SiblingSet {
    siblings: Vec<Sibling>,
    pages: HashMap<String, String>,
}

impl SiblingSet {
    pub fn new(siblings: Vec<Sibling>) -> Self {
        let mut pages = HashMap::new();
        for sibling in &siblings {
            let (Some(name), Some(filename)) = (&sibling.archive.name, &sibling.archive.filename)
            else {
                continue;
            };
            // First package in file-name order owns the name
            pages
                .entry(name.clone())
                .or_insert_with(|| output_path(filename));
        }

        Self { siblings, pages }
    }

    /// Output page of the sibling called `name`
    pub fn page_for(&self, name: &str) -> Option<&str> {
        self.pages.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sibling> {
        self.siblings.iter()
    }

    pub fn len(&self) -> usize {
        self.siblings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.siblings.is_empty()
    }
}

/// Split an optional dependency string on its first colon.
///
/// The description is trimmed; the name is returned as written.
pub fn parse_optdepend(value: &str) -> (&str, &str) {
    match value.split_once(':') {
        Some((name, description)) => (name, description.trim()),
        None => (value, ""),
    }
}

/// Cross-references dependency names against the sibling packages first and
/// the official catalog second.
///
/// Names are compared exactly as given; version constraints are not
/// stripped, so `glibc>=2.38` only matches a package literally named that.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    siblings: &'a SiblingSet,
    catalog: &'a CatalogIndex,
}

impl<'a> Resolver<'a> {
    pub fn new(siblings: &'a SiblingSet, catalog: &'a CatalogIndex) -> Self {
        Self { siblings, catalog }
    }

    /// Link target for `name`, `None` when unresolved
    pub fn link(&self, name: &str) -> Option<String> {
        if let Some(page) = self.siblings.page_for(name) {
            return Some(page.to_string());
        }
        self.catalog.link(name)
    }

    pub fn resolve(&self, name: &str) -> ResolvedDependency {
        ResolvedDependency {
            name: name.to_string(),
            link: self.link(name),
        }
    }

    pub fn resolve_optional(&self, value: &str) -> OptionalDependency {
        let (name, description) = parse_optdepend(value);
        OptionalDependency {
            name: name.to_string(),
            description: description.to_string(),
            link: self.link(name),
        }
    }

    pub fn resolve_all<S: AsRef<str>>(&self, names: &[S]) -> Vec<ResolvedDependency> {
        names.iter().map(|name| self.resolve(name.as_ref())).collect()
    }

    pub fn resolve_all_optional<S: AsRef<str>>(&self, values: &[S]) -> Vec<OptionalDependency> {
        values
            .iter()
            .map(|value| self.resolve_optional(value.as_ref()))
            .collect()
    }
}
