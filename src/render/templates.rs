use crate::error::{AlpmHtmlError, Result};
use crate::normalize::PackageRecord;
use serde::Serialize;
use std::path::Path;
use tera::{Context, Tera};
use tracing::debug;

pub const PACKAGE_TEMPLATE: &str = "package.html.j2";
pub const INDEX_TEMPLATE: &str = "index.html.j2";
pub const STYLESHEET: &str = "archrepo.css";

const BUILTIN_PACKAGE_TEMPLATE: &str = include_str!("../../resources/package.html.j2");
const BUILTIN_INDEX_TEMPLATE: &str = include_str!("../../resources/index.html.j2");
pub(crate) const BUILTIN_STYLESHEET: &str = include_str!("../../resources/archrepo.css");

/// Repository-level strings shown on the index page
#[derive(Debug, Clone, Default, Serialize)]
pub struct RepositoryInfo {
    pub name: String,
    pub url: Option<String>,
    pub description: Option<String>,
    pub key_id: Option<String>,
}

/// `singular` for exactly one item, `plural` otherwise
pub fn pluralize(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        singular.to_string()
    } else {
        plural.to_string()
    }
}

/// HTML escaping that leaves `/` alone so URLs in attributes stay readable
fn escape_html(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '"' => output.push_str("&quot;"),
            '\'' => output.push_str("&#x27;"),
            _ => output.push(c),
        }
    }
    output
}

/// Flatten a tera error and its causes into one message
fn template_error(err: tera::Error) -> AlpmHtmlError {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(&err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    AlpmHtmlError::Template(message)
}

/// Renders package and index pages from the two Jinja-style templates
#[derive(Debug)]
pub struct PageRenderer {
    tera: Tera,
}

impl PageRenderer {
    /// Renderer over the templates compiled into the binary
    pub fn builtin() -> Result<Self> {
        Self::from_sources(BUILTIN_PACKAGE_TEMPLATE, BUILTIN_INDEX_TEMPLATE)
    }

    /// Renderer over `package.html.j2` and `index.html.j2` in `dir`
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let read = |name: &str| {
            let path = dir.join(name);
            std::fs::read_to_string(&path).map_err(|e| {
                AlpmHtmlError::Config(format!("Cannot read template {}: {}", path.display(), e))
            })
        };
        let package = read(PACKAGE_TEMPLATE)?;
        let index = read(INDEX_TEMPLATE)?;

        debug!(resources = %dir.display(), "Loaded templates");
        Self::from_sources(&package, &index)
    }

    pub fn from_sources(package: &str, index: &str) -> Result<Self> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![".html.j2"]);
        tera.set_escape_fn(escape_html);
        tera.add_raw_templates(vec![(PACKAGE_TEMPLATE, package), (INDEX_TEMPLATE, index)])
            .map_err(template_error)?;
        Ok(Self { tera })
    }

    pub fn render_package(&self, record: &PackageRecord, repo_name: &str) -> Result<String> {
        let mut context = Context::new();
        context.insert("pkg", record);
        context.insert("repo_name", repo_name);
        context.insert(
            "license_label",
            &pluralize(record.licenses.len(), "License", "Licenses"),
        );
        context.insert(
            "group_label",
            &pluralize(record.groups.len(), "Group", "Groups"),
        );
        let dependency_count = record.depends.len() + record.optdepends.len();
        context.insert("dependency_count", &dependency_count);
        context.insert(
            "dependency_label",
            &pluralize(dependency_count, "Dependency", "Dependencies"),
        );

        self.tera
            .render(PACKAGE_TEMPLATE, &context)
            .map_err(template_error)
    }

    pub fn render_index(&self, records: &[PackageRecord], repo: &RepositoryInfo) -> Result<String> {
        let mut context = Context::new();
        context.insert("packages", records);
        context.insert("repo_name", &repo.name);
        context.insert("url", &repo.url);
        context.insert("repo_desc", &repo.description);
        context.insert("key_id", &repo.key_id);
        context.insert(
            "package_label",
            &pluralize(records.len(), "package", "packages"),
        );

        self.tera
            .render(INDEX_TEMPLATE, &context)
            .map_err(template_error)
    }
}
