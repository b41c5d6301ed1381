use crate::error::{AlpmHtmlError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Repositories whose packages may be linked to on the Arch Linux website.
/// Earlier entries take priority when a name appears in several of them.
pub const DEFAULT_OFFICIAL_REPOSITORIES: &[&str] = &["core", "extra", "multilib"];

/// Generator configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Directory holding the package archives
    pub pkg_dir: PathBuf,

    /// Directory receiving the generated HTML
    pub output: PathBuf,

    /// Repository name shown on every page
    pub repo_name: String,

    /// Server URL for the pacman.conf snippet on the index page
    pub repo_url: Option<String>,

    /// Key ID used to sign the repository
    pub key_id: Option<String>,

    /// Free-form repository description
    pub description: Option<String>,

    /// Template/stylesheet directory; built-in resources are used when unset
    pub resources: Option<PathBuf>,

    /// Minify generated HTML
    pub minify: bool,

    /// pacman database root (sync databases live in `<dbpath>/sync`)
    pub dbpath: PathBuf,

    /// Allow-list of repositories eligible for external links, in priority order
    pub official_repositories: Vec<String>,

    /// Base URL for external package links
    pub package_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pkg_dir: PathBuf::from("."),
            output: PathBuf::from("build"),
            repo_name: "unofficial".to_string(),
            repo_url: None,
            key_id: None,
            description: None,
            resources: None,
            minify: false,
            dbpath: PathBuf::from("/var/lib/pacman"),
            official_repositories: DEFAULT_OFFICIAL_REPOSITORIES
                .iter()
                .map(|r| r.to_string())
                .collect(),
            package_url: "https://archlinux.org/packages".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        let config: Config = toml::from_str(&content).map_err(|e| {
            AlpmHtmlError::Config(format!("Invalid config {}: {}", path.display(), e))
        })?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| AlpmHtmlError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)?;

        Ok(())
    }

    /// Per-user config location (`~/.config/alpm-html/config.toml` on Linux)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("alpm-html").join("config.toml"))
    }

    /// Load the per-user config if present, defaults otherwise
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.is_file() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Example configuration written by `--init-config`
    pub fn example() -> Self {
        Self {
            pkg_dir: PathBuf::from("/srv/repo/x86_64"),
            output: PathBuf::from("/srv/http/repo"),
            repo_name: "myrepo".to_string(),
            repo_url: Some("https://example.org/repo/$arch".to_string()),
            key_id: None,
            description: Some("Packages built for my machines".to_string()),
            ..Default::default()
        }
    }

    /// Directory containing the pacman sync databases
    pub fn sync_dir(&self) -> PathBuf {
        self.dbpath.join("sync")
    }

    pub fn validate(&self) -> Result<()> {
        if self.repo_name.trim().is_empty() {
            return Err(AlpmHtmlError::Config(
                "repository name must not be empty".to_string(),
            ));
        }
        if !self.pkg_dir.is_dir() {
            return Err(AlpmHtmlError::Config(format!(
                "package directory {} does not exist",
                self.pkg_dir.display()
            )));
        }
        Ok(())
    }
}
