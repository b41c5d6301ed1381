use crate::error::{AlpmHtmlError, Result};
use crate::render::templates::{BUILTIN_STYLESHEET, STYLESHEET};
use minify_html::Cfg;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Writes generated pages below the output directory
#[derive(Debug, Clone)]
pub struct SiteWriter {
    output: PathBuf,
    minify: bool,
}

impl SiteWriter {
    pub fn new(output: impl Into<PathBuf>, minify: bool) -> Self {
        Self {
            output: output.into(),
            minify,
        }
    }

    fn write_failure(path: &Path, reason: impl std::fmt::Display) -> AlpmHtmlError {
        AlpmHtmlError::OutputWriteFailure {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output
    }

    /// Create the output directory (and parents) if missing
    pub fn prepare(&self) -> Result<()> {
        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(0o755);
        }
        builder
            .create(&self.output)
            .map_err(|e| Self::write_failure(&self.output, e))
    }

    /// Write one HTML page, minified when enabled
    pub fn write_page(&self, file_name: &str, html: &str) -> Result<PathBuf> {
        let path = self.output.join(file_name);
        let bytes = if self.minify {
            minify_html::minify(html.as_bytes(), &Cfg::new())
        } else {
            html.as_bytes().to_vec()
        };

        fs::write(&path, bytes).map_err(|e| Self::write_failure(&path, e))?;
        debug!(path = %path.display(), "Wrote page");

        Ok(path)
    }

    /// Copy `archrepo.css` from `resources`, or write the built-in copy
    pub fn write_stylesheet(&self, resources: Option<&Path>) -> Result<PathBuf> {
        let target = self.output.join(STYLESHEET);
        match resources {
            Some(dir) => {
                let source = dir.join(STYLESHEET);
                fs::copy(&source, &target).map_err(|e| {
                    Self::write_failure(&target, format!("copy from {}: {}", source.display(), e))
                })?;
            }
            None => {
                fs::write(&target, BUILTIN_STYLESHEET)
                    .map_err(|e| Self::write_failure(&target, e))?;
            }
        }
        Ok(target)
    }
}
