use crate::archive::{is_package_file, ArchiveReader, PackageArchiveReader};
use crate::catalog::{CatalogIndex, CatalogProvider, SyncDbCatalog};
use crate::config::Config;
use crate::error::{AlpmHtmlError, Result};
use crate::normalize::{PackageRecord, Resolver, Sibling, SiblingSet};
use crate::render::{PageRenderer, RepositoryInfo, SiteWriter};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, error, info, instrument, warn};

pub const INDEX_PAGE: &str = "index.html";

/// Outcome of one generator run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub packages_rendered: usize,
    pub skipped: usize,
    pub failed_writes: usize,
}

/// Drives a full run: catalog, directory scan, per-package pages, index
pub struct SiteGenerator {
    config: Config,
    reader: Box<dyn ArchiveReader>,
    catalog: Box<dyn CatalogProvider>,
    renderer: PageRenderer,
    writer: SiteWriter,
}

impl SiteGenerator {
    /// Generator reading real archives and the pacman sync databases
    pub fn new(config: Config) -> Result<Self> {
        let catalog = SyncDbCatalog::new(config.sync_dir());
        Self::with_collaborators(config, Box::new(PackageArchiveReader::new()), Box::new(catalog))
    }

    pub fn with_collaborators(
        config: Config,
        reader: Box<dyn ArchiveReader>,
        catalog: Box<dyn CatalogProvider>,
    ) -> Result<Self> {
        let renderer = match &config.resources {
            Some(dir) => PageRenderer::from_dir(dir)?,
            None => PageRenderer::builtin()?,
        };
        let writer = SiteWriter::new(&config.output, config.minify);

        Ok(Self {
            config,
            reader,
            catalog,
            renderer,
            writer,
        })
    }

    fn repository_info(&self) -> RepositoryInfo {
        RepositoryInfo {
            name: self.config.repo_name.clone(),
            url: self.config.repo_url.clone(),
            description: self.config.description.clone(),
            key_id: self.config.key_id.clone(),
        }
    }

    /// Package archives in the input directory, sorted by file name
    pub fn scan_package_dir(&self) -> Result<Vec<PathBuf>> {
        let mut filenames = Vec::new();
        for entry in fs::read_dir(&self.config.pkg_dir)? {
            let entry = entry?;
            let filename = entry.file_name().to_string_lossy().into_owned();
            if is_package_file(&filename) {
                filenames.push(filename);
            }
        }
        filenames.sort();

        Ok(filenames
            .into_iter()
            .map(|filename| self.config.pkg_dir.join(filename))
            .collect())
    }

    /// Load every archive; unreadable or malformed ones are reported and
    /// left out, so nothing links to a page that will not be written
    fn load_siblings(&self, paths: Vec<PathBuf>, summary: &mut RunSummary) -> Result<SiblingSet> {
        let mut siblings = Vec::with_capacity(paths.len());

        for path in paths {
            let loaded = self.reader.load(&path).and_then(|archive| {
                PackageRecord::required_fields(&archive, &path)?;
                Ok(archive)
            });
            match loaded {
                Ok(archive) => siblings.push(Sibling { path, archive }),
                Err(e) if e.is_per_package() => {
                    warn!(path = %path.display(), error = %e, "Skipping package");
                    summary.skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        Ok(SiblingSet::new(siblings))
    }

    /// Write a page, counting it as failed when the write does not succeed
    fn write_or_count(&self, file_name: &str, html: &str, summary: &mut RunSummary) -> bool {
        match self.writer.write_page(file_name, html) {
            Ok(_) => true,
            Err(e) => {
                error!(error = %e, "Failed to write page");
                summary.failed_writes += 1;
                false
            }
        }
    }

    /// Generate the whole site and fail if any file could not be written.
    ///
    /// Unreadable or malformed archives are skipped with a warning. Pages
    /// that cannot be written are reported one by one, the remaining pages
    /// are still written and the run fails at the end with
    /// `OutputWriteFailure`.
    pub fn run(&self) -> Result<RunSummary> {
        let summary = self.generate()?;

        if summary.failed_writes > 0 {
            return Err(AlpmHtmlError::OutputWriteFailure {
                path: self.config.output.clone(),
                reason: format!("{} file(s) could not be written", summary.failed_writes),
            });
        }

        Ok(summary)
    }

    /// Generate every page, index and stylesheet, counting failed writes
    /// instead of failing on them
    #[instrument(skip(self), fields(pkg_dir = %self.config.pkg_dir.display(), output = %self.config.output.display()))]
    pub fn generate(&self) -> Result<RunSummary> {
        let mut summary = RunSummary::default();

        let catalog = CatalogIndex::build(
            self.catalog.as_ref(),
            &self.config.official_repositories,
            &self.config.package_url,
        )?;

        let paths = self.scan_package_dir()?;
        info!(count = paths.len(), "Found package archives");

        let siblings = self.load_siblings(paths, &mut summary)?;
        let resolver = Resolver::new(&siblings, &catalog);

        self.writer.prepare()?;

        let mut records = Vec::with_capacity(siblings.len());
        for sibling in siblings.iter() {
            let record = match PackageRecord::from_archive(&sibling.archive, &sibling.path, &resolver)
            {
                Ok(record) => record,
                Err(e) => {
                    warn!(path = %sibling.path.display(), error = %e, "Skipping package");
                    summary.skipped += 1;
                    continue;
                }
            };

            info!(package = %record.name, version = %record.version, page = %record.output_path, "Rendering package");
            let html = self.renderer.render_package(&record, &self.config.repo_name)?;
            if self.write_or_count(&record.output_path, &html, &mut summary) {
                summary.packages_rendered += 1;
            }
            records.push(record);
        }

        let html = self.renderer.render_index(&records, &self.repository_info())?;
        self.write_or_count(INDEX_PAGE, &html, &mut summary);

        if let Err(e) = self.writer.write_stylesheet(self.config.resources.as_deref()) {
            error!(error = %e, "Failed to write stylesheet");
            summary.failed_writes += 1;
        }

        info!(
            rendered = summary.packages_rendered,
            skipped = summary.skipped,
            failed_writes = summary.failed_writes,
            "Generation finished"
        );

        debug!(catalog_packages = catalog.len(), "Run complete");
        Ok(summary)
    }
}
