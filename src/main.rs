use alpm_html::api::SiteGenerator;
use alpm_html::config::Config;
use alpm_html::error::Result;

use clap::Parser;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "alpm-html", version)]
#[command(
    about = "Generate a static site for browsing an Arch repo, styled like the main website.",
    long_about = None
)]
struct Cli {
    /// Path to the directory of packages
    #[arg(short = 'd', long, value_name = "DIR")]
    pkg_dir: Option<PathBuf>,

    /// Directory to put resulting HTML files
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Repository name (default: unofficial)
    #[arg(short = 'n', long = "name", value_name = "NAME")]
    repo_name: Option<String>,

    /// The URL to use in the pacman configuration
    #[arg(long = "url", value_name = "URL")]
    repo_url: Option<String>,

    /// GPG key ID that has been used to sign this repository
    #[arg(long, value_name = "ID")]
    key_id: Option<String>,

    /// The repository description
    #[arg(long, value_name = "TEXT")]
    description: Option<String>,

    /// Directory with package.html.j2, index.html.j2 and archrepo.css
    #[arg(long, value_name = "DIR")]
    resources: Option<PathBuf>,

    /// Minify the generated HTML
    #[arg(long)]
    minify: bool,

    /// pacman database directory holding the sync databases
    #[arg(short = 'b', long, value_name = "DIR")]
    dbpath: Option<PathBuf>,

    /// Configuration file (default: ~/.config/alpm-html/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write an example configuration file and exit
    #[arg(long, value_name = "FILE")]
    init_config: Option<PathBuf>,

    /// Log every package as it is processed
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Apply command-line overrides on top of the file configuration
    fn apply(self, mut config: Config) -> Config {
        if let Some(pkg_dir) = self.pkg_dir {
            config.pkg_dir = pkg_dir;
        }
        if let Some(output) = self.output {
            config.output = output;
        }
        if let Some(repo_name) = self.repo_name {
            config.repo_name = repo_name;
        }
        if self.repo_url.is_some() {
            config.repo_url = self.repo_url;
        }
        if self.key_id.is_some() {
            config.key_id = self.key_id;
        }
        if self.description.is_some() {
            config.description = self.description;
        }
        if self.resources.is_some() {
            config.resources = self.resources;
        }
        if let Some(dbpath) = self.dbpath {
            config.dbpath = dbpath;
        }
        config.minify |= self.minify;
        config
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging with environment variable support (RUST_LOG)
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::filter::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::filter::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Some(path) = &cli.init_config {
        Config::example().to_file(path)?;
        info!(path = %path.display(), "Wrote example configuration");
        return Ok(());
    }

    let file_config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load_default()?,
    };
    let config = cli.apply(file_config);
    config.validate()?;

    let _span = tracing::info_span!("generate", repo = %config.repo_name).entered();
    let generator = SiteGenerator::new(config)?;
    let summary = generator.run()?;

    info!(
        packages = summary.packages_rendered,
        skipped = summary.skipped,
        "Site generated"
    );

    Ok(())
}
