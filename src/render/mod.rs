pub mod templates;
pub mod writer;

pub use templates::{pluralize, PageRenderer, RepositoryInfo};
pub use writer::SiteWriter;
