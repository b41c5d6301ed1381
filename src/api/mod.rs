pub mod generator;

pub use generator::{RunSummary, SiteGenerator, INDEX_PAGE};
