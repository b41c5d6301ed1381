pub mod index;
pub mod model;
pub mod syncdb;

pub use index::CatalogIndex;
pub use model::{CatalogEntry, CatalogPackage, CatalogRepository};
pub use syncdb::{CatalogProvider, SyncDbCatalog};
