mod macros;

pub mod content;
pub mod content_types;
pub mod query;
pub mod sync;

pub use content::{ContentService, ContentServiceError};
pub use content_types::ContentTypeService;
pub use query::ContentQuery;
pub use sync::{CatalogSync, ContentSource, SyncError, SyncOptions, SyncReport};
