// Status document loading
pub mod loader;

pub use loader::{parse_status_document, LoadError, StatusSource};
