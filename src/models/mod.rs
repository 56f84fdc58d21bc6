// Models module
pub mod record;
pub mod tier;

pub use record::{StatusRecord, StatusSet, Visibility, DEFAULT_SENTINEL_NAME};
pub use tier::{classify, Classification, ColorToken, Tier};
