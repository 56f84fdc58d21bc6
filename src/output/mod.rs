// Output module
pub mod table;

pub use table::{provider_table, ProviderRow};
