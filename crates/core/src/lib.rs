pub mod config;
pub mod dataset;
pub mod error;
pub mod types;

pub use self::config::AppConfig;
pub use dataset::Dataset;
pub use error::{CatalogError, CatalogResult};
pub use types::{NumericField, ProductField, ProductRecord, TextField};
