//! Catalog data loading for Fabrica: serde schema plus a resolution
//! pipeline that reads RON/JSON/TOML data files and builds an immutable
//! [`fabrica_core::catalog::Catalog`].

pub mod loader;
pub mod schema;

pub use loader::{DataLoadError, load_catalog};
