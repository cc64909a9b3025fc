//! crossdoc Core Library
//!
//! Documentation model, configuration, and error handling for the crossdoc
//! site renderer.

pub mod config;
pub mod error;
pub mod model;

pub use config::{Config, ExternalTypes};
pub use error::{CoreError, Result};
pub use model::{DocumentationModel, Entity, Location, Param, Property, Returns, SymbolEntry, SymbolIndex};
