//! Common types for the trait injector: the ServiceBinding CRD, errors, and configuration

#![deny(missing_docs)]

pub mod config;
pub mod crd;
pub mod error;

pub use config::{DuplicatePolicy, InjectorConfig};
pub use error::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// API group of the ServiceBinding CRD
pub const BINDING_API_GROUP: &str = "core.oam.dev";

/// Default prefix for volume and mount names created by the injector
pub const DEFAULT_MOUNT_NAME_PREFIX: &str = "trait-injector";
