//! Workload mutation engine for ServiceBindings
//!
//! Given an admission request for a workload and a [`Binding`], decides
//! whether the workload is the binding's target and computes the JSON patch
//! that exposes the binding's secret (or claim) to every container, as an
//! env source, a mounted volume, or both.
//!
//! # Usage
//!
//! ```rust,ignore
//! let injector = WorkloadInjector::new(WorkloadKind::StatefulSet)
//!     .with_config(InjectorConfig::from_env()?);
//! if injector.matches_request(&request, &service_binding.spec.workload_ref) {
//!     let ops = injector.inject(&TargetContext::new(&binding), &raw)?;
//! }
//! ```
//!
//! [`Binding`]: trait_injector_common::crd::Binding

pub mod injector;
pub mod kind;
pub mod matcher;
pub mod patch;
pub mod path;
pub mod volume;

pub use injector::{TargetContext, TargetInjector, WorkloadInjector};
pub use kind::{DecodedWorkload, WorkloadKind};
pub use matcher::matches_target;
pub use patch::PatchBuilder;
pub use path::DocumentPath;
pub use volume::{mount_name, resolve_volume_source, VolumeSource};

pub use trait_injector_common::{DuplicatePolicy, Error, InjectorConfig, Result};
