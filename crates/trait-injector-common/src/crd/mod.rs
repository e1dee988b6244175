//! Custom Resource Definitions read by the injector

mod service_binding;
mod types;

pub use service_binding::{
    Binding, BindingFrom, BindingTo, SecretSource, ServiceBinding, ServiceBindingSpec,
    VolumeClaimSource,
};
pub use types::WorkloadReference;
