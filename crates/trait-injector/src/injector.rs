//! Per-kind target injectors
//!
//! The admission dispatcher asks every registered injector whether it
//! [matches](TargetInjector::matches) a request, and hands the raw workload
//! of the matching one to [`TargetInjector::inject`]. One generic
//! [`WorkloadInjector`] serves every [`WorkloadKind`].

use json_patch::PatchOperation;
use kube::core::admission::AdmissionRequest;
use kube::core::{DynamicObject, GroupVersionKind};
use tracing::{debug, info, info_span, warn, Span};

use trait_injector_common::crd::{Binding, WorkloadReference};
use trait_injector_common::{InjectorConfig, Result};

use crate::kind::WorkloadKind;
use crate::matcher::matches_target;
use crate::patch::PatchBuilder;
use crate::volume::mount_name;

/// What the dispatcher passes along with the raw workload
#[derive(Clone, Copy, Debug)]
pub struct TargetContext<'a> {
    /// The binding to apply
    pub binding: &'a Binding,
    /// Name of the ServiceBinding the binding came from, for logs
    pub service_binding: Option<&'a str>,
}

impl<'a> TargetContext<'a> {
    /// Context for a single binding
    pub fn new(binding: &'a Binding) -> Self {
        Self {
            binding,
            service_binding: None,
        }
    }

    /// Record which ServiceBinding the binding came from
    pub fn with_service_binding(mut self, name: &'a str) -> Self {
        self.service_binding = Some(name);
        self
    }
}

/// Contract between the admission dispatcher and an injector
pub trait TargetInjector: Send + Sync {
    /// Stable name, used for diagnostics and ordering
    fn name(&self) -> &str;

    /// Whether a request for `gvk`/`name` targets `workload`
    fn matches(&self, gvk: &GroupVersionKind, name: &str, workload: &WorkloadReference) -> bool;

    /// [`matches`](TargetInjector::matches) applied to an admission request
    fn matches_request(
        &self,
        request: &AdmissionRequest<DynamicObject>,
        workload: &WorkloadReference,
    ) -> bool {
        self.matches(&request.kind, &request.name, workload)
    }

    /// Compute the patch attaching `ctx.binding` to the raw workload
    ///
    /// A workload that fails to decode yields an error and no operations.
    fn inject(&self, ctx: &TargetContext<'_>, raw: &[u8]) -> Result<Vec<PatchOperation>>;
}

/// Injector for one workload kind
#[derive(Clone, Debug)]
pub struct WorkloadInjector {
    kind: WorkloadKind,
    config: InjectorConfig,
    span: Span,
}

impl WorkloadInjector {
    /// Create an injector for `kind` with default configuration
    pub fn new(kind: WorkloadKind) -> Self {
        Self {
            kind,
            config: InjectorConfig::default(),
            span: info_span!("target_injector", injector = kind.injector_name()),
        }
    }

    /// Use a specific configuration
    pub fn with_config(mut self, config: InjectorConfig) -> Self {
        self.config = config;
        self
    }

    /// Log under `span` instead of the default per-injector span
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Kind this injector handles
    pub fn kind(&self) -> WorkloadKind {
        self.kind
    }

    /// Configuration in use
    pub fn config(&self) -> &InjectorConfig {
        &self.config
    }

    /// Span this injector logs under
    pub fn span(&self) -> &Span {
        &self.span
    }
}

impl TargetInjector for WorkloadInjector {
    fn name(&self) -> &str {
        self.kind.injector_name()
    }

    fn matches(&self, gvk: &GroupVersionKind, name: &str, workload: &WorkloadReference) -> bool {
        matches_target(self.kind, gvk, name, workload)
    }

    fn inject(&self, ctx: &TargetContext<'_>, raw: &[u8]) -> Result<Vec<PatchOperation>> {
        let _entered = self.span.enter();
        let binding = ctx.binding;

        let workload = self.kind.decode(raw).inspect_err(|e| {
            warn!(
                error = %e,
                service_binding = ctx.service_binding.unwrap_or_default(),
                "Failed to decode workload, skipping injection"
            );
        })?;
        let target = workload.display_name();

        let ops = PatchBuilder::new(self.kind.pod_spec_path(), &workload.pod_spec)
            .with_config(&self.config)
            .build(binding)?;

        let containers = workload.pod_spec.containers.len();
        if binding.to.wants_env() {
            info!(
                workload = %target,
                secret = %binding.secret_name(),
                containers,
                "Injected secret to env"
            );
        }
        if let Some(path) = binding.to.file_path() {
            let volume = mount_name(
                &self.config.mount_name_prefix,
                binding.secret_name(),
                binding.claim_name(),
            );
            info!(
                workload = %target,
                volume = %volume,
                path = %path,
                containers,
                "Injected volume to file"
            );
        }
        debug!(workload = %target, patch_ops = ops.len(), "Built injection patch");

        Ok(ops)
    }
}
