//! Workload kinds the injector can target
//!
//! Every kind shares the pod spec shape; they differ only in their
//! GroupVersionKind and in where the pod spec sits inside the envelope.

use std::fmt;

use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, ReplicaSet, StatefulSet};
use k8s_openapi::api::batch::v1::{CronJob, Job};
use k8s_openapi::api::core::v1::PodSpec;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::core::GroupVersionKind;
use serde::de::DeserializeOwned;

use trait_injector_common::{Error, Result};

use crate::path::DocumentPath;

const TEMPLATE_POD_SPEC: &[&str] = &["spec", "template", "spec"];
const JOB_TEMPLATE_POD_SPEC: &[&str] = &["spec", "jobTemplate", "spec", "template", "spec"];

/// Closed set of workload kinds with a pod template
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WorkloadKind {
    /// apps/v1 Deployment
    Deployment,
    /// apps/v1 StatefulSet
    StatefulSet,
    /// apps/v1 DaemonSet
    DaemonSet,
    /// apps/v1 ReplicaSet
    ReplicaSet,
    /// batch/v1 Job
    Job,
    /// batch/v1 CronJob
    CronJob,
}

/// A workload decoded just far enough to compute patches
#[derive(Clone, Debug)]
pub struct DecodedWorkload {
    /// Workload metadata as received
    pub metadata: ObjectMeta,
    /// Pod spec from the workload's pod template
    pub pod_spec: PodSpec,
}

impl DecodedWorkload {
    /// `namespace/name` for log fields
    pub fn display_name(&self) -> String {
        let name = self.metadata.name.as_deref().unwrap_or_default();
        match self.metadata.namespace.as_deref() {
            Some(ns) => format!("{ns}/{name}"),
            None => name.to_string(),
        }
    }
}

impl WorkloadKind {
    /// Every supported kind
    pub const ALL: [WorkloadKind; 6] = [
        WorkloadKind::Deployment,
        WorkloadKind::StatefulSet,
        WorkloadKind::DaemonSet,
        WorkloadKind::ReplicaSet,
        WorkloadKind::Job,
        WorkloadKind::CronJob,
    ];

    /// Kind string as it appears in `kind:`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deployment => "Deployment",
            Self::StatefulSet => "StatefulSet",
            Self::DaemonSet => "DaemonSet",
            Self::ReplicaSet => "ReplicaSet",
            Self::Job => "Job",
            Self::CronJob => "CronJob",
        }
    }

    /// API group of the kind
    pub fn group(&self) -> &'static str {
        match self {
            Self::Deployment | Self::StatefulSet | Self::DaemonSet | Self::ReplicaSet => "apps",
            Self::Job | Self::CronJob => "batch",
        }
    }

    /// API version of the kind
    pub fn version(&self) -> &'static str {
        "v1"
    }

    /// `group/version` as it appears in `apiVersion:`
    pub fn api_version(&self) -> String {
        format!("{}/{}", self.group(), self.version())
    }

    /// Exact GroupVersionKind admission requests carry for this kind
    pub fn gvk(&self) -> GroupVersionKind {
        GroupVersionKind::gvk(self.group(), self.version(), self.as_str())
    }

    /// Stable injector name used in diagnostics
    pub fn injector_name(&self) -> &'static str {
        match self {
            Self::Deployment => "DeploymentTargetInjector",
            Self::StatefulSet => "StatefulSetTargetInjector",
            Self::DaemonSet => "DaemonSetTargetInjector",
            Self::ReplicaSet => "ReplicaSetTargetInjector",
            Self::Job => "JobTargetInjector",
            Self::CronJob => "CronJobTargetInjector",
        }
    }

    /// Path of the pod spec within the workload document
    pub fn pod_spec_path(&self) -> DocumentPath {
        match self {
            Self::CronJob => DocumentPath::from_fields(JOB_TEMPLATE_POD_SPEC),
            _ => DocumentPath::from_fields(TEMPLATE_POD_SPEC),
        }
    }

    /// Decode a raw workload document of this kind
    ///
    /// Fails if the bytes are not a workload of this kind or if the
    /// workload has no pod template spec to patch.
    pub fn decode(&self, raw: &[u8]) -> Result<DecodedWorkload> {
        match self {
            Self::Deployment => decode_as::<Deployment>(*self, raw),
            Self::StatefulSet => decode_as::<StatefulSet>(*self, raw),
            Self::DaemonSet => decode_as::<DaemonSet>(*self, raw),
            Self::ReplicaSet => decode_as::<ReplicaSet>(*self, raw),
            Self::Job => decode_as::<Job>(*self, raw),
            Self::CronJob => decode_as::<CronJob>(*self, raw),
        }
    }
}

impl fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Access to the pod spec inside a typed workload envelope
trait PodTemplated: DeserializeOwned {
    fn into_parts(self) -> (ObjectMeta, Option<PodSpec>);
}

impl PodTemplated for Deployment {
    fn into_parts(self) -> (ObjectMeta, Option<PodSpec>) {
        (self.metadata, self.spec.and_then(|s| s.template.spec))
    }
}

impl PodTemplated for StatefulSet {
    fn into_parts(self) -> (ObjectMeta, Option<PodSpec>) {
        (self.metadata, self.spec.and_then(|s| s.template.spec))
    }
}

impl PodTemplated for DaemonSet {
    fn into_parts(self) -> (ObjectMeta, Option<PodSpec>) {
        (self.metadata, self.spec.and_then(|s| s.template.spec))
    }
}

impl PodTemplated for ReplicaSet {
    fn into_parts(self) -> (ObjectMeta, Option<PodSpec>) {
        (
            self.metadata,
            self.spec.and_then(|s| s.template).and_then(|t| t.spec),
        )
    }
}

impl PodTemplated for Job {
    fn into_parts(self) -> (ObjectMeta, Option<PodSpec>) {
        (self.metadata, self.spec.and_then(|s| s.template.spec))
    }
}

impl PodTemplated for CronJob {
    fn into_parts(self) -> (ObjectMeta, Option<PodSpec>) {
        (
            self.metadata,
            self.spec
                .and_then(|s| s.job_template.spec)
                .and_then(|s| s.template.spec),
        )
    }
}

fn decode_as<W: PodTemplated>(kind: WorkloadKind, raw: &[u8]) -> Result<DecodedWorkload> {
    let workload: W = serde_json::from_slice(raw)
        .map_err(|e| Error::decode_for_kind(kind.as_str(), e.to_string()))?;

    let (metadata, pod_spec) = workload.into_parts();
    let pod_spec = pod_spec.ok_or_else(|| {
        Error::decode_for_kind(
            kind.as_str(),
            format!("missing pod spec at {}", kind.pod_spec_path()),
        )
    })?;

    Ok(DecodedWorkload { metadata, pod_spec })
}
