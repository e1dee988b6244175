//! ServiceBinding CRD
//!
//! A ServiceBinding names one target workload and a list of bindings, each of
//! which attaches a secret (or a claim) to every container of that workload,
//! either as an env source, as a mounted file, or both.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::types::WorkloadReference;

/// ServiceBinding declares how credentials are attached to a workload.
///
/// Example:
/// ```yaml
/// apiVersion: core.oam.dev/v1alpha1
/// kind: ServiceBinding
/// metadata:
///   name: db-creds
///   namespace: default
/// spec:
///   workloadRef:
///     apiVersion: apps/v1
///     kind: StatefulSet
///     name: db
///   bindings:
///     - from:
///         secret:
///           name: db-secret
///       to:
///         env: true
///         filePath: /etc/creds
/// ```
#[derive(CustomResource, Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "core.oam.dev",
    version = "v1alpha1",
    kind = "ServiceBinding",
    namespaced,
    printcolumn = r#"{"name":"Workload","type":"string","jsonPath":".spec.workloadRef.name"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct ServiceBindingSpec {
    /// The workload instance to inject into
    pub workload_ref: WorkloadReference,

    /// Injection intents, applied in order
    #[serde(default)]
    pub bindings: Vec<Binding>,
}

/// One injection intent: a source and where to expose it
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Binding {
    /// Where the data comes from
    #[serde(default)]
    pub from: BindingFrom,

    /// How the data is exposed to containers
    #[serde(default)]
    pub to: BindingTo,
}

/// Source reference of a binding
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BindingFrom {
    /// Secret holding the credentials
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<SecretSource>,

    /// Claim to mount instead of the secret
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<VolumeClaimSource>,
}

/// Secret reference
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SecretSource {
    /// Secret name
    pub name: String,
}

/// PersistentVolumeClaim reference
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VolumeClaimSource {
    /// Claim name
    pub pvc_name: String,
}

/// Destination of a binding; `env` and `filePath` may both be set
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BindingTo {
    /// Inject the secret as an env source into every container
    #[serde(default)]
    pub env: bool,

    /// Mount the source into every container at this path
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub file_path: String,
}

impl Binding {
    /// Create a binding sourcing from a secret, with no destination yet
    pub fn from_secret(name: impl Into<String>) -> Self {
        Self {
            from: BindingFrom {
                secret: Some(SecretSource { name: name.into() }),
                volume: None,
            },
            to: BindingTo::default(),
        }
    }

    /// Add a claim source
    pub fn with_claim(mut self, pvc_name: impl Into<String>) -> Self {
        self.from.volume = Some(VolumeClaimSource {
            pvc_name: pvc_name.into(),
        });
        self
    }

    /// Request env injection
    pub fn with_env(mut self) -> Self {
        self.to.env = true;
        self
    }

    /// Request a file mount at `path`
    pub fn with_file_path(mut self, path: impl Into<String>) -> Self {
        self.to.file_path = path.into();
        self
    }

    /// Secret name; empty when the binding has no secret
    pub fn secret_name(&self) -> &str {
        self.from.secret.as_ref().map_or("", |s| s.name.as_str())
    }

    /// Claim name, if one is set and non-empty
    pub fn claim_name(&self) -> Option<&str> {
        self.from
            .volume
            .as_ref()
            .map(|v| v.pvc_name.as_str())
            .filter(|name| !name.is_empty())
    }
}

impl BindingTo {
    /// Whether env injection is requested
    pub fn wants_env(&self) -> bool {
        self.env
    }

    /// Mount path, if a file destination is requested
    pub fn file_path(&self) -> Option<&str> {
        Some(self.file_path.as_str()).filter(|path| !path.is_empty())
    }

    /// True when no destination is requested at all
    pub fn is_empty(&self) -> bool {
        !self.wants_env() && self.file_path().is_none()
    }
}
