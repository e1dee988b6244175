//! Patch generation
//!
//! Computes the JSON patch that attaches one binding to every container of a
//! pod spec. All paths are taken from the document as received: container
//! indices are never renumbered, and a list is only created when the field is
//! absent (an empty list that is present is appended to directly). Operations
//! must be applied in the order returned.

use json_patch::{AddOperation, PatchOperation};
use k8s_openapi::api::core::v1::{Container, EnvFromSource, PodSpec, SecretEnvSource, VolumeMount};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use trait_injector_common::crd::Binding;
use trait_injector_common::{DuplicatePolicy, Error, InjectorConfig, Result};

use crate::path::DocumentPath;
use crate::volume::{mount_name, resolve_volume_source};

/// Builds the patch for one binding against one decoded pod spec
#[derive(Clone, Debug)]
pub struct PatchBuilder<'a> {
    pod_spec_path: DocumentPath,
    pod_spec: &'a PodSpec,
    config: InjectorConfig,
}

impl<'a> PatchBuilder<'a> {
    /// Create a builder for the pod spec found at `pod_spec_path`
    pub fn new(pod_spec_path: DocumentPath, pod_spec: &'a PodSpec) -> Self {
        Self {
            pod_spec_path,
            pod_spec,
            config: InjectorConfig::default(),
        }
    }

    /// Use a specific injector configuration
    pub fn with_config(mut self, config: &InjectorConfig) -> Self {
        self.config = config.clone();
        self
    }

    /// Compute the ordered patch operations for `binding`
    ///
    /// Env operations come first, then file operations. A binding without
    /// any destination yields no operations. A binding whose destination
    /// cannot be served by its source is rejected before anything is built.
    pub fn build(&self, binding: &Binding) -> Result<Vec<PatchOperation>> {
        if binding.to.is_empty() {
            debug!("binding requests neither env nor file injection, nothing to patch");
            return Ok(Vec::new());
        }
        validate(binding)?;

        let mut ops = Vec::new();
        if binding.to.wants_env() {
            self.push_env_ops(binding.secret_name(), &mut ops)?;
        }
        if let Some(file_path) = binding.to.file_path() {
            self.push_file_ops(binding, file_path, &mut ops)?;
        }
        Ok(ops)
    }

    fn skip_existing(&self) -> bool {
        self.config.duplicate_policy == DuplicatePolicy::SkipExisting
    }

    fn container_path(&self, index: usize) -> DocumentPath {
        self.pod_spec_path.field("containers").index(index)
    }

    fn push_env_ops(&self, secret_name: &str, ops: &mut Vec<PatchOperation>) -> Result<()> {
        let entry = patch_value(&EnvFromSource {
            secret_ref: Some(SecretEnvSource {
                name: secret_name.to_string(),
                ..Default::default()
            }),
            ..Default::default()
        })?;

        for (i, container) in self.pod_spec.containers.iter().enumerate() {
            if self.skip_existing() && has_secret_env(container, secret_name) {
                debug!(container = %container.name, secret = %secret_name, "env source already present");
                continue;
            }

            let env_from = self.container_path(i).field("envFrom");
            if container.env_from.is_none() {
                ops.push(add(&env_from, empty_list()));
            }
            ops.push(add(&env_from.append(), entry.clone()));
        }
        Ok(())
    }

    fn push_file_ops(
        &self,
        binding: &Binding,
        file_path: &str,
        ops: &mut Vec<PatchOperation>,
    ) -> Result<()> {
        let name = mount_name(
            &self.config.mount_name_prefix,
            binding.secret_name(),
            binding.claim_name(),
        );

        let volume_present = self
            .pod_spec
            .volumes
            .as_ref()
            .is_some_and(|volumes| volumes.iter().any(|v| v.name == name));

        if self.skip_existing() && volume_present {
            debug!(volume = %name, "volume already present");
        } else {
            let volumes = self.pod_spec_path.field("volumes");
            if self.pod_spec.volumes.is_none() {
                ops.push(add(&volumes, empty_list()));
            }
            let volume = resolve_volume_source(binding.secret_name(), binding.claim_name())
                .into_volume(name.clone());
            ops.push(add(&volumes.append(), patch_value(&volume)?));
        }

        let mount = patch_value(&VolumeMount {
            name: name.clone(),
            mount_path: file_path.to_string(),
            ..Default::default()
        })?;

        for (i, container) in self.pod_spec.containers.iter().enumerate() {
            if self.skip_existing() && has_mount(container, &name, file_path) {
                debug!(container = %container.name, volume = %name, "volume mount already present");
                continue;
            }

            let mounts = self.container_path(i).field("volumeMounts");
            if container.volume_mounts.is_none() {
                ops.push(add(&mounts, empty_list()));
            }
            ops.push(add(&mounts.append(), mount.clone()));
        }
        Ok(())
    }
}

fn validate(binding: &Binding) -> Result<()> {
    if binding.to.wants_env() && binding.secret_name().is_empty() {
        return Err(Error::invalid_binding_field(
            "from.secret.name",
            "env injection requires a secret name",
        ));
    }
    if binding.to.file_path().is_some()
        && binding.secret_name().is_empty()
        && binding.claim_name().is_none()
    {
        return Err(Error::invalid_binding_field(
            "from",
            "file injection requires a secret name or a claim name",
        ));
    }
    Ok(())
}

fn has_secret_env(container: &Container, secret_name: &str) -> bool {
    container.env_from.as_ref().is_some_and(|sources| {
        sources
            .iter()
            .filter_map(|s| s.secret_ref.as_ref())
            .any(|r| r.name == secret_name)
    })
}

fn has_mount(container: &Container, name: &str, mount_path: &str) -> bool {
    container.volume_mounts.as_ref().is_some_and(|mounts| {
        mounts
            .iter()
            .any(|m| m.name == name && m.mount_path == mount_path)
    })
}

fn add(path: &DocumentPath, value: Value) -> PatchOperation {
    PatchOperation::Add(AddOperation {
        path: path.to_pointer(),
        value,
    })
}

fn empty_list() -> Value {
    Value::Array(Vec::new())
}

fn patch_value<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| Error::serialization(e.to_string()))
}
