//! Injector configuration
//!
//! Every field has a default, so an empty document or an empty environment
//! yields plain always-append injection with the default name prefix.

use serde::{Deserialize, Serialize};

use crate::{Error, Result, DEFAULT_MOUNT_NAME_PREFIX};

/// Environment variable overriding [`InjectorConfig::mount_name_prefix`]
pub const ENV_MOUNT_NAME_PREFIX: &str = "TRAIT_INJECTOR_MOUNT_NAME_PREFIX";

/// Environment variable overriding [`InjectorConfig::duplicate_policy`]
pub const ENV_DUPLICATE_POLICY: &str = "TRAIT_INJECTOR_DUPLICATE_POLICY";

/// How the patch builder treats entries a previous injection already added
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum DuplicatePolicy {
    /// Always append, even if an identical entry exists
    #[default]
    Append,
    /// Skip appends whose entry is already present in the document
    SkipExisting,
}

impl std::str::FromStr for DuplicatePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "append" => Ok(Self::Append),
            "skipexisting" | "skip-existing" | "skip_existing" => Ok(Self::SkipExisting),
            _ => Err(Error::config(format!(
                "invalid duplicate policy: {s}, expected one of: append, skipExisting"
            ))),
        }
    }
}

impl std::fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Append => write!(f, "append"),
            Self::SkipExisting => write!(f, "skipExisting"),
        }
    }
}

/// Configuration shared by every workload injector
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct InjectorConfig {
    /// Prefix for volume and mount names the injector creates
    pub mount_name_prefix: String,

    /// Behavior when the document already carries an injected entry
    pub duplicate_policy: DuplicatePolicy,
}

impl Default for InjectorConfig {
    fn default() -> Self {
        Self {
            mount_name_prefix: DEFAULT_MOUNT_NAME_PREFIX.to_string(),
            duplicate_policy: DuplicatePolicy::default(),
        }
    }
}

impl InjectorConfig {
    /// Build configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    ///
    /// Unset or empty keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(prefix) = lookup(ENV_MOUNT_NAME_PREFIX).filter(|v| !v.is_empty()) {
            config.mount_name_prefix = prefix;
        }
        if let Some(policy) = lookup(ENV_DUPLICATE_POLICY).filter(|v| !v.is_empty()) {
            config.duplicate_policy = policy.parse()?;
        }

        Ok(config)
    }

    /// Set the mount name prefix
    pub fn with_mount_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.mount_name_prefix = prefix.into();
        self
    }

    /// Set the duplicate policy
    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }
}
