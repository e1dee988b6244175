//! Volume source resolution and mount naming

use k8s_openapi::api::core::v1::{
    PersistentVolumeClaimVolumeSource, SecretVolumeSource, Volume,
};
use sha2::{Digest, Sha256};

/// Maximum length of a volume name (DNS-1123 label)
pub const MAX_VOLUME_NAME_LEN: usize = 63;

/// Hex digits of the disambiguating hash suffix
const HASH_SUFFIX_LEN: usize = 8;

/// Backing storage for an injected volume
#[derive(Clone, Debug, PartialEq)]
pub enum VolumeSource {
    /// Volume projected from a Secret
    Secret(SecretVolumeSource),
    /// Volume backed by a PersistentVolumeClaim
    PersistentVolumeClaim(PersistentVolumeClaimVolumeSource),
}

impl VolumeSource {
    /// Build the pod volume entry for this source
    pub fn into_volume(self, name: impl Into<String>) -> Volume {
        let mut volume = Volume {
            name: name.into(),
            ..Default::default()
        };
        match self {
            Self::Secret(secret) => volume.secret = Some(secret),
            Self::PersistentVolumeClaim(claim) => volume.persistent_volume_claim = Some(claim),
        }
        volume
    }
}

/// Pick the volume source for a binding: the claim when set, otherwise the secret
pub fn resolve_volume_source(secret_name: &str, claim_name: Option<&str>) -> VolumeSource {
    match claim_name.filter(|name| !name.is_empty()) {
        Some(claim) => VolumeSource::PersistentVolumeClaim(PersistentVolumeClaimVolumeSource {
            claim_name: claim.to_string(),
            ..Default::default()
        }),
        None => VolumeSource::Secret(SecretVolumeSource {
            secret_name: Some(secret_name.to_string()),
            ..Default::default()
        }),
    }
}

/// Derive the volume name shared by the injected volume and all of its mounts
///
/// The name is `<prefix>-<secret|pvc>-<source>`. When the source name had to
/// be rewritten to fit a DNS-1123 label, or the result is too long, a short
/// hash of the original source is appended so distinct sources stay distinct.
pub fn mount_name(prefix: &str, secret_name: &str, claim_name: Option<&str>) -> String {
    let (tag, source) = match claim_name.filter(|name| !name.is_empty()) {
        Some(claim) => ("pvc", claim),
        None => ("secret", secret_name),
    };

    let raw = format!("{prefix}-{tag}-{source}");
    let sanitized = sanitize_label(&raw);

    if sanitized == raw && sanitized.len() <= MAX_VOLUME_NAME_LEN {
        return sanitized;
    }

    let mut hasher = Sha256::new();
    hasher.update(format!("{tag}:{source}"));
    let digest = format!("{:x}", hasher.finalize());

    let keep = MAX_VOLUME_NAME_LEN - HASH_SUFFIX_LEN - 1;
    let head: String = sanitized.chars().take(keep).collect();
    format!(
        "{}-{}",
        head.trim_end_matches('-'),
        &digest[..HASH_SUFFIX_LEN]
    )
}

/// Lowercase and replace anything outside `[a-z0-9-]`, trimming dashes at the ends
fn sanitize_label(name: &str) -> String {
    let mapped: String = name
        .chars()
        .map(|c| {
            let c = c.to_ascii_lowercase();
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect();
    mapped.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_source_without_claim() {
        match resolve_volume_source("db-secret", None) {
            VolumeSource::Secret(s) => assert_eq!(s.secret_name.as_deref(), Some("db-secret")),
            other => panic!("Expected Secret variant, got {other:?}"),
        }
    }

    #[test]
    fn claim_wins_over_secret() {
        match resolve_volume_source("db-secret", Some("data")) {
            VolumeSource::PersistentVolumeClaim(c) => assert_eq!(c.claim_name, "data"),
            other => panic!("Expected PersistentVolumeClaim variant, got {other:?}"),
        }
    }

    #[test]
    fn empty_claim_falls_back_to_secret() {
        assert!(matches!(
            resolve_volume_source("db-secret", Some("")),
            VolumeSource::Secret(_)
        ));
    }

    #[test]
    fn into_volume_sets_exactly_one_source() {
        let volume = resolve_volume_source("s", Some("c")).into_volume("v");
        assert_eq!(volume.name, "v");
        assert!(volume.secret.is_none());
        assert_eq!(
            volume.persistent_volume_claim.map(|c| c.claim_name),
            Some("c".to_string())
        );

        let volume = resolve_volume_source("s", None).into_volume("v");
        assert!(volume.persistent_volume_claim.is_none());
        assert!(volume.secret.is_some());
    }

    #[test]
    fn mount_name_is_deterministic_and_readable() {
        let a = mount_name("trait-injector", "db-secret", None);
        let b = mount_name("trait-injector", "db-secret", None);
        assert_eq!(a, b);
        assert_eq!(a, "trait-injector-secret-db-secret");
    }

    #[test]
    fn claim_and_secret_with_same_name_do_not_collide() {
        let secret = mount_name("trait-injector", "data", None);
        let claim = mount_name("trait-injector", "data", Some("data"));
        assert_ne!(secret, claim);
        assert_eq!(claim, "trait-injector-pvc-data");
    }

    #[test]
    fn dotted_names_are_sanitized_with_hash_suffix() {
        let dotted = mount_name("trait-injector", "db.creds", None);
        let dashed = mount_name("trait-injector", "db-creds", None);
        assert_ne!(dotted, dashed);
        assert!(dotted.starts_with("trait-injector-secret-db-creds-"));
        assert!(dotted
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
    }

    #[test]
    fn long_names_fit_a_dns_label() {
        let long = "x".repeat(200);
        let name = mount_name("trait-injector", &long, None);
        assert!(name.len() <= MAX_VOLUME_NAME_LEN);
        assert!(!name.ends_with('-'));

        let other = mount_name("trait-injector", &format!("{long}y"), None);
        assert_ne!(name, other);
    }
}
