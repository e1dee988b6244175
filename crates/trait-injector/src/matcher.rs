//! Target matching
//!
//! A request applies to an injector only when its GroupVersionKind is exactly
//! the injector's kind and its name is the referenced workload's name.
//! Namespace scoping is the dispatcher's job.

use kube::core::GroupVersionKind;
use trait_injector_common::crd::WorkloadReference;

use crate::kind::WorkloadKind;

/// Decide whether a request for `request_gvk`/`request_name` targets `workload`
///
/// A reference that spells out its own apiVersion or kind must agree with
/// `kind` as well, so a binding for `Deployment/web` never mutates a
/// `StatefulSet/web`. Empty reference fields are not compared.
pub fn matches_target(
    kind: WorkloadKind,
    request_gvk: &GroupVersionKind,
    request_name: &str,
    workload: &WorkloadReference,
) -> bool {
    let expected = kind.gvk();
    if request_gvk.group != expected.group
        || request_gvk.version != expected.version
        || request_gvk.kind != expected.kind
    {
        return false;
    }

    if request_name != workload.name {
        return false;
    }

    let kind_agrees = workload.kind.is_empty() || workload.kind == kind.as_str();
    let api_version_agrees = workload.api_version.is_empty()
        || (workload.group() == expected.group && workload.version() == expected.version);

    kind_agrees && api_version_agrees
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn statefulset_ref(name: &str) -> WorkloadReference {
        WorkloadReference::new("apps/v1", "StatefulSet", name)
    }

    #[test]
    fn exact_request_matches() {
        let gvk = GroupVersionKind::gvk("apps", "v1", "StatefulSet");
        assert!(matches_target(
            WorkloadKind::StatefulSet,
            &gvk,
            "db",
            &statefulset_ref("db")
        ));
    }

    #[rstest]
    #[case::group(GroupVersionKind::gvk("extensions", "v1", "StatefulSet"), "db")]
    #[case::version(GroupVersionKind::gvk("apps", "v1beta2", "StatefulSet"), "db")]
    #[case::kind(GroupVersionKind::gvk("apps", "v1", "Deployment"), "db")]
    #[case::name(GroupVersionKind::gvk("apps", "v1", "StatefulSet"), "db-0")]
    #[case::case_sensitive_kind(GroupVersionKind::gvk("apps", "v1", "statefulset"), "db")]
    fn any_single_difference_rejects(#[case] gvk: GroupVersionKind, #[case] name: &str) {
        assert!(!matches_target(
            WorkloadKind::StatefulSet,
            &gvk,
            name,
            &statefulset_ref("db")
        ));
    }

    #[test]
    fn namespace_is_not_compared() {
        let gvk = GroupVersionKind::gvk("apps", "v1", "StatefulSet");
        let reference = statefulset_ref("db").with_namespace("other");
        assert!(matches_target(WorkloadKind::StatefulSet, &gvk, "db", &reference));
    }

    /// Story: A binding for Deployment/web doesn't leak onto StatefulSet/web
    #[test]
    fn story_same_name_other_kind_is_not_mutated() {
        let reference = WorkloadReference::new("apps/v1", "Deployment", "web");
        let gvk = GroupVersionKind::gvk("apps", "v1", "StatefulSet");
        assert!(!matches_target(WorkloadKind::StatefulSet, &gvk, "web", &reference));

        let gvk = GroupVersionKind::gvk("apps", "v1", "Deployment");
        assert!(matches_target(WorkloadKind::Deployment, &gvk, "web", &reference));
    }

    #[test]
    fn reference_with_only_a_name_matches_by_request_kind() {
        let reference = WorkloadReference {
            name: "nightly".to_string(),
            ..Default::default()
        };
        let gvk = GroupVersionKind::gvk("batch", "v1", "CronJob");
        assert!(matches_target(WorkloadKind::CronJob, &gvk, "nightly", &reference));
    }

    #[test]
    fn reference_api_version_must_agree() {
        let reference = WorkloadReference::new("batch/v1beta1", "CronJob", "nightly");
        let gvk = GroupVersionKind::gvk("batch", "v1", "CronJob");
        assert!(!matches_target(WorkloadKind::CronJob, &gvk, "nightly", &reference));
    }

    #[test]
    fn at_most_one_kind_matches_a_request() {
        let reference = WorkloadReference {
            name: "web".to_string(),
            ..Default::default()
        };
        let gvk = GroupVersionKind::gvk("apps", "v1", "DaemonSet");
        let matching: Vec<_> = WorkloadKind::ALL
            .into_iter()
            .filter(|k| matches_target(*k, &gvk, "web", &reference))
            .collect();
        assert_eq!(matching, vec![WorkloadKind::DaemonSet]);
    }
}
