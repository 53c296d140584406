// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Empty namespace detection
//!
//! A namespace is empty when it holds no workloads and nothing beyond the
//! objects the platform creates in every namespace. Checks run in a fixed
//! order and stop at the first sign of content.

use async_trait::async_trait;

use super::{ClassifyContext, Classifier, PruneError, ResourceItem, ResourceKind, ResourceList};
use crate::kubernetes::{ApiFilters, Scope};

/// Namespaces with no remaining content
pub struct EmptyNamespaceClassifier;

#[async_trait]
impl Classifier for EmptyNamespaceClassifier {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Namespace
    }

    async fn classify(&self, ctx: &ClassifyContext<'_>) -> Result<ResourceList, PruneError> {
        let mut result = ResourceList::new(ResourceKind::Namespace);

        // Undefined when the run is pinned to one namespace
        if ctx.scope.namespace().is_some() {
            return Ok(result);
        }

        let namespaces = ctx
            .inventory
            .namespaces(&ctx.candidate_filters())
            .await
            .map_err(|e| PruneError::inventory("namespaces", e))?;

        for ns in &namespaces {
            let name = ns.metadata.name.as_deref().unwrap_or_default();
            if ctx.exemptions.namespace_protected(name) || !ctx.passes_cutoff(&ns.metadata) {
                continue;
            }

            ctx.progress.namespace_checked(name);
            if is_empty(ctx, name).await? {
                let mut item = ResourceItem::from_meta(&ns.metadata);
                item.namespace = String::new();
                result.push(item);
            }
        }

        Ok(result)
    }
}

async fn is_empty(ctx: &ClassifyContext<'_>, namespace: &str) -> Result<bool, PruneError> {
    let scope = Scope::Namespace(namespace.to_string());
    let all = ApiFilters::none();
    let inv = ctx.inventory;
    let exemptions = ctx.exemptions;

    let pods = inv
        .pods(&scope, &all)
        .await
        .map_err(|e| PruneError::inventory("pods", e))?;
    if !pods.is_empty() {
        return Ok(false);
    }

    let services = inv
        .services(&scope, &all)
        .await
        .map_err(|e| PruneError::inventory("services", e))?;
    let only_default_service = match services.as_slice() {
        [] => true,
        [svc] => exemptions.is_default_service(svc.metadata.name.as_deref().unwrap_or_default()),
        _ => false,
    };
    if !only_default_service {
        return Ok(false);
    }

    let deployments = inv
        .deployments(&scope, &all)
        .await
        .map_err(|e| PruneError::inventory("deployments", e))?;
    if !deployments.is_empty() {
        return Ok(false);
    }

    let stateful_sets = inv
        .stateful_sets(&scope, &all)
        .await
        .map_err(|e| PruneError::inventory("statefulsets", e))?;
    if !stateful_sets.is_empty() {
        return Ok(false);
    }

    let daemon_sets = inv
        .daemon_sets(&scope, &all)
        .await
        .map_err(|e| PruneError::inventory("daemonsets", e))?;
    if !daemon_sets.is_empty() {
        return Ok(false);
    }

    let config_maps = inv
        .config_maps(&scope, &all)
        .await
        .map_err(|e| PruneError::inventory("configmaps", e))?;
    let has_custom_config_map = config_maps.iter().any(|cm| {
        !exemptions.is_default_config_map(cm.metadata.name.as_deref().unwrap_or_default())
    });
    if has_custom_config_map {
        return Ok(false);
    }

    let secrets = inv
        .secrets(&scope, &all)
        .await
        .map_err(|e| PruneError::inventory("secrets", e))?;
    let has_custom_secret = secrets.iter().any(|s| {
        let name = s.metadata.name.as_deref().unwrap_or_default();
        !exemptions.is_default_secret(name, s.type_.as_deref())
    });

    Ok(!has_custom_secret)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prune::exemptions::SERVICE_ACCOUNT_TOKEN_TYPE;
    use crate::prune::testing::*;

    fn candidate(inv: &mut FakeInventory, name: &str) {
        inv.namespaces.push(namespace(name));
    }

    async fn empty_names(inv: &FakeInventory) -> Vec<String> {
        let list = run(inv, &EmptyNamespaceClassifier, &Scope::AllNamespaces, None, None)
            .await
            .unwrap();
        assert!(list.items().iter().all(|i| i.namespace.is_empty()));
        item_names(&list)
    }

    #[tokio::test]
    async fn test_namespace_with_nothing_is_empty() {
        let mut inv = FakeInventory::default();
        candidate(&mut inv, "abandoned");
        assert_eq!(empty_names(&inv).await, vec!["abandoned"]);
    }

    #[tokio::test]
    async fn test_single_pod_makes_namespace_non_empty() {
        let mut inv = FakeInventory::default();
        candidate(&mut inv, "team-a");
        inv.pods.push(pod("team-a", "worker"));

        assert!(empty_names(&inv).await.is_empty());
        // Pods are checked first and short-circuit the remaining lists
        assert_eq!(inv.calls(), vec!["namespaces", "pods[team-a]"]);
    }

    #[tokio::test]
    async fn test_default_service_only_is_empty() {
        let mut inv = FakeInventory::default();
        candidate(&mut inv, "team-a");
        inv.services.push(service("team-a", "kubernetes"));
        assert_eq!(empty_names(&inv).await, vec!["team-a"]);
    }

    #[tokio::test]
    async fn test_services_make_namespace_non_empty() {
        let mut inv = FakeInventory::default();
        candidate(&mut inv, "one-custom");
        candidate(&mut inv, "two-services");
        inv.services.push(service("one-custom", "web"));
        inv.services.push(service("two-services", "kubernetes"));
        inv.services.push(service("two-services", "web"));
        assert!(empty_names(&inv).await.is_empty());
    }

    #[tokio::test]
    async fn test_workloads_make_namespace_non_empty() {
        let mut inv = FakeInventory::default();
        candidate(&mut inv, "deploy");
        candidate(&mut inv, "sts");
        candidate(&mut inv, "ds");
        inv.deployments.push(deployment("deploy", "web"));
        inv.stateful_sets.push(stateful_set("sts", "db"));
        inv.daemon_sets.push(daemon_set("ds", "agent"));
        assert!(empty_names(&inv).await.is_empty());
    }

    #[tokio::test]
    async fn test_default_config_maps_and_secrets_are_ignored() {
        let mut inv = FakeInventory::default();
        candidate(&mut inv, "team-a");
        inv.config_maps.push(config_map("team-a", "kube-root-ca.crt"));
        inv.secrets.push(secret("team-a", "default-token-x7k2p", "Opaque"));
        inv.secrets.push(secret("team-a", "builder-token", SERVICE_ACCOUNT_TOKEN_TYPE));
        assert_eq!(empty_names(&inv).await, vec!["team-a"]);
        assert_eq!(
            inv.calls(),
            vec![
                "namespaces",
                "pods[team-a]",
                "services[team-a]",
                "deployments[team-a]",
                "statefulsets[team-a]",
                "daemonsets[team-a]",
                "configmaps[team-a]",
                "secrets[team-a]",
            ]
        );
    }

    #[tokio::test]
    async fn test_custom_config_map_or_secret_is_content() {
        let mut inv = FakeInventory::default();
        candidate(&mut inv, "cm");
        candidate(&mut inv, "secret");
        inv.config_maps.push(config_map("cm", "settings"));
        inv.secrets.push(secret("secret", "db-password", "Opaque"));
        assert!(empty_names(&inv).await.is_empty());
    }

    #[tokio::test]
    async fn test_protected_namespaces_are_never_checked() {
        let mut inv = FakeInventory::default();
        candidate(&mut inv, "kube-public");
        candidate(&mut inv, "default");
        assert!(empty_names(&inv).await.is_empty());
        assert_eq!(inv.calls(), vec!["namespaces"]);
    }

    #[tokio::test]
    async fn test_young_namespace_is_skipped() {
        let mut inv = FakeInventory::default();
        let mut young = namespace("fresh");
        young.metadata.creation_timestamp = Some(time(minutes_ago(10)));
        inv.namespaces = vec![young, namespace("stale")];

        let list = run(
            &inv,
            &EmptyNamespaceClassifier,
            &Scope::AllNamespaces,
            Some(hours_ago(1)),
            None,
        )
        .await
        .unwrap();
        assert_eq!(item_names(&list), vec!["stale"]);
    }

    #[tokio::test]
    async fn test_namespace_scope_yields_nothing() {
        let mut inv = FakeInventory::default();
        candidate(&mut inv, "abandoned");
        let list = run(
            &inv,
            &EmptyNamespaceClassifier,
            &Scope::Namespace("abandoned".into()),
            None,
            None,
        )
        .await
        .unwrap();
        assert!(list.is_empty());
        assert!(inv.calls().is_empty());
    }

    #[tokio::test]
    async fn test_sub_list_failure_aborts() {
        let mut inv = FakeInventory::default();
        candidate(&mut inv, "team-a");
        inv.fail_list = Some("deployments");
        let err = run(&inv, &EmptyNamespaceClassifier, &Scope::AllNamespaces, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, PruneError::Inventory { what: "deployments", .. }));
    }

    #[tokio::test]
    async fn test_label_selector_applies_to_namespace_list_only() {
        let mut inv = FakeInventory::default();
        inv.namespaces = vec![
            labeled(namespace("dev-a"), "env", "dev"),
            labeled(namespace("dev-b"), "env", "dev"),
            namespace("prod"),
        ];
        // Unlabeled content still counts
        inv.pods.push(pod("dev-b", "worker"));

        let list = run(
            &inv,
            &EmptyNamespaceClassifier,
            &Scope::AllNamespaces,
            None,
            Some("env=dev"),
        )
        .await
        .unwrap();

        assert_eq!(item_names(&list), vec!["dev-a"]);
        assert_eq!(
            inv.calls(),
            vec![
                "namespaces env=dev",
                "pods[dev-a]",
                "services[dev-a]",
                "deployments[dev-a]",
                "statefulsets[dev-a]",
                "daemonsets[dev-a]",
                "configmaps[dev-a]",
                "secrets[dev-a]",
                "pods[dev-b]",
            ]
        );
    }
}
