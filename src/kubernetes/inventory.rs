// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Point-in-time inventory of cluster objects

use anyhow::Result;
use async_trait::async_trait;
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, StatefulSet};
use k8s_openapi::api::batch::v1::Job;
use k8s_openapi::api::core::v1::{
    ConfigMap, Namespace, PersistentVolumeClaim, Pod, Secret, Service, ServiceAccount,
};

use super::{ApiFilters, Scope};
use crate::prune::ResourceKind;

/// Lists and deletes cluster objects
///
/// Every call is an independent request that returns the full collection
/// in server order. Implementations apply `filters` server-side.
#[async_trait]
pub trait Inventory: Send + Sync {
    async fn pods(&self, scope: &Scope, filters: &ApiFilters) -> Result<Vec<Pod>>;
    async fn config_maps(&self, scope: &Scope, filters: &ApiFilters) -> Result<Vec<ConfigMap>>;
    async fn secrets(&self, scope: &Scope, filters: &ApiFilters) -> Result<Vec<Secret>>;
    async fn persistent_volume_claims(
        &self,
        scope: &Scope,
        filters: &ApiFilters,
    ) -> Result<Vec<PersistentVolumeClaim>>;
    async fn jobs(&self, scope: &Scope, filters: &ApiFilters) -> Result<Vec<Job>>;
    async fn service_accounts(
        &self,
        scope: &Scope,
        filters: &ApiFilters,
    ) -> Result<Vec<ServiceAccount>>;
    async fn services(&self, scope: &Scope, filters: &ApiFilters) -> Result<Vec<Service>>;
    async fn deployments(&self, scope: &Scope, filters: &ApiFilters) -> Result<Vec<Deployment>>;
    async fn stateful_sets(&self, scope: &Scope, filters: &ApiFilters) -> Result<Vec<StatefulSet>>;
    async fn daemon_sets(&self, scope: &Scope, filters: &ApiFilters) -> Result<Vec<DaemonSet>>;

    /// Namespaces are cluster-scoped
    async fn namespaces(&self, filters: &ApiFilters) -> Result<Vec<Namespace>>;

    /// Delete one object. `namespace` is ignored for namespaces themselves.
    async fn delete(&self, kind: ResourceKind, namespace: &str, name: &str) -> Result<()>;
}
