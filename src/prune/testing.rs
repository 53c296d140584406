//! In-memory inventory and object fixtures for classifier tests

use anyhow::{Result, bail};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, StatefulSet};
use k8s_openapi::api::batch::v1::{Job, JobStatus};
use k8s_openapi::api::core::v1::{
    ConfigMap, Container, EnvFromSource, EnvVar, LocalObjectReference, Namespace, ObjectReference,
    PersistentVolumeClaim, Pod, PodSpec, PodStatus, Secret, Service, ServiceAccount, Volume,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference, Time};
use kube::Resource;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Mutex;

use super::{ClassifyContext, Classifier, Exemptions, PruneError, ResourceKind, ResourceList};
use crate::kubernetes::{ApiFilters, Inventory, Scope};
use crate::progress::create_progress_handle;

/// Inventory over in-memory objects that records every call
#[derive(Default)]
pub struct FakeInventory {
    pub pods: Vec<Pod>,
    pub config_maps: Vec<ConfigMap>,
    pub secrets: Vec<Secret>,
    pub pvcs: Vec<PersistentVolumeClaim>,
    pub jobs: Vec<Job>,
    pub service_accounts: Vec<ServiceAccount>,
    pub services: Vec<Service>,
    pub deployments: Vec<Deployment>,
    pub stateful_sets: Vec<StatefulSet>,
    pub daemon_sets: Vec<DaemonSet>,
    pub namespaces: Vec<Namespace>,
    /// Collection name whose list call fails (e.g. "pods")
    pub fail_list: Option<&'static str>,
    /// 1-based delete attempt that fails
    pub fail_delete_at: Option<usize>,
    calls: Mutex<Vec<String>>,
    deleted: Mutex<Vec<String>>,
    delete_attempts: Mutex<usize>,
}

impl FakeInventory {
    /// List calls in order, as `kind[namespace|*] selector`
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Successful deletions in order, as `kind target`
    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn delete_attempts(&self) -> usize {
        *self.delete_attempts.lock().unwrap()
    }

    fn list<K: Resource + Clone>(
        &self,
        what: &'static str,
        items: &[K],
        scope: Option<&Scope>,
        filters: &ApiFilters,
    ) -> Result<Vec<K>> {
        let mut call = match scope {
            Some(scope) => format!("{}[{}]", what, scope.namespace().unwrap_or("*")),
            None => what.to_string(),
        };
        if let Some(sel) = &filters.label_selector {
            call.push(' ');
            call.push_str(sel);
        }
        self.calls.lock().unwrap().push(call);

        if self.fail_list == Some(what) {
            bail!("simulated {} list failure", what);
        }

        let ns = scope.and_then(Scope::namespace);
        Ok(items
            .iter()
            .filter(|obj| ns.is_none() || obj.meta().namespace.as_deref() == ns)
            .filter(|obj| matches_selector(obj.meta(), filters.label_selector.as_deref()))
            .cloned()
            .collect())
    }
}

// Equality-only selectors are enough for tests
fn matches_selector(meta: &ObjectMeta, selector: Option<&str>) -> bool {
    let Some(selector) = selector else { return true };
    let labels = meta.labels.clone().unwrap_or_default();
    selector.split(',').all(|term| match term.split_once('=') {
        Some((k, v)) => labels.get(k.trim()).map(String::as_str) == Some(v.trim()),
        None => false,
    })
}

#[async_trait]
impl Inventory for FakeInventory {
    async fn pods(&self, scope: &Scope, filters: &ApiFilters) -> Result<Vec<Pod>> {
        self.list("pods", &self.pods, Some(scope), filters)
    }

    async fn config_maps(&self, scope: &Scope, filters: &ApiFilters) -> Result<Vec<ConfigMap>> {
        self.list("configmaps", &self.config_maps, Some(scope), filters)
    }

    async fn secrets(&self, scope: &Scope, filters: &ApiFilters) -> Result<Vec<Secret>> {
        self.list("secrets", &self.secrets, Some(scope), filters)
    }

    async fn persistent_volume_claims(
        &self,
        scope: &Scope,
        filters: &ApiFilters,
    ) -> Result<Vec<PersistentVolumeClaim>> {
        self.list("persistentvolumeclaims", &self.pvcs, Some(scope), filters)
    }

    async fn jobs(&self, scope: &Scope, filters: &ApiFilters) -> Result<Vec<Job>> {
        self.list("jobs", &self.jobs, Some(scope), filters)
    }

    async fn service_accounts(
        &self,
        scope: &Scope,
        filters: &ApiFilters,
    ) -> Result<Vec<ServiceAccount>> {
        self.list("serviceaccounts", &self.service_accounts, Some(scope), filters)
    }

    async fn services(&self, scope: &Scope, filters: &ApiFilters) -> Result<Vec<Service>> {
        self.list("services", &self.services, Some(scope), filters)
    }

    async fn deployments(&self, scope: &Scope, filters: &ApiFilters) -> Result<Vec<Deployment>> {
        self.list("deployments", &self.deployments, Some(scope), filters)
    }

    async fn stateful_sets(&self, scope: &Scope, filters: &ApiFilters) -> Result<Vec<StatefulSet>> {
        self.list("statefulsets", &self.stateful_sets, Some(scope), filters)
    }

    async fn daemon_sets(&self, scope: &Scope, filters: &ApiFilters) -> Result<Vec<DaemonSet>> {
        self.list("daemonsets", &self.daemon_sets, Some(scope), filters)
    }

    async fn namespaces(&self, filters: &ApiFilters) -> Result<Vec<Namespace>> {
        self.list("namespaces", &self.namespaces, None, filters)
    }

    async fn delete(&self, kind: ResourceKind, namespace: &str, name: &str) -> Result<()> {
        let attempt = {
            let mut attempts = self.delete_attempts.lock().unwrap();
            *attempts += 1;
            *attempts
        };
        if self.fail_delete_at == Some(attempt) {
            bail!("simulated delete failure for {}", name);
        }
        let target = if namespace.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", namespace, name)
        };
        self.deleted.lock().unwrap().push(format!("{} {}", kind, target));
        Ok(())
    }
}

/// Run one classifier against a fake inventory with default exemptions
pub async fn run(
    inventory: &FakeInventory,
    classifier: &dyn Classifier,
    scope: &Scope,
    cutoff: Option<DateTime<Utc>>,
    label_selector: Option<&str>,
) -> Result<ResourceList, PruneError> {
    let exemptions = Exemptions::default();
    let progress = create_progress_handle();
    let ctx = ClassifyContext {
        inventory,
        exemptions: &exemptions,
        scope,
        cutoff,
        label_selector,
        progress: &progress,
    };
    classifier.classify(&ctx).await
}

pub fn item_names(list: &ResourceList) -> Vec<String> {
    list.items().iter().map(|i| i.name.clone()).collect()
}

pub fn hours_ago(hours: i64) -> DateTime<Utc> {
    Utc::now() - Duration::hours(hours)
}

pub fn minutes_ago(minutes: i64) -> DateTime<Utc> {
    Utc::now() - Duration::minutes(minutes)
}

pub fn time(at: DateTime<Utc>) -> Time {
    Time(at)
}

/// Metadata for an object created 30 days ago
pub fn meta(namespace: &str, name: &str) -> ObjectMeta {
    ObjectMeta {
        name: Some(name.to_string()),
        namespace: (!namespace.is_empty()).then(|| namespace.to_string()),
        creation_timestamp: Some(time(hours_ago(24 * 30))),
        ..Default::default()
    }
}

fn from_json<T: DeserializeOwned>(value: serde_json::Value) -> T {
    serde_json::from_value(value).expect("valid fixture")
}

pub fn labeled<K: Resource>(mut obj: K, key: &str, value: &str) -> K {
    obj.meta_mut()
        .labels
        .get_or_insert_with(BTreeMap::new)
        .insert(key.to_string(), value.to_string());
    obj
}

pub fn owned<K: Resource>(mut obj: K, owner_kind: &str) -> K {
    obj.meta_mut()
        .owner_references
        .get_or_insert_with(Vec::new)
        .push(OwnerReference {
            api_version: "v1".to_string(),
            kind: owner_kind.to_string(),
            name: "owner".to_string(),
            uid: "0000".to_string(),
            ..Default::default()
        });
    obj
}

pub fn pod(namespace: &str, name: &str) -> Pod {
    Pod {
        metadata: meta(namespace, name),
        spec: Some(PodSpec {
            containers: vec![Container {
                name: "main".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        }),
        status: None,
    }
}

pub fn pod_with_spec(namespace: &str, name: &str, f: impl FnOnce(&mut PodSpec)) -> Pod {
    let mut pod = pod(namespace, name);
    if let Some(spec) = pod.spec.as_mut() {
        f(spec);
    }
    pod
}

pub fn finished_pod(namespace: &str, name: &str, phase: &str) -> Pod {
    let mut pod = pod(namespace, name);
    pod.status = Some(PodStatus {
        phase: Some(phase.to_string()),
        ..Default::default()
    });
    pod
}

pub fn container_with_env_from(env_from: EnvFromSource) -> Container {
    Container {
        name: "init".to_string(),
        env_from: Some(vec![env_from]),
        ..Default::default()
    }
}

pub fn config_map_volume(name: &str) -> Volume {
    from_json(json!({ "name": format!("vol-{name}"), "configMap": { "name": name } }))
}

pub fn secret_volume(name: &str) -> Volume {
    from_json(json!({ "name": format!("vol-{name}"), "secret": { "secretName": name } }))
}

pub fn pvc_volume(name: &str) -> Volume {
    from_json(json!({
        "name": format!("vol-{name}"),
        "persistentVolumeClaim": { "claimName": name }
    }))
}

pub fn config_map_env(name: &str) -> EnvVar {
    from_json(json!({
        "name": "SETTING",
        "valueFrom": { "configMapKeyRef": { "name": name, "key": "setting" } }
    }))
}

pub fn secret_env(name: &str) -> EnvVar {
    from_json(json!({
        "name": "PASSWORD",
        "valueFrom": { "secretKeyRef": { "name": name, "key": "password" } }
    }))
}

pub fn config_map_env_from(name: &str) -> EnvFromSource {
    from_json(json!({ "configMapRef": { "name": name } }))
}

pub fn secret_env_from(name: &str) -> EnvFromSource {
    from_json(json!({ "secretRef": { "name": name } }))
}

pub fn local_ref(name: &str) -> LocalObjectReference {
    from_json(json!({ "name": name }))
}

pub fn service_account(
    namespace: &str,
    name: &str,
    secrets: &[&str],
    pull_secrets: &[&str],
) -> ServiceAccount {
    ServiceAccount {
        metadata: meta(namespace, name),
        secrets: Some(
            secrets
                .iter()
                .map(|s| ObjectReference {
                    name: Some(s.to_string()),
                    ..Default::default()
                })
                .collect(),
        ),
        image_pull_secrets: Some(pull_secrets.iter().map(|s| local_ref(s)).collect()),
        ..Default::default()
    }
}

pub fn config_map(namespace: &str, name: &str) -> ConfigMap {
    ConfigMap {
        metadata: meta(namespace, name),
        ..Default::default()
    }
}

pub fn config_map_aged(namespace: &str, name: &str, created: DateTime<Utc>) -> ConfigMap {
    let mut cm = config_map(namespace, name);
    cm.metadata.creation_timestamp = Some(time(created));
    cm
}

pub fn secret(namespace: &str, name: &str, secret_type: &str) -> Secret {
    Secret {
        metadata: meta(namespace, name),
        type_: Some(secret_type.to_string()),
        ..Default::default()
    }
}

pub fn pvc(namespace: &str, name: &str) -> PersistentVolumeClaim {
    PersistentVolumeClaim {
        metadata: meta(namespace, name),
        ..Default::default()
    }
}

pub fn job(namespace: &str, name: &str, complete: bool) -> Job {
    Job {
        metadata: meta(namespace, name),
        spec: None,
        status: Some(JobStatus {
            completion_time: complete.then(|| time(hours_ago(24))),
            ..Default::default()
        }),
    }
}

pub fn namespace(name: &str) -> Namespace {
    Namespace {
        metadata: meta("", name),
        ..Default::default()
    }
}

pub fn service(namespace: &str, name: &str) -> Service {
    Service {
        metadata: meta(namespace, name),
        ..Default::default()
    }
}

pub fn deployment(namespace: &str, name: &str) -> Deployment {
    Deployment {
        metadata: meta(namespace, name),
        ..Default::default()
    }
}

pub fn stateful_set(namespace: &str, name: &str) -> StatefulSet {
    StatefulSet {
        metadata: meta(namespace, name),
        ..Default::default()
    }
}

pub fn daemon_set(namespace: &str, name: &str) -> DaemonSet {
    DaemonSet {
        metadata: meta(namespace, name),
        ..Default::default()
    }
}
