use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, StatefulSet};
use k8s_openapi::api::batch::v1::Job;
use k8s_openapi::api::core::v1::{
    ConfigMap, Namespace, PersistentVolumeClaim, Pod, Secret, Service, ServiceAccount,
};
use k8s_openapi::NamespaceResourceScope;
use kube::api::{DeleteParams, ListParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Api, Client, Config, Resource};
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace};

use super::{ApiFilters, Inventory, Scope};
use crate::progress::ProgressHandle;
use crate::prune::ResourceKind;

/// Timeout for connecting to K8s API
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for reading K8s API responses
const READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Page size for paginated list requests
const PAGE_SIZE: u32 = 500;

/// Build a client for the given kubeconfig file and context.
/// Without a path the standard kubeconfig lookup applies (KUBECONFIG, ~/.kube/config).
pub async fn connect(
    kubeconfig_path: Option<&Path>,
    context: Option<&str>,
    progress: &ProgressHandle,
) -> Result<Client> {
    let kubeconfig = match kubeconfig_path {
        Some(path) => Kubeconfig::read_from(path)
            .with_context(|| format!("Failed to read kubeconfig: {}", path.display()))?,
        None => Kubeconfig::read().context("Failed to read kubeconfig")?,
    };

    let context_name = context
        .map(String::from)
        .or_else(|| kubeconfig.current_context.clone())
        .ok_or_else(|| anyhow!("No context specified and no current context in kubeconfig"))?;

    if !kubeconfig.contexts.iter().any(|c| c.name == context_name) {
        return Err(anyhow!("Context '{}' not found in kubeconfig", context_name));
    }

    progress.connecting(&context_name);
    let start = Instant::now();

    let mut config = Config::from_custom_kubeconfig(
        kubeconfig,
        &KubeConfigOptions {
            context: Some(context_name.clone()),
            ..Default::default()
        },
    )
    .await
    .with_context(|| format!("Failed to load kubeconfig for context '{}'", context_name))?;

    config.connect_timeout = Some(CONNECT_TIMEOUT);
    config.read_timeout = Some(READ_TIMEOUT);

    let client = Client::try_from(config)
        .with_context(|| format!("Failed to create client for context '{}'", context_name))?;

    progress.connected(&context_name, start.elapsed().as_millis() as u64);
    info!(context = %context_name, "Connected to cluster");

    Ok(client)
}

/// Inventory backed by a live cluster
#[derive(Clone)]
pub struct KubeInventory {
    client: Client,
}

impl KubeInventory {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn scoped_api<K>(&self, scope: &Scope) -> Api<K>
    where
        K: Resource<Scope = NamespaceResourceScope>,
        K::DynamicType: Default,
    {
        match scope {
            Scope::AllNamespaces => Api::all(self.client.clone()),
            Scope::Namespace(ns) => Api::namespaced(self.client.clone(), ns),
        }
    }

    async fn list_scoped<K>(&self, scope: &Scope, filters: &ApiFilters) -> Result<Vec<K>>
    where
        K: Resource<Scope = NamespaceResourceScope> + Clone + DeserializeOwned + Debug,
        K::DynamicType: Default,
    {
        self.list_all(self.scoped_api(scope), scope, filters).await
    }

    /// List every page of a collection, keeping server order
    async fn list_all<K>(&self, api: Api<K>, scope: &Scope, filters: &ApiFilters) -> Result<Vec<K>>
    where
        K: Resource + Clone + DeserializeOwned + Debug,
        K::DynamicType: Default,
    {
        let kind = K::kind(&K::DynamicType::default()).to_string();
        let base_params = build_list_params(filters);
        let mut items: Vec<K> = Vec::new();
        let mut continue_token: Option<String> = None;
        let mut page_count = 0u32;

        debug!(
            kind = %kind,
            namespace = ?scope.namespace(),
            label_selector = ?filters.label_selector,
            "Listing resources"
        );

        loop {
            let mut params = base_params.clone().limit(PAGE_SIZE);
            if let Some(ref token) = continue_token {
                params = params.continue_token(token);
            }

            let list = api
                .list(&params)
                .await
                .with_context(|| format!("K8s API error listing {}", kind))?;

            items.extend(list.items);
            page_count += 1;

            match list.metadata.continue_ {
                Some(token) if !token.is_empty() => {
                    trace!(
                        kind = %kind,
                        page = page_count,
                        total_so_far = items.len(),
                        "Fetched page, continuing"
                    );
                    continue_token = Some(token);
                }
                _ => break,
            }
        }

        debug!(kind = %kind, pages = page_count, total_items = items.len(), "List complete");
        Ok(items)
    }

    async fn delete_scoped<K>(&self, namespace: &str, name: &str) -> Result<()>
    where
        K: Resource<Scope = NamespaceResourceScope> + Clone + DeserializeOwned + Debug,
        K::DynamicType: Default,
    {
        let api: Api<K> = Api::namespaced(self.client.clone(), namespace);
        api.delete(name, &DeleteParams::default()).await?;
        Ok(())
    }
}

/// Build ListParams from API filters
fn build_list_params(filters: &ApiFilters) -> ListParams {
    let mut params = ListParams::default();
    if let Some(ref label_sel) = filters.label_selector {
        params = params.labels(label_sel);
    }
    params
}

#[async_trait]
impl Inventory for KubeInventory {
    async fn pods(&self, scope: &Scope, filters: &ApiFilters) -> Result<Vec<Pod>> {
        self.list_scoped(scope, filters).await
    }

    async fn config_maps(&self, scope: &Scope, filters: &ApiFilters) -> Result<Vec<ConfigMap>> {
        self.list_scoped(scope, filters).await
    }

    async fn secrets(&self, scope: &Scope, filters: &ApiFilters) -> Result<Vec<Secret>> {
        self.list_scoped(scope, filters).await
    }

    async fn persistent_volume_claims(
        &self,
        scope: &Scope,
        filters: &ApiFilters,
    ) -> Result<Vec<PersistentVolumeClaim>> {
        self.list_scoped(scope, filters).await
    }

    async fn jobs(&self, scope: &Scope, filters: &ApiFilters) -> Result<Vec<Job>> {
        self.list_scoped(scope, filters).await
    }

    async fn service_accounts(
        &self,
        scope: &Scope,
        filters: &ApiFilters,
    ) -> Result<Vec<ServiceAccount>> {
        self.list_scoped(scope, filters).await
    }

    async fn services(&self, scope: &Scope, filters: &ApiFilters) -> Result<Vec<Service>> {
        self.list_scoped(scope, filters).await
    }

    async fn deployments(&self, scope: &Scope, filters: &ApiFilters) -> Result<Vec<Deployment>> {
        self.list_scoped(scope, filters).await
    }

    async fn stateful_sets(&self, scope: &Scope, filters: &ApiFilters) -> Result<Vec<StatefulSet>> {
        self.list_scoped(scope, filters).await
    }

    async fn daemon_sets(&self, scope: &Scope, filters: &ApiFilters) -> Result<Vec<DaemonSet>> {
        self.list_scoped(scope, filters).await
    }

    async fn namespaces(&self, filters: &ApiFilters) -> Result<Vec<Namespace>> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        self.list_all(api, &Scope::AllNamespaces, filters).await
    }

    async fn delete(&self, kind: ResourceKind, namespace: &str, name: &str) -> Result<()> {
        debug!(kind = %kind, namespace = %namespace, name = %name, "Deleting resource");
        let result = match kind {
            ResourceKind::ConfigMap => self.delete_scoped::<ConfigMap>(namespace, name).await,
            ResourceKind::Secret => self.delete_scoped::<Secret>(namespace, name).await,
            ResourceKind::PersistentVolumeClaim => {
                self.delete_scoped::<PersistentVolumeClaim>(namespace, name).await
            }
            ResourceKind::Pod => self.delete_scoped::<Pod>(namespace, name).await,
            ResourceKind::Job => self.delete_scoped::<Job>(namespace, name).await,
            ResourceKind::Namespace => {
                let api: Api<Namespace> = Api::all(self.client.clone());
                api.delete(name, &DeleteParams::default())
                    .await
                    .map(|_| ())
                    .map_err(anyhow::Error::from)
            }
        };
        result.with_context(|| format!("K8s API error deleting {} '{}'", kind, name))
    }
}
