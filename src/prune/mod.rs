// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Unused resource classification engine
//!
//! Each resource kind has a [`Classifier`] registered in a [`ClassifierRegistry`].
//! The [`Detector`] runs the requested classifiers one after another against a
//! point-in-time inventory and hands the aggregated result to the deletion executor.

mod age;
mod configmaps;
mod delete;
mod error;
mod exemptions;
mod jobs;
mod namespaces;
mod pods;
mod pvcs;
mod references;
mod secrets;
#[cfg(test)]
pub(crate) mod testing;

pub use age::parse_age;
pub use error::PruneError;
pub use exemptions::Exemptions;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use crate::kubernetes::{ApiFilters, Inventory, Scope};
use crate::progress::ProgressHandle;

/// Resource kinds the engine can classify
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    #[serde(rename = "configmaps")]
    ConfigMap,
    #[serde(rename = "secrets")]
    Secret,
    #[serde(rename = "pvcs")]
    PersistentVolumeClaim,
    #[serde(rename = "pods")]
    Pod,
    #[serde(rename = "jobs")]
    Job,
    #[serde(rename = "namespaces")]
    Namespace,
}

impl ResourceKind {
    /// Every kind, in default classification order
    pub const ALL: [ResourceKind; 6] = [
        ResourceKind::ConfigMap,
        ResourceKind::Secret,
        ResourceKind::PersistentVolumeClaim,
        ResourceKind::Pod,
        ResourceKind::Job,
        ResourceKind::Namespace,
    ];

    /// Name used on the command line and in config files
    pub fn type_name(&self) -> &'static str {
        match self {
            ResourceKind::ConfigMap => "configmaps",
            ResourceKind::Secret => "secrets",
            ResourceKind::PersistentVolumeClaim => "pvcs",
            ResourceKind::Pod => "pods",
            ResourceKind::Job => "jobs",
            ResourceKind::Namespace => "namespaces",
        }
    }

    /// Heading used when rendering a result list
    pub fn display_name(&self) -> &'static str {
        match self {
            ResourceKind::ConfigMap => "ConfigMaps",
            ResourceKind::Secret => "Secrets",
            ResourceKind::PersistentVolumeClaim => "PersistentVolumeClaims",
            ResourceKind::Pod => "Pods",
            ResourceKind::Job => "Jobs",
            ResourceKind::Namespace => "Namespaces",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

impl FromStr for ResourceKind {
    type Err = PruneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "configmaps" | "configmap" | "cm" => Ok(ResourceKind::ConfigMap),
            "secrets" | "secret" => Ok(ResourceKind::Secret),
            "pvcs" | "pvc" | "persistentvolumeclaims" | "persistentvolumeclaim" => {
                Ok(ResourceKind::PersistentVolumeClaim)
            }
            "pods" | "pod" | "po" => Ok(ResourceKind::Pod),
            "jobs" | "job" => Ok(ResourceKind::Job),
            "namespaces" | "namespace" | "ns" => Ok(ResourceKind::Namespace),
            _ => Err(PruneError::UnknownKind(s.to_string())),
        }
    }
}

/// One candidate for removal, as seen at scan time
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceItem {
    pub name: String,
    pub namespace: String,
    #[serde(rename = "age")]
    pub created_at: DateTime<Utc>,
}

impl ResourceItem {
    pub fn from_meta(meta: &ObjectMeta) -> Self {
        Self {
            name: meta.name.clone().unwrap_or_default(),
            namespace: meta.namespace.clone().unwrap_or_default(),
            created_at: age::created_at(meta),
        }
    }

    /// `namespace/name`, or just the name for cluster-scoped objects
    pub fn display_target(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}/{}", self.namespace, self.name)
        }
    }
}

/// Classified objects of a single kind, in inventory listing order
#[derive(Debug, Clone, Serialize)]
pub struct ResourceList {
    #[serde(rename = "resourceType", serialize_with = "serialize_display_name")]
    resource_type: ResourceKind,
    items: Vec<ResourceItem>,
}

fn serialize_display_name<S: Serializer>(kind: &ResourceKind, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(kind.display_name())
}

impl ResourceList {
    pub fn new(resource_type: ResourceKind) -> Self {
        Self {
            resource_type,
            items: Vec::new(),
        }
    }

    pub fn resource_type(&self) -> ResourceKind {
        self.resource_type
    }

    pub fn items(&self) -> &[ResourceItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub(crate) fn push(&mut self, item: ResourceItem) {
        self.items.push(item);
    }
}

/// Total item count across result lists
pub fn total_items(results: &[ResourceList]) -> usize {
    results.iter().map(ResourceList::len).sum()
}

/// Inputs shared by every classifier in a run
pub struct ClassifyContext<'a> {
    pub inventory: &'a dyn Inventory,
    pub exemptions: &'a Exemptions,
    pub scope: &'a Scope,
    pub cutoff: Option<DateTime<Utc>>,
    pub label_selector: Option<&'a str>,
    pub progress: &'a ProgressHandle,
}

impl ClassifyContext<'_> {
    /// Filters applied to the candidate collection only
    pub fn candidate_filters(&self) -> ApiFilters {
        ApiFilters::labels(self.label_selector)
    }

    pub fn passes_cutoff(&self, meta: &ObjectMeta) -> bool {
        age::passes_cutoff(age::created_at(meta), self.cutoff)
    }
}

/// Decides which objects of one kind are unused
#[async_trait]
pub trait Classifier: Send + Sync {
    fn kind(&self) -> ResourceKind;

    /// Any inventory error aborts the classification; no partial list is returned.
    async fn classify(&self, ctx: &ClassifyContext<'_>) -> Result<ResourceList, PruneError>;
}

/// Classifiers keyed by the kind they handle
pub struct ClassifierRegistry {
    classifiers: Vec<Box<dyn Classifier>>,
}

impl ClassifierRegistry {
    pub fn empty() -> Self {
        Self {
            classifiers: Vec::new(),
        }
    }

    /// Registry with a classifier for every [`ResourceKind`]
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(configmaps::ConfigMapClassifier));
        registry.register(Box::new(secrets::SecretClassifier));
        registry.register(Box::new(pvcs::PvcClassifier));
        registry.register(Box::new(pods::CompletedPodClassifier));
        registry.register(Box::new(jobs::CompletedJobClassifier));
        registry.register(Box::new(namespaces::EmptyNamespaceClassifier));
        registry
    }

    /// Register a classifier, replacing any existing one for the same kind
    pub fn register(&mut self, classifier: Box<dyn Classifier>) {
        let kind = classifier.kind();
        self.classifiers.retain(|c| c.kind() != kind);
        self.classifiers.push(classifier);
    }

    pub fn get(&self, kind: ResourceKind) -> Option<&dyn Classifier> {
        self.classifiers
            .iter()
            .find(|c| c.kind() == kind)
            .map(|c| c.as_ref())
    }
}

/// A classification request
#[derive(Debug, Clone, Default)]
pub struct Request {
    pub scope: Scope,
    pub cutoff: Option<DateTime<Utc>>,
    pub types: Vec<ResourceKind>,
    pub label_selector: Option<String>,
}

/// Runs classifiers against an inventory and deletes what they find
pub struct Detector {
    inventory: Arc<dyn Inventory>,
    exemptions: Arc<Exemptions>,
    registry: ClassifierRegistry,
    progress: ProgressHandle,
}

impl Detector {
    pub fn new(
        inventory: Arc<dyn Inventory>,
        exemptions: Arc<Exemptions>,
        progress: ProgressHandle,
    ) -> Self {
        Self::with_registry(inventory, exemptions, ClassifierRegistry::builtin(), progress)
    }

    pub fn with_registry(
        inventory: Arc<dyn Inventory>,
        exemptions: Arc<Exemptions>,
        registry: ClassifierRegistry,
        progress: ProgressHandle,
    ) -> Self {
        Self {
            inventory,
            exemptions,
            registry,
            progress,
        }
    }

    /// Classify every requested kind in order.
    ///
    /// Empty lists are dropped. The first error aborts the run and discards
    /// lists already computed for earlier kinds.
    pub async fn find_unused(&self, request: &Request) -> Result<Vec<ResourceList>, PruneError> {
        let ctx = ClassifyContext {
            inventory: self.inventory.as_ref(),
            exemptions: &self.exemptions,
            scope: &request.scope,
            cutoff: request.cutoff,
            label_selector: request.label_selector.as_deref(),
            progress: &self.progress,
        };

        let mut seen = Vec::new();
        let mut results = Vec::new();

        for &kind in &request.types {
            if seen.contains(&kind) {
                continue;
            }
            seen.push(kind);

            let Some(classifier) = self.registry.get(kind) else {
                return Err(PruneError::UnknownKind(kind.to_string()));
            };

            self.progress.classify_started(kind);
            let start = Instant::now();
            let list = classifier.classify(&ctx).await?;
            self.progress
                .classify_complete(kind, list.len(), start.elapsed().as_millis() as u64);

            if !list.is_empty() {
                results.push(list);
            }
        }

        Ok(results)
    }

    /// Delete every item, stopping at the first failure. Returns the number deleted.
    pub async fn delete(&self, results: &[ResourceList]) -> Result<usize, PruneError> {
        delete::delete_all(self.inventory.as_ref(), results, &self.progress).await
    }
}
