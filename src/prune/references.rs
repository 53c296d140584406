// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Reference index built from live workload specs
//!
//! Records every `namespace/name` a pod or service account points at, so
//! classifiers can test candidates by membership.

use std::collections::HashSet;
use std::fmt;

use k8s_openapi::api::core::v1::{Container, Pod, ServiceAccount};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

/// Composite `namespace/name` identity of a namespaced object
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReferenceKey(String);

impl ReferenceKey {
    pub fn new(namespace: &str, name: &str) -> Self {
        Self(format!("{}/{}", namespace, name))
    }

    pub fn of(meta: &ObjectMeta) -> Self {
        Self::new(
            meta.namespace.as_deref().unwrap_or_default(),
            meta.name.as_deref().unwrap_or_default(),
        )
    }
}

impl fmt::Display for ReferenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Set of referenced keys for one classification pass
#[derive(Debug, Default)]
pub struct ReferenceIndex {
    keys: HashSet<ReferenceKey>,
}

impl ReferenceIndex {
    pub fn contains(&self, key: &ReferenceKey) -> bool {
        self.keys.contains(key)
    }

    pub fn is_referenced(&self, meta: &ObjectMeta) -> bool {
        self.contains(&ReferenceKey::of(meta))
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    // Accepts both `String` and `Option<String>` reference names
    fn insert(&mut self, namespace: &str, name: impl Into<Option<String>>) {
        if let Some(name) = name.into().filter(|n| !n.is_empty()) {
            self.keys.insert(ReferenceKey::new(namespace, &name));
        }
    }

    /// Config maps referenced through volumes, `env` key refs and `envFrom`
    pub fn config_maps(pods: &[Pod]) -> Self {
        let mut index = Self::default();
        for pod in pods {
            let ns = pod.metadata.namespace.as_deref().unwrap_or_default();
            let Some(spec) = &pod.spec else { continue };

            for volume in spec.volumes.iter().flatten() {
                if let Some(cm) = &volume.config_map {
                    index.insert(ns, cm.name.clone());
                }
            }

            for container in all_containers(&spec.containers, spec.init_containers.as_deref()) {
                for env in container.env.iter().flatten() {
                    let value_from = env.value_from.as_ref();
                    if let Some(key_ref) = value_from.and_then(|v| v.config_map_key_ref.as_ref()) {
                        index.insert(ns, key_ref.name.clone());
                    }
                }
                for env_from in container.env_from.iter().flatten() {
                    if let Some(cm_ref) = &env_from.config_map_ref {
                        index.insert(ns, cm_ref.name.clone());
                    }
                }
            }
        }
        index
    }

    /// Secrets referenced by pods (volumes, env, envFrom, image pull secrets)
    /// and by service accounts (token and pull-secret lists)
    pub fn secrets(pods: &[Pod], service_accounts: &[ServiceAccount]) -> Self {
        let mut index = Self::default();
        for pod in pods {
            let ns = pod.metadata.namespace.as_deref().unwrap_or_default();
            let Some(spec) = &pod.spec else { continue };

            for volume in spec.volumes.iter().flatten() {
                if let Some(secret) = &volume.secret {
                    index.insert(ns, secret.secret_name.clone());
                }
            }

            for container in all_containers(&spec.containers, spec.init_containers.as_deref()) {
                for env in container.env.iter().flatten() {
                    let value_from = env.value_from.as_ref();
                    if let Some(key_ref) = value_from.and_then(|v| v.secret_key_ref.as_ref()) {
                        index.insert(ns, key_ref.name.clone());
                    }
                }
                for env_from in container.env_from.iter().flatten() {
                    if let Some(secret_ref) = &env_from.secret_ref {
                        index.insert(ns, secret_ref.name.clone());
                    }
                }
            }

            for pull in spec.image_pull_secrets.iter().flatten() {
                index.insert(ns, pull.name.clone());
            }
        }

        for sa in service_accounts {
            let ns = sa.metadata.namespace.as_deref().unwrap_or_default();
            for secret in sa.secrets.iter().flatten() {
                index.insert(ns, secret.name.clone());
            }
            for pull in sa.image_pull_secrets.iter().flatten() {
                index.insert(ns, pull.name.clone());
            }
        }
        index
    }

    /// PVCs referenced by pod volumes
    pub fn persistent_volume_claims(pods: &[Pod]) -> Self {
        let mut index = Self::default();
        for pod in pods {
            let ns = pod.metadata.namespace.as_deref().unwrap_or_default();
            let volumes = pod.spec.as_ref().and_then(|s| s.volumes.as_ref());
            for volume in volumes.into_iter().flatten() {
                if let Some(claim) = &volume.persistent_volume_claim {
                    index.insert(ns, claim.claim_name.clone());
                }
            }
        }
        index
    }
}

fn all_containers<'a>(
    containers: &'a [Container],
    init_containers: Option<&'a [Container]>,
) -> impl Iterator<Item = &'a Container> {
    containers.iter().chain(init_containers.unwrap_or_default())
}
