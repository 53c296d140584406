// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Static exemption tables
//!
//! Built once at start-up and shared by reference with every classifier.

use std::collections::HashSet;

pub const SERVICE_ACCOUNT_TOKEN_TYPE: &str = "kubernetes.io/service-account-token";
pub const TLS_SECRET_TYPE: &str = "kubernetes.io/tls";

/// Control-plane and add-on namespaces that are never considered empty
const PROTECTED_NAMESPACES: &[&str] = &[
    "default",
    "kube-system",
    "kube-public",
    "kube-node-lease",
    "cert-manager",
    "ingress-nginx",
    "monitoring",
    "istio-system",
    "knative-serving",
    "cattle-system",
    "cattle-global-data",
    "cattle-global-nt",
    "cattle-impersonation-system",
    "local-path-storage",
];

/// Immutable exemption rules shared by all classifiers
#[derive(Debug, Clone)]
pub struct Exemptions {
    /// Namespace whose config maps and secrets are never reported
    pub system_namespace: String,
    /// Cluster root-CA bundle published into every namespace
    pub root_ca_config_map: String,
    /// Secret types never reported as unused
    pub secret_types: HashSet<String>,
    /// Namespaces the emptiness evaluator never selects
    pub protected_namespaces: HashSet<String>,
    /// Config maps that do not make a namespace non-empty
    pub default_config_maps: HashSet<String>,
    /// Secret name prefixes that do not make a namespace non-empty
    pub default_secret_prefixes: Vec<String>,
    /// Implicit service that does not make a namespace non-empty
    pub default_service: String,
}

impl Default for Exemptions {
    fn default() -> Self {
        Self {
            system_namespace: "kube-system".to_string(),
            root_ca_config_map: "kube-root-ca.crt".to_string(),
            secret_types: [SERVICE_ACCOUNT_TOKEN_TYPE, TLS_SECRET_TYPE]
                .into_iter()
                .map(String::from)
                .collect(),
            protected_namespaces: PROTECTED_NAMESPACES.iter().map(|s| s.to_string()).collect(),
            default_config_maps: ["kube-root-ca.crt".to_string()].into(),
            default_secret_prefixes: vec!["default-token".to_string()],
            default_service: "kubernetes".to_string(),
        }
    }
}

impl Exemptions {
    pub fn config_map_exempt(&self, namespace: &str, name: &str) -> bool {
        namespace == self.system_namespace || name == self.root_ca_config_map
    }

    pub fn secret_exempt(&self, namespace: &str, secret_type: Option<&str>) -> bool {
        namespace == self.system_namespace
            || secret_type.is_some_and(|t| self.secret_types.contains(t))
    }

    pub fn namespace_protected(&self, name: &str) -> bool {
        self.protected_namespaces.contains(name)
    }

    /// Whether a config map is one the platform creates in every namespace
    pub fn is_default_config_map(&self, name: &str) -> bool {
        self.default_config_maps.contains(name)
    }

    /// Whether a secret is a token or a default-named secret
    pub fn is_default_secret(&self, name: &str, secret_type: Option<&str>) -> bool {
        secret_type == Some(SERVICE_ACCOUNT_TOKEN_TYPE)
            || self
                .default_secret_prefixes
                .iter()
                .any(|prefix| name.starts_with(prefix.as_str()))
    }

    pub fn is_default_service(&self, name: &str) -> bool {
        name == self.default_service
    }
}
