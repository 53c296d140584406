// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Configuration for k8s-pruner
//!
//! Optional defaults live in a config file. All k8s-pruner data is stored
//! under ~/.k8s-pruner/:
//! - ~/.k8s-pruner/config.json - user configuration
//! - ~/.k8s-pruner/log/ - log files

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::OutputFormat;
use crate::prune::ResourceKind;

/// Get the base k8s-pruner directory (~/.k8s-pruner/)
pub fn base_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|p| p.join(".k8s-pruner"))
        .context("Could not determine home directory")
}

/// k8s-pruner configuration. Command-line flags take precedence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Resource types checked when --types is not given
    #[serde(default)]
    pub types: Vec<ResourceKind>,
    #[serde(default)]
    pub kubeconfig: Option<PathBuf>,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub output: Option<OutputFormat>,
}

impl Config {
    /// Load config from disk, or return default if not found
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Get the config file path (~/.k8s-pruner/config.json)
    pub fn config_path() -> Result<PathBuf> {
        Ok(base_dir()?.join("config.json"))
    }

    /// Resource types to classify: explicit selection, then configured, then all
    pub fn resolve_types(&self, requested: &[ResourceKind]) -> Vec<ResourceKind> {
        if !requested.is_empty() {
            requested.to_vec()
        } else if !self.types.is_empty() {
            self.types.clone()
        } else {
            ResourceKind::ALL.to_vec()
        }
    }
}
