// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::prune::ResourceKind;

#[derive(Parser, Debug)]
#[command(name = "k8s-pruner")]
#[command(author, version, about = "List and prune unused Kubernetes resources")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Namespace to target (default is all namespaces)
    #[arg(short, long, global = true)]
    pub namespace: Option<String>,

    /// Print resources that would be pruned without deleting them
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Only consider resources older than this (e.g. 30m, 24h, 7d)
    #[arg(long, global = true, value_name = "DURATION")]
    pub age: Option<String>,

    /// Kubernetes context to use (default: current context)
    #[arg(long, global = true, value_name = "CONTEXT")]
    pub context: Option<String>,

    /// Path to the kubeconfig file
    #[arg(long, global = true, value_name = "PATH")]
    pub kubeconfig: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List unused resources
    List(SelectArgs),

    /// Delete unused resources
    Prune {
        #[command(flatten)]
        select: SelectArgs,

        /// Skip the confirmation prompt
        #[arg(long)]
        force: bool,
    },

    /// Print the version number
    Version,
}

/// Which resources to classify
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct SelectArgs {
    /// Resource types to check (configmaps, secrets, pvcs, pods, jobs, namespaces)
    #[arg(long, value_delimiter = ',', value_name = "TYPES")]
    pub types: Vec<ResourceKind>,

    /// Label selector to filter resources
    #[arg(long, value_name = "SELECTOR")]
    pub labels: Option<String>,
}

#[derive(ValueEnum, Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml,
}
