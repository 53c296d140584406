// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

use thiserror::Error;

use super::ResourceKind;

/// Boxed cause carried by inventory and deletion failures
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors returned by the classification engine and the deletion executor
#[derive(Debug, Error)]
pub enum PruneError {
    /// Malformed age-duration input, detected before any inventory call
    #[error("invalid age '{input}': {reason}")]
    InvalidAge { input: String, reason: &'static str },

    #[error(
        "unknown resource type '{0}' (expected configmaps, secrets, pvcs, pods, jobs or namespaces)"
    )]
    UnknownKind(String),

    /// A required collection could not be listed
    #[error("failed to list {what}")]
    Inventory {
        what: &'static str,
        #[source]
        source: BoxError,
    },

    /// A point delete failed after `deleted` earlier deletions succeeded
    #[error("failed to delete {kind} {target} ({deleted} deleted before failure)")]
    Deletion {
        kind: ResourceKind,
        target: String,
        deleted: usize,
        #[source]
        source: BoxError,
    },
}

impl PruneError {
    pub(crate) fn inventory(what: &'static str, source: impl Into<BoxError>) -> Self {
        PruneError::Inventory {
            what,
            source: source.into(),
        }
    }

    /// Number of objects deleted before a deletion failure (zero for other errors)
    pub fn deleted_count(&self) -> usize {
        match self {
            PruneError::Deletion { deleted, .. } => *deleted,
            _ => 0,
        }
    }
}
