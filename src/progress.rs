// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Progress reporting for long-running operations
//!
//! The detector reports what it is classifying or deleting, and the CLI
//! turns those updates into spinner messages.

use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::broadcast;

use crate::prune::ResourceKind;

/// Create a spinner with consistent styling
pub fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
        .template("{spinner:.cyan} {msg} {elapsed:.dim}")
    {
        pb.set_style(style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}

/// Progress update message
#[derive(Clone, Debug)]
pub enum ProgressUpdate {
    // === Connection ===
    /// Connecting to a cluster
    Connecting { cluster: String },
    /// Connected to a cluster
    Connected { cluster: String, elapsed_ms: u64 },

    // === Classification ===
    /// Started classifying one resource kind
    ClassifyStarted { kind: ResourceKind },
    /// Checking whether a namespace is empty
    NamespaceChecked { name: String },
    /// Finished classifying one resource kind
    ClassifyComplete {
        kind: ResourceKind,
        found: usize,
        elapsed_ms: u64,
    },

    // === Deletion ===
    /// One object deleted
    Deleted { kind: ResourceKind, target: String },
}

/// Global progress reporter
pub struct ProgressReporter {
    sender: broadcast::Sender<ProgressUpdate>,
    /// Objects reported unused so far in this run
    found: AtomicUsize,
    /// Objects deleted so far in this run
    deleted: AtomicUsize,
}

impl ProgressReporter {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(100);
        Self {
            sender,
            found: AtomicUsize::new(0),
            deleted: AtomicUsize::new(0),
        }
    }

    /// Subscribe to progress updates
    pub fn subscribe(&self) -> broadcast::Receiver<ProgressUpdate> {
        self.sender.subscribe()
    }

    /// Report connecting to a cluster
    pub fn connecting(&self, cluster: &str) {
        let _ = self.sender.send(ProgressUpdate::Connecting {
            cluster: cluster.to_string(),
        });
    }

    /// Report connected to a cluster
    pub fn connected(&self, cluster: &str, elapsed_ms: u64) {
        let _ = self.sender.send(ProgressUpdate::Connected {
            cluster: cluster.to_string(),
            elapsed_ms,
        });
    }

    pub fn classify_started(&self, kind: ResourceKind) {
        let _ = self.sender.send(ProgressUpdate::ClassifyStarted { kind });
    }

    pub fn namespace_checked(&self, name: &str) {
        let _ = self.sender.send(ProgressUpdate::NamespaceChecked {
            name: name.to_string(),
        });
    }

    pub fn classify_complete(&self, kind: ResourceKind, found: usize, elapsed_ms: u64) {
        self.found.fetch_add(found, Ordering::SeqCst);
        let _ = self.sender.send(ProgressUpdate::ClassifyComplete {
            kind,
            found,
            elapsed_ms,
        });
    }

    pub fn deleted(&self, kind: ResourceKind, target: &str) {
        self.deleted.fetch_add(1, Ordering::SeqCst);
        let _ = self.sender.send(ProgressUpdate::Deleted {
            kind,
            target: target.to_string(),
        });
    }

    /// Get current totals (found, deleted)
    pub fn totals(&self) -> (usize, usize) {
        (
            self.found.load(Ordering::SeqCst),
            self.deleted.load(Ordering::SeqCst),
        )
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Thread-safe handle to progress reporter
pub type ProgressHandle = Arc<ProgressReporter>;

/// Create a new progress reporter handle
pub fn create_progress_handle() -> ProgressHandle {
    Arc::new(ProgressReporter::new())
}
