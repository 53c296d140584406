// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

mod cli;
pub mod config;
mod kubernetes;
mod output;
pub mod progress;
mod prune;

use anyhow::Result;
use clap::Parser;
use console::style;
use indicatif::ProgressBar;
use std::future::Future;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::prelude::*;

use cli::{Args, Command, OutputFormat, SelectArgs};
use config::Config;
use kubernetes::{KubeInventory, Scope};
use progress::{ProgressHandle, ProgressUpdate, create_progress_handle, create_spinner};
use prune::{Detector, Exemptions, Request, ResourceList};

const RESULTS_HEADER: &str = "Found the following unused resources:";

/// Initialize logging with file output and optional stderr
fn init_logging(verbose: bool) {
    use tracing_rolling_file::{RollingConditionBase, RollingFileAppenderBase};
    use tracing_subscriber::fmt::format::FmtSpan;

    let log_dir = config::base_dir()
        .map(|p| p.join("log"))
        .unwrap_or_else(|_| std::path::PathBuf::from("."));

    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        eprintln!("Warning: Could not create log directory: {}", e);
        return;
    }

    // Rotate daily or at 10MB, keeping 5 files
    let log_path = log_dir.join("k8s-pruner.log");
    let condition = RollingConditionBase::new()
        .daily()
        .max_size(10 * 1024 * 1024);

    let file_appender = match RollingFileAppenderBase::new(log_path, condition, 5) {
        Ok(appender) => appender,
        Err(e) => {
            eprintln!("Warning: Could not create log file: {}", e);
            return;
        }
    };

    let (non_blocking, _guard) = file_appender.get_non_blocking_appender();
    // Leak the guard to keep the background writer alive
    std::mem::forget(_guard);

    let filter = if verbose {
        "k8s_pruner=debug"
    } else {
        "k8s_pruner=info"
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_span_events(FmtSpan::NONE);

    if verbose {
        let stderr_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_span_events(FmtSpan::NONE);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(file_layer)
            .with(stderr_layer)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(file_layer)
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Install rustls crypto provider (aws-lc-rs)
    rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    let args = Args::parse();
    init_logging(args.verbose);

    match &args.command {
        Command::Version => {
            println!("k8s-pruner version {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Command::List(select) => {
            let session = Session::open(&args, select).await?;
            session.classify().await?;
            Ok(())
        }
        Command::Prune { select, force } => {
            let session = Session::open(&args, select).await?;
            let results = session.classify().await?;
            session.prune(&results, args.dry_run, *force).await
        }
    }
}

/// One connected run of the detector
struct Session {
    detector: Detector,
    request: Request,
    format: OutputFormat,
    progress: ProgressHandle,
}

impl Session {
    async fn open(args: &Args, select: &SelectArgs) -> Result<Self> {
        let config = Config::load().unwrap_or_else(|e| {
            eprintln!("Warning: Ignoring config file: {:#}", e);
            Config::default()
        });

        // Reject a bad --age before touching the cluster
        let cutoff = prune::parse_age(args.age.as_deref().unwrap_or(""))?;

        let request = Request {
            scope: Scope::from_namespace(args.namespace.as_deref()),
            cutoff,
            types: config.resolve_types(&select.types),
            label_selector: select.labels.clone(),
        };

        let kubeconfig = args.kubeconfig.clone().or_else(|| config.kubeconfig.clone());
        let context = args.context.clone().or_else(|| config.context.clone());
        let format = args.output.clone().or(config.output).unwrap_or_default();

        let progress = create_progress_handle();
        let spinner = create_spinner("Connecting to Kubernetes...");
        let client = drive_spinner(
            &spinner,
            &progress,
            kubernetes::connect(kubeconfig.as_deref(), context.as_deref(), &progress),
        )
        .await;
        spinner.finish_and_clear();
        let client = client?;

        let detector = Detector::new(
            Arc::new(KubeInventory::new(client)),
            Arc::new(Exemptions::default()),
            progress.clone(),
        );

        Ok(Self {
            detector,
            request,
            format,
            progress,
        })
    }

    /// Classify the requested kinds and print the results
    async fn classify(&self) -> Result<Vec<ResourceList>> {
        info!(
            types = ?self.request.types,
            namespace = ?self.request.scope.namespace(),
            label_selector = ?self.request.label_selector,
            "Looking for unused resources"
        );

        let spinner = create_spinner("Looking for unused resources...");
        let results = drive_spinner(
            &spinner,
            &self.progress,
            self.detector.find_unused(&self.request),
        )
        .await;
        spinner.finish_and_clear();
        let results = results?;

        println!("{}", output::render(&results, &self.format, RESULTS_HEADER)?);
        Ok(results)
    }

    async fn prune(&self, results: &[ResourceList], dry_run: bool, force: bool) -> Result<()> {
        if results.is_empty() {
            return Ok(());
        }
        if dry_run {
            println!("\n{}", style("DRY RUN: No resources were pruned.").yellow());
            return Ok(());
        }

        let total = prune::total_items(results);
        if !force && !cli::confirm::confirm_deletion(total)? {
            println!("{}", style("Operation cancelled.").dim());
            return Ok(());
        }

        let spinner = create_spinner(&format!("Deleting {} resources...", total));
        let outcome = drive_spinner(&spinner, &self.progress, self.detector.delete(results)).await;
        spinner.finish_and_clear();

        match outcome {
            Ok(deleted) => {
                let (found, reported) = self.progress.totals();
                info!(found, deleted = reported, "Prune complete");
                println!(
                    "{}",
                    style(format!("Successfully pruned {} resources.", deleted)).green()
                );
                Ok(())
            }
            Err(e) => {
                warn!(deleted = e.deleted_count(), error = %e, "Prune failed");
                println!(
                    "{}",
                    style(format!("Pruned {} resources before failure.", e.deleted_count())).red()
                );
                Err(e.into())
            }
        }
    }
}

/// Await `work` while mirroring progress updates on the spinner
async fn drive_spinner<F, T>(spinner: &ProgressBar, progress: &ProgressHandle, work: F) -> T
where
    F: Future<Output = T>,
{
    let mut progress_rx = progress.subscribe();
    let mut work = Box::pin(work);

    loop {
        tokio::select! {
            biased;
            update = progress_rx.recv() => {
                if let Ok(update) = update
                    && let Some(message) = spinner_message(&update)
                {
                    spinner.set_message(message);
                }
            }
            result = &mut work => {
                break result;
            }
        }
    }
}

fn spinner_message(update: &ProgressUpdate) -> Option<String> {
    match update {
        ProgressUpdate::Connecting { cluster } => Some(format!("Connecting to {}...", cluster)),
        ProgressUpdate::Connected { cluster, elapsed_ms } => {
            Some(format!("Connected to {} ({}ms)", cluster, elapsed_ms))
        }
        ProgressUpdate::ClassifyStarted { kind } => {
            Some(format!("Checking {}...", kind.display_name()))
        }
        ProgressUpdate::NamespaceChecked { name } => {
            Some(format!("Checking namespace {}...", name))
        }
        ProgressUpdate::ClassifyComplete { kind, found, .. } => {
            Some(format!("{}: {} unused", kind.display_name(), found))
        }
        ProgressUpdate::Deleted { kind, target } => {
            Some(format!("Deleted {} {}", kind, target))
        }
    }
}
