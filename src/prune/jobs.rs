use async_trait::async_trait;
use k8s_openapi::api::batch::v1::Job;

use super::{ClassifyContext, Classifier, PruneError, ResourceItem, ResourceKind, ResourceList};

/// Completed jobs not created by a CronJob
pub struct CompletedJobClassifier;

fn is_complete(job: &Job) -> bool {
    job.status
        .as_ref()
        .is_some_and(|s| s.completion_time.is_some())
}

// CronJob children follow the CronJob's history limits
fn is_cron_child(job: &Job) -> bool {
    job.metadata
        .owner_references
        .iter()
        .flatten()
        .any(|owner| owner.kind == "CronJob")
}

#[async_trait]
impl Classifier for CompletedJobClassifier {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Job
    }

    async fn classify(&self, ctx: &ClassifyContext<'_>) -> Result<ResourceList, PruneError> {
        let jobs = ctx
            .inventory
            .jobs(ctx.scope, &ctx.candidate_filters())
            .await
            .map_err(|e| PruneError::inventory("jobs", e))?;

        let mut result = ResourceList::new(ResourceKind::Job);
        for job in &jobs {
            if !is_complete(job) || is_cron_child(job) || !ctx.passes_cutoff(&job.metadata) {
                continue;
            }
            result.push(ResourceItem::from_meta(&job.metadata));
        }
        Ok(result)
    }
}
