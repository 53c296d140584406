use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;

use super::{ClassifyContext, Classifier, PruneError, ResourceItem, ResourceKind, ResourceList};

/// Finished pods that no controller owns
pub struct CompletedPodClassifier;

fn is_finished(pod: &Pod) -> bool {
    matches!(
        pod.status.as_ref().and_then(|s| s.phase.as_deref()),
        Some("Succeeded" | "Failed")
    )
}

// Owned pods are cleaned up by their controller
fn is_owned(pod: &Pod) -> bool {
    pod.metadata
        .owner_references
        .as_ref()
        .is_some_and(|refs| !refs.is_empty())
}

#[async_trait]
impl Classifier for CompletedPodClassifier {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Pod
    }

    async fn classify(&self, ctx: &ClassifyContext<'_>) -> Result<ResourceList, PruneError> {
        let pods = ctx
            .inventory
            .pods(ctx.scope, &ctx.candidate_filters())
            .await
            .map_err(|e| PruneError::inventory("pods", e))?;

        let mut result = ResourceList::new(ResourceKind::Pod);
        for pod in &pods {
            if !is_finished(pod) || is_owned(pod) || !ctx.passes_cutoff(&pod.metadata) {
                continue;
            }
            result.push(ResourceItem::from_meta(&pod.metadata));
        }
        Ok(result)
    }
}
