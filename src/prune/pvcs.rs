use async_trait::async_trait;

use super::references::ReferenceIndex;
use super::{ClassifyContext, Classifier, PruneError, ResourceItem, ResourceKind, ResourceList};
use crate::kubernetes::ApiFilters;

/// Claims not mounted by any pod
pub struct PvcClassifier;

#[async_trait]
impl Classifier for PvcClassifier {
    fn kind(&self) -> ResourceKind {
        ResourceKind::PersistentVolumeClaim
    }

    async fn classify(&self, ctx: &ClassifyContext<'_>) -> Result<ResourceList, PruneError> {
        let claims = ctx
            .inventory
            .persistent_volume_claims(ctx.scope, &ctx.candidate_filters())
            .await
            .map_err(|e| PruneError::inventory("persistentvolumeclaims", e))?;

        let pods = ctx
            .inventory
            .pods(ctx.scope, &ApiFilters::none())
            .await
            .map_err(|e| PruneError::inventory("pods", e))?;

        let index = ReferenceIndex::persistent_volume_claims(&pods);
        let mut result = ResourceList::new(ResourceKind::PersistentVolumeClaim);

        for claim in &claims {
            if index.is_referenced(&claim.metadata) || !ctx.passes_cutoff(&claim.metadata) {
                continue;
            }
            result.push(ResourceItem::from_meta(&claim.metadata));
        }

        Ok(result)
    }
}
