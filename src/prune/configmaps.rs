use async_trait::async_trait;

use super::references::ReferenceIndex;
use super::{ClassifyContext, Classifier, PruneError, ResourceItem, ResourceKind, ResourceList};
use crate::kubernetes::ApiFilters;

/// Config maps not mounted or sourced by any pod
pub struct ConfigMapClassifier;

#[async_trait]
impl Classifier for ConfigMapClassifier {
    fn kind(&self) -> ResourceKind {
        ResourceKind::ConfigMap
    }

    async fn classify(&self, ctx: &ClassifyContext<'_>) -> Result<ResourceList, PruneError> {
        let config_maps = ctx
            .inventory
            .config_maps(ctx.scope, &ctx.candidate_filters())
            .await
            .map_err(|e| PruneError::inventory("configmaps", e))?;

        let pods = ctx
            .inventory
            .pods(ctx.scope, &ApiFilters::none())
            .await
            .map_err(|e| PruneError::inventory("pods", e))?;

        let index = ReferenceIndex::config_maps(&pods);
        let mut result = ResourceList::new(ResourceKind::ConfigMap);

        for cm in &config_maps {
            let meta = &cm.metadata;
            if ctx.exemptions.config_map_exempt(
                meta.namespace.as_deref().unwrap_or_default(),
                meta.name.as_deref().unwrap_or_default(),
            ) {
                continue;
            }
            if index.is_referenced(meta) || !ctx.passes_cutoff(meta) {
                continue;
            }
            result.push(ResourceItem::from_meta(meta));
        }

        Ok(result)
    }
}
