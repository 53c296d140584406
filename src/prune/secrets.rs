use async_trait::async_trait;

use super::references::ReferenceIndex;
use super::{ClassifyContext, Classifier, PruneError, ResourceItem, ResourceKind, ResourceList};
use crate::kubernetes::ApiFilters;

/// Secrets not referenced by any pod or service account
pub struct SecretClassifier;

#[async_trait]
impl Classifier for SecretClassifier {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Secret
    }

    async fn classify(&self, ctx: &ClassifyContext<'_>) -> Result<ResourceList, PruneError> {
        let secrets = ctx
            .inventory
            .secrets(ctx.scope, &ctx.candidate_filters())
            .await
            .map_err(|e| PruneError::inventory("secrets", e))?;

        let pods = ctx
            .inventory
            .pods(ctx.scope, &ApiFilters::none())
            .await
            .map_err(|e| PruneError::inventory("pods", e))?;

        let service_accounts = ctx
            .inventory
            .service_accounts(ctx.scope, &ApiFilters::none())
            .await
            .map_err(|e| PruneError::inventory("serviceaccounts", e))?;

        let index = ReferenceIndex::secrets(&pods, &service_accounts);
        let mut result = ResourceList::new(ResourceKind::Secret);

        for secret in &secrets {
            let meta = &secret.metadata;
            if ctx.exemptions.secret_exempt(
                meta.namespace.as_deref().unwrap_or_default(),
                secret.type_.as_deref(),
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
