use super::{PruneError, ResourceList};
use crate::kubernetes::Inventory;
use crate::progress::ProgressHandle;

/// Delete items in list order, one request each, stopping at the first failure.
///
/// Deletions that already succeeded are not rolled back; the failure carries
/// how many went through.
pub async fn delete_all(
    inventory: &dyn Inventory,
    results: &[ResourceList],
    progress: &ProgressHandle,
) -> Result<usize, PruneError> {
    let mut deleted = 0;

    for list in results {
        let kind = list.resource_type();
        for item in list.items() {
            inventory
                .delete(kind, &item.namespace, &item.name)
                .await
                .map_err(|e| PruneError::Deletion {
                    kind,
                    target: item.display_target(),
                    deleted,
                    source: e.into(),
                })?;
            deleted += 1;
            progress.deleted(kind, &item.display_target());
        }
    }

    Ok(deleted)
}
