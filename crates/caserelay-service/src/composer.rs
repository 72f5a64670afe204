use caserelay_core::blocks::{body_blocks, MAX_BLOCKS_PER_APPEND};
use caserelay_core::PropertyMap;
use tracing::error;

use crate::error::RelayError;
use crate::traits::NotionApi;

/// Create the record in `database_id`. Returns the new page id.
pub async fn create_record(
    api: &dyn NotionApi,
    database_id: &str,
    properties: &PropertyMap,
) -> Result<String, RelayError> {
    api.create_page(database_id, properties)
        .await
        .map(|page| page.id)
        .map_err(|e| {
            error!("create page failed: {e:?}");
            RelayError::RecordCreation(e.to_string())
        })
}

/// Append `text` to an existing page as paragraph blocks.
///
/// Long bodies are split across blocks and batches; batches are sent in order
/// and the first failure stops the rest.
pub async fn append_body(api: &dyn NotionApi, page_id: &str, text: &str) -> Result<(), RelayError> {
    let blocks = body_blocks(text);
    for batch in blocks.chunks(MAX_BLOCKS_PER_APPEND) {
        api.append_blocks(page_id, batch).await.map_err(|e| {
            error!("append body to {page_id} failed: {e:?}");
            RelayError::ContentAppend(e.to_string())
        })?;
    }
    Ok(())
}
