use caserelay_core::{Attachment, UploadHandle, UploadReference, UploadTarget};
use futures::future::try_join_all;
use tracing::{debug, error};

use crate::error::RelayError;
use crate::traits::{NotionApi, UploadDestination};

/// Request a single-use upload slot for one file.
///
/// The slot must come back with an id, and with an `upload_url` when the
/// target is [`UploadTarget::UploadUrl`].
pub async fn acquire_upload_handle(
    api: &dyn NotionApi,
    target: UploadTarget,
    filename: &str,
    content_type: &str,
) -> Result<UploadHandle, RelayError> {
    let slot = api
        .create_file_upload(filename, content_type)
        .await
        .map_err(|e| {
            error!("create upload slot for {filename} failed: {e}");
            RelayError::UploadSlot(e.to_string())
        })?;

    let id = slot.id.filter(|id| !id.is_empty());
    let upload_url = slot.upload_url.filter(|url| !url.is_empty());
    match (id, upload_url, target) {
        (Some(id), Some(url), _) => Ok(UploadHandle {
            id,
            upload_url: Some(url),
        }),
        (Some(id), None, UploadTarget::SendEndpoint) => Ok(UploadHandle {
            id,
            upload_url: None,
        }),
        _ => {
            error!("bad upload slot response for {filename} (target={target})");
            Err(RelayError::UploadSlot(
                "Failed to create Notion upload slot".into(),
            ))
        }
    }
}

/// Send the attachment's bytes to the handle and wait for the service to
/// confirm the upload.
pub async fn transfer_bytes(
    api: &dyn NotionApi,
    target: UploadTarget,
    handle: &UploadHandle,
    attachment: &Attachment,
) -> Result<UploadReference, RelayError> {
    let destination = match (target, handle.upload_url.as_deref()) {
        (UploadTarget::UploadUrl, Some(url)) => UploadDestination::Url(url),
        _ => UploadDestination::SendEndpoint(&handle.id),
    };

    let sent = api
        .send_file_upload(
            destination,
            &attachment.filename,
            attachment.content_type(),
            attachment.content.clone(),
        )
        .await
        .map_err(|e| {
            error!("upload of {} failed: {e}", attachment.filename);
            RelayError::UploadTransfer(e.to_string())
        })?;

    match sent.status.as_deref() {
        None | Some("uploaded") => {}
        Some(status) => {
            error!(
                "upload of {} finished with status {status}",
                attachment.filename
            );
            return Err(RelayError::UploadTransfer(format!(
                "File upload failed: {} is {status}",
                attachment.filename
            )));
        }
    }

    debug!("uploaded {} as {}", attachment.filename, handle.id);
    Ok(UploadReference::new(attachment.filename.as_str(), handle.id.as_str()))
}

async fn upload_one(
    api: &dyn NotionApi,
    target: UploadTarget,
    attachment: &Attachment,
) -> Result<UploadReference, RelayError> {
    let handle =
        acquire_upload_handle(api, target, &attachment.filename, attachment.content_type()).await?;
    transfer_bytes(api, target, &handle, attachment).await
}

/// Upload every attachment and return their references in input order.
///
/// The first failure aborts the batch. With `parallel` set, attachments are
/// uploaded concurrently and in-flight uploads are dropped on failure;
/// otherwise they run one after another and later ones are never started.
pub async fn upload_attachments(
    api: &dyn NotionApi,
    target: UploadTarget,
    attachments: &[Attachment],
    parallel: bool,
) -> Result<Vec<UploadReference>, RelayError> {
    if parallel {
        return try_join_all(attachments.iter().map(|a| upload_one(api, target, a))).await;
    }

    let mut refs = Vec::with_capacity(attachments.len());
    for attachment in attachments {
        refs.push(upload_one(api, target, attachment).await?);
    }
    Ok(refs)
}
