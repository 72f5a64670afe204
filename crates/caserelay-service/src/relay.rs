use std::sync::Arc;

use caserelay_core::case::{normalize_query, CaseMatch, CaseQuery};
use caserelay_core::properties::build_properties;
use caserelay_core::{TaskSubmission, UploadTarget};
use tracing::{error, info, warn};

use crate::composer::{append_body, create_record};
use crate::error::RelayError;
use crate::traits::NotionApi;
use crate::uploader::upload_attachments;

/// Fixed settings for one relay process.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Database new records are created in.
    pub dashboard_id: String,
    /// Database searched by title.
    pub case_db_id: String,
    pub upload_target: UploadTarget,
    pub parallel_uploads: bool,
}

/// Result of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionOutcome {
    pub page_id: String,
    /// Set when the record exists but its body could not be appended.
    pub warning: Option<String>,
}

pub struct RelayService {
    api: Arc<dyn NotionApi>,
    config: RelayConfig,
}

impl RelayService {
    pub fn new(api: Arc<dyn NotionApi>, config: RelayConfig) -> Self {
        Self { api, config }
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Validate, upload attachments, create the record, then append the body.
    ///
    /// Any upload failure aborts before the record is created. A failed body
    /// append leaves the record in place and is reported as a warning.
    pub async fn submit(&self, submission: TaskSubmission) -> Result<SubmissionOutcome, RelayError> {
        info!(
            file_name = %submission.file_name,
            date = ?submission.date(),
            link = ?submission.link(),
            linked_case = ?submission.linked_case(),
            message_id = ?submission.message_id(),
            file_count = submission.attachments.len(),
            "received submission"
        );
        submission.validate()?;

        let api = self.api.as_ref();
        let uploads = upload_attachments(
            api,
            self.config.upload_target,
            &submission.attachments,
            self.config.parallel_uploads,
        )
        .await?;

        let properties = build_properties(&submission, uploads);
        let page_id = create_record(api, &self.config.dashboard_id, &properties).await?;
        info!("created page {page_id}");

        let warning = match submission.email_body() {
            Some(body) => match append_body(api, &page_id, body).await {
                Ok(()) => None,
                Err(e) => {
                    warn!("page {page_id} created but body append failed: {e}");
                    Some(format!("record created but email body was not added: {e}"))
                }
            },
            None => None,
        };

        Ok(SubmissionOutcome { page_id, warning })
    }

    /// Search the case database for titles containing `raw_query`.
    /// Queries shorter than two characters return nothing without a remote call.
    pub async fn search_cases(&self, raw_query: &str) -> Result<Vec<CaseMatch>, RelayError> {
        let Some(query) = normalize_query(raw_query) else {
            return Ok(Vec::new());
        };

        let results = self
            .api
            .query_database(&self.config.case_db_id, &CaseQuery::title_contains(query))
            .await
            .map_err(|e| {
                error!("case search failed: {e:?}");
                RelayError::Search(e.to_string())
            })?;

        Ok(results.results.iter().map(CaseMatch::from).collect())
    }
}
