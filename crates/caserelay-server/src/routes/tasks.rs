use axum::{
    extract::{FromRequest, Multipart, Request, State},
    http::{header::CONTENT_TYPE, StatusCode},
    routing::post,
    Form, Json, Router,
};
use caserelay_core::{Attachment, TaskSubmission};
use caserelay_service::RelayError;
use serde_json::{json, Value};
use tracing::{debug, error};

use super::AppState;

/// Multipart part name carrying attachments.
const FILES_FIELD: &str = "files";

type ApiError = (StatusCode, Json<Value>);

pub fn routes() -> Router<AppState> {
    Router::new().route("/add-task", post(add_task))
}

async fn add_task(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<Value>, ApiError> {
    let submission = decode_submission(request).await?;
    let outcome = state.relay.submit(submission).await.map_err(to_error)?;

    let mut body = json!({ "success": true, "pageId": outcome.page_id });
    if let Some(warning) = outcome.warning {
        body["warning"] = json!(warning);
    }
    Ok(Json(body))
}

/// Decode a submission from a multipart, urlencoded or JSON body, chosen by
/// the request's content type. Anything that is not a form is read as JSON.
async fn decode_submission(request: Request) -> Result<TaskSubmission, ApiError> {
    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(request, &())
            .await
            .map_err(|e| rejected(e.status(), e.body_text()))?;
        read_multipart(multipart).await
    } else if content_type.starts_with("application/x-www-form-urlencoded") {
        let Form(submission) = Form::<TaskSubmission>::from_request(request, &())
            .await
            .map_err(|e| rejected(e.status(), e.body_text()))?;
        Ok(submission)
    } else {
        let Json(submission) = Json::<TaskSubmission>::from_request(request, &())
            .await
            .map_err(|e| rejected(e.status(), e.body_text()))?;
        Ok(submission)
    }
}

async fn read_multipart(mut multipart: Multipart) -> Result<TaskSubmission, ApiError> {
    let mut submission = TaskSubmission::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| rejected(e.status(), e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == FILES_FIELD {
            let filename = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().map(str::to_string);
            let content = field
                .bytes()
                .await
                .map_err(|e| rejected(e.status(), e.body_text()))?;
            submission
                .attachments
                .push(Attachment::new(filename, content_type, content));
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| rejected(e.status(), e.body_text()))?;
            if !submission.set_field(&name, value) {
                debug!("ignoring unknown multipart field {name:?}");
            }
        }
    }
    Ok(submission)
}

/// Keep the extractor's own status (400, 413, 415...) in the usual error shape.
fn rejected(status: StatusCode, message: String) -> ApiError {
    (
        status,
        Json(json!({ "success": false, "message": message })),
    )
}

fn to_error(e: RelayError) -> ApiError {
    let status = if e.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        error!("submission failed: {e:?}");
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(json!({ "success": false, "message": e.to_string() })))
}
