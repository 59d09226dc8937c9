use actix_multipart::Multipart;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpResponse};
use serde_json::json;
use uuid::Uuid;

use super::error::{ApiError, ApiResult};
use super::state::ApiState;
use super::upload::save_uploads;
use crate::models::{ProcessResponse, ProcessedDataPreview};
use crate::pipeline;
use crate::storage::local::download_file_name;
use crate::storage::DOCX_CONTENT_TYPE;

pub async fn root() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "message": "API de Processamento de Documentos está funcionando!",
        "docs": "/docs",
        "health": "/health"
    }))
}

pub async fn health_check(state: web::Data<ApiState>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "OK",
        "message": "API está saudável",
        "directories": state.storage.directory_status()
    }))
}

pub async fn metrics_endpoint() -> ApiResult<HttpResponse> {
    let buffer = crate::metrics::render().map_err(|e| {
        ApiError::internal_server_error("Failed to encode metrics").with_details(e.to_string())
    })?;
    Ok(HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(buffer))
}

/// Fill the uploaded template with the uploaded XML and DOCX content
pub async fn process_documents(
    payload: Multipart,
    state: web::Data<ApiState>,
) -> ApiResult<HttpResponse> {
    let request_id = Uuid::new_v4();

    let workspace = state
        .storage
        .create_workspace(request_id)
        .map_err(|e| ApiError::from(e).with_request_id(request_id))?;

    let result = async {
        let uploads = save_uploads(
            payload,
            workspace.path(),
            state.config.max_upload_size_bytes,
        )
        .await?;
        let processed = pipeline::process(&state.storage, uploads, request_id).await?;
        Ok::<_, ApiError>(processed)
    }
    .await;

    // Inputs are removed on both paths; the output stays for download.
    if let Err(e) = workspace.close() {
        tracing::warn!(request_id = %request_id, error = %e, "Failed to remove working directory");
    }

    let processed = result.map_err(|e| e.with_request_id(request_id))?;
    let preview = ProcessedDataPreview::from_records(&processed.xml, &processed.docx);

    Ok(HttpResponse::Ok().json(ProcessResponse::completed(request_id, preview)))
}

/// Download a processed document
pub async fn download_document(
    path: web::Path<Uuid>,
    state: web::Data<ApiState>,
) -> ApiResult<HttpResponse> {
    let request_id = path.into_inner();

    match state.storage.read_output(request_id).await? {
        Some(bytes) => Ok(HttpResponse::Ok()
            .content_type(DOCX_CONTENT_TYPE)
            .insert_header(ContentDisposition {
                disposition: DispositionType::Attachment,
                parameters: vec![DispositionParam::Filename(download_file_name(request_id))],
            })
            .body(bytes)),
        None => Err(ApiError::not_found("Arquivo não encontrado").with_request_id(request_id)),
    }
}
