use anyhow::Context;
use std::path::PathBuf;
use std::time::Instant;
use thiserror::Error;
use uuid::Uuid;

use crate::core::{ProcessingError, ProcessingResult};
use crate::extractors::{extract_docx, extract_xml};
use crate::metrics::{self, Outcome};
use crate::models::{ExtractedDocxContent, ExtractedXmlRecord};
use crate::storage::LocalStorage;
use crate::templates::fill_template;

/// The three uploads, already saved in the request's working directory.
#[derive(Debug, Clone)]
pub struct UploadedDocuments {
    pub content_docx: PathBuf,
    pub data_xml: PathBuf,
    pub template_docx: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ProcessedDocument {
    pub request_id: Uuid,
    pub output_path: PathBuf,
    pub xml: ExtractedXmlRecord,
    pub docx: ExtractedDocxContent,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Processing(#[from] ProcessingError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl PipelineError {
    fn outcome(&self) -> Outcome {
        match self {
            PipelineError::Processing(e) if e.is_client_error() => Outcome::MalformedInput,
            PipelineError::Processing(_) => Outcome::FillError,
            PipelineError::Internal(_) => Outcome::Internal,
        }
    }
}

/// Extracts both inputs, fills the template and persists the result.
///
/// Runs on the blocking pool; the transforms are synchronous.
pub async fn process(
    storage: &LocalStorage,
    uploads: UploadedDocuments,
    request_id: Uuid,
) -> Result<ProcessedDocument, PipelineError> {
    let start = Instant::now();
    let storage = storage.clone();

    let result = tokio::task::spawn_blocking(move || run(&storage, &uploads, request_id))
        .await
        .context("Document processing task failed")
        .map_err(PipelineError::from)
        .and_then(|inner| inner);

    let elapsed = start.elapsed();
    match &result {
        Ok(processed) => {
            metrics::record(Outcome::Success, elapsed.as_secs_f64());
            tracing::info!(
                request_id = %request_id,
                output = %processed.output_path.display(),
                elapsed_ms = elapsed.as_millis() as u64,
                "Documents processed"
            );
        }
        Err(e) => {
            metrics::record(e.outcome(), elapsed.as_secs_f64());
            tracing::error!(request_id = %request_id, error = %e, "Document processing failed");
        }
    }

    result
}

fn run(
    storage: &LocalStorage,
    uploads: &UploadedDocuments,
    request_id: Uuid,
) -> Result<ProcessedDocument, PipelineError> {
    let xml_bytes = read_upload(&uploads.data_xml)?;
    let docx_bytes = read_upload(&uploads.content_docx)?;
    let template_bytes = read_upload(&uploads.template_docx)?;

    let (xml, docx, output) = transform(&xml_bytes, &docx_bytes, &template_bytes, request_id)?;

    let output_path = storage.persist_output(request_id, &output)?;

    Ok(ProcessedDocument {
        request_id,
        output_path,
        xml,
        docx,
    })
}

/// Extraction and fill without touching the filesystem.
pub fn transform(
    xml_bytes: &[u8],
    docx_bytes: &[u8],
    template_bytes: &[u8],
    request_id: Uuid,
) -> ProcessingResult<(ExtractedXmlRecord, ExtractedDocxContent, Vec<u8>)> {
    let xml = extract_xml(xml_bytes)?;
    let docx = extract_docx(docx_bytes)?;
    let output = fill_template(template_bytes, &xml, &docx, &request_id.to_string())?;
    Ok((xml, docx, output))
}

fn read_upload(path: &std::path::Path) -> anyhow::Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("Failed to read upload {}", path.display()))
}
