use actix_multipart::{Field, Multipart};
use futures::StreamExt;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

use super::error::{ApiError, ApiResult};
use crate::pipeline::UploadedDocuments;

pub const CONTENT_FIELD: &str = "input_docx";
pub const XML_FIELD: &str = "input_xml";
pub const TEMPLATE_FIELD: &str = "template_docx";

struct ExpectedUpload {
    field: &'static str,
    saved_as: &'static str,
    extension: &'static str,
}

const EXPECTED: [ExpectedUpload; 3] = [
    ExpectedUpload {
        field: CONTENT_FIELD,
        saved_as: "input.docx",
        extension: ".docx",
    },
    ExpectedUpload {
        field: XML_FIELD,
        saved_as: "input.xml",
        extension: ".xml",
    },
    ExpectedUpload {
        field: TEMPLATE_FIELD,
        saved_as: "template.docx",
        extension: ".docx",
    },
];

/// Validates the file extension, case-insensitively.
pub fn has_extension(filename: &str, extension: &str) -> bool {
    if filename.is_empty() {
        return false;
    }
    filename
        .rsplit_once('.')
        .map(|(_, ext)| format!(".{}", ext.to_lowercase()) == extension)
        .unwrap_or(false)
}

/// Streams the three expected fields into `workspace`.
///
/// Unknown fields are drained and ignored. `max_bytes` bounds the sum of
/// everything received.
pub async fn save_uploads(
    mut payload: Multipart,
    workspace: &Path,
    max_bytes: usize,
) -> ApiResult<UploadedDocuments> {
    let mut saved: [Option<PathBuf>; 3] = [None, None, None];
    let mut received = 0usize;

    while let Some(field) = payload.next().await {
        let mut field = field?;
        let name = field
            .content_disposition()
            .get_name()
            .unwrap_or_default()
            .to_string();

        let Some(index) = EXPECTED.iter().position(|e| e.field == name) else {
            drain(&mut field, &mut received, max_bytes).await?;
            continue;
        };
        let expected = &EXPECTED[index];

        let filename = field
            .content_disposition()
            .get_filename()
            .unwrap_or_default()
            .to_string();
        if !has_extension(&filename, expected.extension) {
            return Err(ApiError::bad_request(format!(
                "{} deve ser um arquivo {}",
                expected.field, expected.extension
            )));
        }

        let path = workspace.join(expected.saved_as);
        let mut file = tokio::fs::File::create(&path).await?;
        while let Some(chunk) = field.next().await {
            let chunk = chunk?;
            received = checked_total(received, chunk.len(), max_bytes)?;
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        tracing::debug!(field = expected.field, filename = %filename, "Upload saved");
        saved[index] = Some(path);
    }

    let [content_docx, data_xml, template_docx] = saved;
    Ok(UploadedDocuments {
        content_docx: content_docx.ok_or_else(|| missing(CONTENT_FIELD))?,
        data_xml: data_xml.ok_or_else(|| missing(XML_FIELD))?,
        template_docx: template_docx.ok_or_else(|| missing(TEMPLATE_FIELD))?,
    })
}

async fn drain(field: &mut Field, received: &mut usize, max_bytes: usize) -> ApiResult<()> {
    while let Some(chunk) = field.next().await {
        *received = checked_total(*received, chunk?.len(), max_bytes)?;
    }
    Ok(())
}

fn checked_total(received: usize, chunk: usize, max_bytes: usize) -> ApiResult<usize> {
    let total = received.saturating_add(chunk);
    if total > max_bytes {
        return Err(ApiError::payload_too_large(format!(
            "Arquivos muito grandes (máximo {} MB)",
            max_bytes / 1_048_576
        )));
    }
    Ok(total)
}

fn missing(field: &str) -> ApiError {
    ApiError::bad_request(format!("Campo obrigatório ausente: {}", field))
}
