use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::{ExtractedDocxContent, ExtractedXmlRecord};

const PREVIEW_CHARS: usize = 200;

#[derive(Debug, Clone, Serialize)]
pub struct ProcessResponse {
    pub success: bool,
    pub message: String,
    pub download_url: String,
    pub request_id: Uuid,
    pub processed_at: DateTime<Utc>,
    pub processed_data: ProcessedDataPreview,
}

impl ProcessResponse {
    pub fn completed(request_id: Uuid, preview: ProcessedDataPreview) -> Self {
        ProcessResponse {
            success: true,
            message: "Documento processado com sucesso".to_string(),
            download_url: format!("/api/download/{}", request_id),
            request_id,
            processed_at: Utc::now(),
            processed_data: preview,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessedDataPreview {
    pub xml_data_preview: String,
    pub docx_content_preview: String,
}

impl ProcessedDataPreview {
    pub fn from_records(xml: &ExtractedXmlRecord, docx: &ExtractedDocxContent) -> Self {
        let xml_json = serde_json::to_string(xml).unwrap_or_default();
        ProcessedDataPreview {
            xml_data_preview: preview(&xml_json),
            docx_content_preview: preview(&docx.full_text),
        }
    }
}

/// Cuts to `PREVIEW_CHARS` characters, appending "..." only when something was cut.
fn preview(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_short_text_untouched() {
        assert_eq!(preview("curto"), "curto");
        assert_eq!(preview(""), "");
    }

    #[test]
    fn test_preview_long_text_is_cut() {
        let text = "á".repeat(250);
        let cut = preview(&text);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), PREVIEW_CHARS + 3);
    }

    #[test]
    fn test_preview_exact_length_has_no_marker() {
        let text = "x".repeat(PREVIEW_CHARS);
        assert_eq!(preview(&text), text);
    }

    #[test]
    fn test_completed_response_links_download() {
        let id = Uuid::new_v4();
        let response = ProcessResponse::completed(
            id,
            ProcessedDataPreview::from_records(
                &ExtractedXmlRecord::default(),
                &ExtractedDocxContent::default(),
            ),
        );
        assert!(response.success);
        assert_eq!(response.download_url, format!("/api/download/{}", id));
    }
}
