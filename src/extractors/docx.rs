//! DOCX content extraction
//!
//! Reads paragraph text, table cell grids and the joined full text from an
//! uploaded document. The run-text helpers here are shared with the
//! template filler so both sides agree on what a paragraph's text is.

use std::borrow::Cow;
use std::io::Cursor;
use zip::ZipArchive;

use crate::core::{InputKind, ProcessingError, ProcessingResult};
use crate::models::ExtractedDocxContent;

/// Parses a DOCX package, checking first that it really is one.
pub(crate) fn read_package(bytes: &[u8], kind: InputKind) -> ProcessingResult<docx_rs::Docx> {
    validate_package(bytes, kind)?;
    docx_rs::read_docx(bytes).map_err(|e| ProcessingError::malformed(kind, e))
}

/// Validates that the bytes are a ZIP containing `word/document.xml`
fn validate_package(bytes: &[u8], kind: InputKind) -> ProcessingResult<()> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ProcessingError::malformed(kind, format!("not a document package: {}", e)))?;

    if archive.by_name("word/document.xml").is_err() {
        if archive.by_name("xl/workbook.xml").is_ok() {
            return Err(ProcessingError::malformed(
                kind,
                "this appears to be an Excel file (.xlsx), expected a Word document",
            ));
        }
        return Err(ProcessingError::malformed(
            kind,
            "missing word/document.xml, the file may be corrupted",
        ));
    }

    Ok(())
}

/// Concatenated text of the paragraph's direct runs
pub(crate) fn paragraph_text(paragraph: &docx_rs::Paragraph) -> String {
    let mut text = String::new();
    for child in &paragraph.children {
        if let docx_rs::ParagraphChild::Run(run) = child {
            push_run_text(run, &mut text);
        }
    }
    text
}

pub(crate) fn push_run_text(run: &docx_rs::Run, out: &mut String) {
    for child in &run.children {
        if let Some(text) = child_text(child) {
            out.push_str(&text);
        }
    }
}

/// Text a run child contributes: `w:t` content, `\t` for a tab and `\n`
/// for a line break. Page and column breaks carry no text.
pub(crate) fn child_text(child: &docx_rs::RunChild) -> Option<Cow<'_, str>> {
    match child {
        docx_rs::RunChild::Text(text) => Some(unescape_text(&text.text)),
        docx_rs::RunChild::Tab(_) => Some(Cow::Borrowed("\t")),
        docx_rs::RunChild::Break(br) if is_line_break(br) => Some(Cow::Borrowed("\n")),
        docx_rs::RunChild::CarriageReturn(_) => Some(Cow::Borrowed("\n")),
        _ => None,
    }
}

fn is_line_break(br: &docx_rs::Break) -> bool {
    *br == docx_rs::Break::new(docx_rs::BreakType::TextWrapping)
}

// docx-rs keeps `w:t` content in escaped form when built in memory.
fn unescape_text(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }
    Cow::Owned(
        text.replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&apos;", "'")
            .replace("&amp;", "&"),
    )
}

pub(crate) fn run_has_text(run: &docx_rs::Run) -> bool {
    run.children.iter().any(|child| child_text(child).is_some())
}

/// Cell text: its paragraphs joined by newlines
fn cell_text(cell: &docx_rs::TableCell) -> String {
    let paragraphs: Vec<String> = cell
        .children
        .iter()
        .filter_map(|content| match content {
            docx_rs::TableCellContent::Paragraph(para) => Some(paragraph_text(para)),
            _ => None,
        })
        .collect();
    paragraphs.join("\n")
}

fn table_grid(table: &docx_rs::Table) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    for table_child in &table.rows {
        let docx_rs::TableChild::TableRow(row) = table_child;
        let mut cells = Vec::new();
        for row_child in &row.cells {
            let docx_rs::TableRowChild::TableCell(cell) = row_child;
            cells.push(cell_text(cell).trim().to_string());
        }
        rows.push(cells);
    }
    rows
}

/// Extracts paragraphs, tables and full text from a content document.
pub fn extract_docx(bytes: &[u8]) -> ProcessingResult<ExtractedDocxContent> {
    let docx = read_package(bytes, InputKind::Docx)?;

    let mut paragraphs = Vec::new();
    let mut tables = Vec::new();

    for child in &docx.document.children {
        match child {
            docx_rs::DocumentChild::Paragraph(para) => {
                let text = paragraph_text(para);
                if !text.trim().is_empty() {
                    paragraphs.push(text);
                }
            }
            docx_rs::DocumentChild::Table(table) => tables.push(table_grid(table)),
            _ => {}
        }
    }

    let content = ExtractedDocxContent::new(paragraphs, tables);

    tracing::debug!(
        paragraphs = content.paragraphs.len(),
        tables = content.tables.len(),
        chars = content.full_text.chars().count(),
        "DOCX content extracted"
    );

    Ok(content)
}
