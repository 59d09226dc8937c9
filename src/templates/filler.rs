//! DOCX template filling.
//!
//! Replaces `{{NAME}}` tokens in paragraphs and table cells, appends the XML
//! item section at the end and packs the resulting document.

use docx_rs::{
    AbstractNumbering, BreakType, DocumentChild, Docx, IndentLevel, Level, LevelJc, LevelText,
    NumberFormat, Numbering, NumberingId, Paragraph, ParagraphChild, Run, RunChild,
    SpecialIndentType, Start, Table, TableCellContent, TableChild, TableRowChild,
};
use std::io::Cursor;

use crate::core::{FillStage, InputKind, ProcessingError, ProcessingResult};
use crate::extractors::docx::{child_text, paragraph_text, read_package, run_has_text};
use crate::models::{ExtractedDocxContent, ExtractedXmlRecord, ItemRecord};

use super::placeholders::PlaceholderMap;

pub const ITEMS_HEADING: &str = "Itens do XML:";
pub const ITEM_PREFIX: &str = "Item: ";

/// Per-run counters, only logged.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FillSummary {
    pub paragraphs: usize,
    pub cells: usize,
    pub items: usize,
}

/// Fills the template with the extracted data and returns the new DOCX.
///
/// `request_id` only tags the log span; the caller decides where the result
/// is stored.
pub fn fill_template(
    template: &[u8],
    xml: &ExtractedXmlRecord,
    docx: &ExtractedDocxContent,
    request_id: &str,
) -> ProcessingResult<Vec<u8>> {
    let span = tracing::info_span!("fill_template", request_id = %request_id);
    let _guard = span.enter();

    let mut document = read_package(template, InputKind::Template)?;
    let placeholders = PlaceholderMap::build(xml, docx);

    let mut summary = substitute(&mut document, &placeholders);

    if !xml.items.is_empty() {
        document = append_items(document, &xml.items)?;
        summary.items = xml.items.len();
    }

    let bytes = pack(document)?;

    tracing::info!(
        paragraphs = summary.paragraphs,
        cells = summary.cells,
        items = summary.items,
        bytes = bytes.len(),
        "Template filled"
    );

    Ok(bytes)
}

/// Applies the tokens to every body paragraph and table.
pub fn substitute(document: &mut Docx, placeholders: &PlaceholderMap) -> FillSummary {
    let mut summary = FillSummary::default();

    for child in document.document.children.iter_mut() {
        match child {
            DocumentChild::Paragraph(paragraph) => {
                if fill_paragraph(paragraph, placeholders) {
                    summary.paragraphs += 1;
                }
            }
            DocumentChild::Table(table) => fill_table(table, placeholders, &mut summary),
            _ => {}
        }
    }

    summary
}

fn fill_table(table: &mut Table, placeholders: &PlaceholderMap, summary: &mut FillSummary) {
    for table_child in table.rows.iter_mut() {
        let TableChild::TableRow(row) = table_child;
        for row_child in row.cells.iter_mut() {
            let TableRowChild::TableCell(cell) = row_child;
            let mut touched = false;
            for content in cell.children.iter_mut() {
                match content {
                    TableCellContent::Paragraph(paragraph) => {
                        touched |= fill_paragraph(paragraph, placeholders);
                    }
                    TableCellContent::Table(nested) => fill_table(nested, placeholders, summary),
                    _ => {}
                }
            }
            if touched {
                summary.cells += 1;
            }
        }
    }
}

fn fill_paragraph(paragraph: &mut Paragraph, placeholders: &PlaceholderMap) -> bool {
    let text = paragraph_text(paragraph);
    match placeholders.apply(&text) {
        Some(filled) => {
            rewrite_paragraph_text(paragraph, &filled);
            true
        }
        None => false,
    }
}

/// Replaces the paragraph's text with `text`.
///
/// The new text lands where the first text-bearing run had its first text
/// child, keeping that run's formatting. Text, tabs and line breaks are
/// removed from the other runs; runs left empty by that are dropped.
/// Drawings and page breaks stay where they were.
fn rewrite_paragraph_text(paragraph: &mut Paragraph, text: &str) {
    let mut replacement = Some(text_children(text));
    let mut emptied = Vec::new();

    for (index, child) in paragraph.children.iter_mut().enumerate() {
        let ParagraphChild::Run(run) = child else {
            continue;
        };
        if !run_has_text(run) {
            continue;
        }

        let first_text = run
            .children
            .iter()
            .position(|c| child_text(c).is_some())
            .unwrap_or(0);
        run.children.retain(|c| child_text(c).is_none());

        if let Some(children) = replacement.take() {
            run.children.splice(first_text..first_text, children);
        }
        if run.children.is_empty() {
            emptied.push(index);
        }
    }

    for index in emptied.into_iter().rev() {
        paragraph.children.remove(index);
    }
}

// Newlines become line breaks and tabs become tab stops, as Word shows them.
fn text_children(text: &str) -> Vec<RunChild> {
    let mut run = Run::new();
    for (line_no, line) in text.split('\n').enumerate() {
        if line_no > 0 {
            run = run.add_break(BreakType::TextWrapping);
        }
        for (segment_no, segment) in line.split('\t').enumerate() {
            if segment_no > 0 {
                run = run.add_tab();
            }
            if !segment.is_empty() {
                run = run.add_text(segment);
            }
        }
    }
    run.children
}

/// Appends the heading and one bullet per item at the end of the body.
fn append_items(document: Docx, items: &[ItemRecord]) -> ProcessingResult<Docx> {
    let abstract_id = next_id(document.numberings.abstract_nums.iter().map(|a| a.id))?;
    let numbering_id = next_id(document.numberings.numberings.iter().map(|n| n.id))?;

    let bullet = AbstractNumbering::new(abstract_id).add_level(
        Level::new(
            0,
            Start::new(1),
            NumberFormat::new("bullet"),
            LevelText::new("•"),
            LevelJc::new("left"),
        )
        .indent(Some(720), Some(SpecialIndentType::Hanging(360)), None, None),
    );

    let mut document = document
        .add_abstract_numbering(bullet)
        .add_numbering(Numbering::new(numbering_id, abstract_id))
        .add_paragraph(Paragraph::new().add_run(Run::new().add_text(ITEMS_HEADING)));

    for item in items {
        document = document.add_paragraph(
            Paragraph::new()
                .add_run(Run::new().add_text(format!("{}{}", ITEM_PREFIX, item)))
                .numbering(NumberingId::new(numbering_id), IndentLevel::new(0)),
        );
    }

    Ok(document)
}

fn next_id(ids: impl Iterator<Item = usize>) -> ProcessingResult<usize> {
    ids.max()
        .unwrap_or(0)
        .checked_add(1)
        .ok_or_else(|| ProcessingError::fill(FillStage::Mutation, "numbering ids exhausted"))
}

fn pack(document: Docx) -> ProcessingResult<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    document
        .build()
        .pack(&mut buf)
        .map_err(|e| ProcessingError::fill(FillStage::Serialization, e))?;
    Ok(buf.into_inner())
}
