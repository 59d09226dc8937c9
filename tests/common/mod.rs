#![allow(dead_code)]

use docx_rs::{Docx, Paragraph, Run, Table, TableCell, TableRow};
use std::io::Cursor;

pub fn pack(docx: Docx) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    docx.build().pack(&mut buf).expect("fixture packs");
    buf.into_inner()
}

pub fn text_paragraph(text: &str) -> Paragraph {
    Paragraph::new().add_run(Run::new().add_text(text))
}

/// A document with one paragraph per entry.
pub fn docx_with_paragraphs(paragraphs: &[&str]) -> Vec<u8> {
    let docx = paragraphs
        .iter()
        .fold(Docx::new(), |docx, text| docx.add_paragraph(text_paragraph(text)));
    pack(docx)
}

pub fn table(rows: &[&[&str]]) -> Table {
    Table::new(
        rows.iter()
            .map(|cells| {
                TableRow::new(
                    cells
                        .iter()
                        .map(|text| TableCell::new().add_paragraph(text_paragraph(text)))
                        .collect(),
                )
            })
            .collect(),
    )
}

pub const ACME_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<pedido>
    <cliente>Acme</cliente>
    <data>2024-01-01</data>
    <valor tipo="total">42</valor>
</pedido>"#;

pub const BOUNDARY: &str = "----document-processor-test-boundary";

/// Builds a multipart/form-data body with one file part per entry.
pub fn multipart_body(parts: &[(&str, &str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, filename, content) in parts {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n",
                BOUNDARY, name, filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={}", BOUNDARY)
}
