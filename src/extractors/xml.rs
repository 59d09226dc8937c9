//! Extracción de datos del XML de entrada.
//!
//! Recorre el árbol una sola vez en orden de documento y clasifica solo las
//! etiquetas conocidas (`cliente`, `data`, `valor`, `item`). Las etiquetas se
//! reconocen a cualquier profundidad; `item` solo por debajo de la raíz.

use encoding_rs::{Encoding, UTF_8};
use roxmltree::{Document, Node, ParsingOptions};
use std::borrow::Cow;

use crate::core::{InputKind, ProcessingError, ProcessingResult};
use crate::models::{ExtractedXmlRecord, FieldMap, ItemRecord};

const DEFAULT_VALUE_KEY: &str = "default";

/// Extrae cliente, fecha, valores e items de un documento XML.
pub fn extract_xml(bytes: &[u8]) -> ProcessingResult<ExtractedXmlRecord> {
    let text = decode(bytes)?;

    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let doc = Document::parse_with_options(&text, options)
        .map_err(|e| ProcessingError::malformed(InputKind::Xml, e))?;

    let root = doc.root_element();
    let mut client: Option<String> = None;
    let mut date: Option<String> = None;
    let mut values = FieldMap::new();
    let mut items = Vec::new();

    for node in root.descendants().filter(Node::is_element) {
        match node.tag_name().name() {
            "cliente" if client.is_none() => client = Some(element_text(&node)),
            "data" if date.is_none() => date = Some(element_text(&node)),
            "valor" => {
                let key = node.attribute("tipo").unwrap_or(DEFAULT_VALUE_KEY);
                values.insert(key, element_text(&node));
            }
            "item" if node != root => items.push(item_record(&node)),
            _ => {}
        }
    }

    let record = ExtractedXmlRecord {
        client: client.unwrap_or_default(),
        date: date.unwrap_or_default(),
        values,
        items,
    };

    tracing::debug!(
        values = record.values.len(),
        items = record.items.len(),
        "XML data extracted"
    );

    Ok(record)
}

/// Decodifica según el BOM o la declaración `encoding`; UTF-8 por defecto.
fn decode(bytes: &[u8]) -> ProcessingResult<Cow<'_, str>> {
    let (encoding, body) = match Encoding::for_bom(bytes) {
        Some((encoding, bom_len)) => (encoding, &bytes[bom_len..]),
        None => (declared_encoding(bytes).unwrap_or(UTF_8), bytes),
    };

    let (text, had_errors) = encoding.decode_without_bom_handling(body);
    if had_errors {
        return Err(ProcessingError::malformed(
            InputKind::Xml,
            format!("invalid {} byte sequence", encoding.name()),
        ));
    }
    Ok(text)
}

// Una declaración legible en ASCII no puede venir en UTF-16.
fn declared_encoding(bytes: &[u8]) -> Option<&'static Encoding> {
    let decl = bytes.strip_prefix(b"<?xml")?;
    let end = decl.windows(2).position(|w| w == b"?>")?;
    let decl = std::str::from_utf8(&decl[..end]).ok()?;

    let rest = &decl[decl.find("encoding")? + "encoding".len()..];
    let rest = rest.trim_start().strip_prefix('=')?.trim_start();
    let quote = rest.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let value = &rest[1..];
    let label = &value[..value.find(quote)?];

    Encoding::for_label(label.as_bytes()).map(Encoding::output_encoding)
}

fn item_record(node: &Node) -> ItemRecord {
    let fields = node
        .children()
        .filter(Node::is_element)
        .map(|child| (child.tag_name().name().to_string(), element_text(&child)))
        .collect();
    ItemRecord::new(fields)
}

// Texto anterior al primer hijo elemento; se omiten comentarios e
// instrucciones de procesamiento.
fn element_text(node: &Node) -> String {
    node.children()
        .take_while(|child| !child.is_element())
        .filter(Node::is_text)
        .filter_map(|child| child.text())
        .collect()
}
