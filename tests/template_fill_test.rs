mod common;

use common::*;
use docx_rs::{BreakType, Docx, ParagraphChild, Run, RunChild};
use document_processor::{
    extract_docx, extract_xml, fill_template, ExtractedDocxContent, ExtractedXmlRecord, FillStage,
    InputKind, ProcessingError,
};

fn fill(template: &[u8], xml: &str, content: &[u8]) -> Vec<u8> {
    let record = extract_xml(xml.as_bytes()).unwrap();
    let content = extract_docx(content).unwrap();
    fill_template(template, &record, &content, "test-request").unwrap()
}

#[test]
fn test_client_and_value_placeholders() {
    let template = docx_with_paragraphs(&["Cliente: {{CLIENTE}}, Total: {{TOTAL}}", "Data: {{DATA}}"]);
    let content = docx_with_paragraphs(&["Conteúdo"]);

    let output = fill(&template, ACME_XML, &content);
    let filled = extract_docx(&output).unwrap();

    assert_eq!(
        filled.paragraphs,
        vec!["Cliente: Acme, Total: 42", "Data: 2024-01-01"]
    );
}

#[test]
fn test_content_placeholder_is_truncated_to_500_chars() {
    let long_text = "x".repeat(10_000);
    let template = docx_with_paragraphs(&["{{CONTEUDO}}"]);
    let content = docx_with_paragraphs(&[long_text.as_str()]);

    let output = fill(&template, "<r/>", &content);
    let filled = extract_docx(&output).unwrap();

    assert_eq!(filled.paragraphs, vec!["x".repeat(500)]);
}

#[test]
fn test_table_cells_are_filled() {
    let template = pack(Docx::new().add_table(table(&[
        &["Cliente", "{{CLIENTE}}"],
        &["Total", "R$ {{TOTAL}}"],
        &["Vazio", ""],
    ])));
    let content = docx_with_paragraphs(&["texto"]);

    let output = fill(&template, ACME_XML, &content);
    let filled = extract_docx(&output).unwrap();

    assert_eq!(
        filled.tables,
        vec![vec![
            vec!["Cliente".to_string(), "Acme".to_string()],
            vec!["Total".to_string(), "R$ 42".to_string()],
            vec!["Vazio".to_string(), String::new()],
        ]]
    );
}

#[test]
fn test_template_without_placeholders_or_items_is_unchanged() {
    let template = pack(
        Docx::new()
            .add_paragraph(text_paragraph("Primeiro parágrafo"))
            .add_table(table(&[&["a", "b"], &["c", "d"]]))
            .add_paragraph(text_paragraph("Último")),
    );
    let before = extract_docx(&template).unwrap();

    let output = fill(&template, ACME_XML, &docx_with_paragraphs(&["x"]));
    let after = extract_docx(&output).unwrap();

    assert_eq!(after, before);
}

#[test]
fn test_items_are_appended_as_bullets() {
    let xml = "<r><item><nome>A</nome></item><item><nome>B</nome></item></r>";
    let template = docx_with_paragraphs(&["Relatório"]);

    let output = fill(&template, xml, &docx_with_paragraphs(&["x"]));
    let filled = extract_docx(&output).unwrap();

    assert_eq!(
        filled.paragraphs,
        vec![
            "Relatório",
            "Itens do XML:",
            "Item: {'nome': 'A'}",
            "Item: {'nome': 'B'}"
        ]
    );

    let docx = docx_rs::read_docx(&output).unwrap();
    let bullet_ids: Vec<usize> = docx
        .document
        .children
        .iter()
        .filter_map(|child| match child {
            docx_rs::DocumentChild::Paragraph(p) => p
                .property
                .numbering_property
                .as_ref()
                .and_then(|n| n.id.as_ref())
                .map(|id| id.id),
            _ => None,
        })
        .collect();

    assert_eq!(bullet_ids.len(), 2);
    assert_eq!(bullet_ids[0], bullet_ids[1]);
    assert!(docx
        .numberings
        .numberings
        .iter()
        .any(|n| n.id == bullet_ids[0]));
}

#[test]
fn test_item_fields_render_in_extraction_order() {
    let xml = "<r><item><qtd>2</qtd><nome>Caneta</nome><qtd>3</qtd></item></r>";
    let template = docx_with_paragraphs(&["Itens"]);

    let output = fill(&template, xml, &docx_with_paragraphs(&["x"]));
    let filled = extract_docx(&output).unwrap();

    assert_eq!(
        filled.paragraphs.last().map(String::as_str),
        Some("Item: {'qtd': '3', 'nome': 'Caneta'}")
    );
}

#[test]
fn test_no_items_appends_nothing() {
    let template = docx_with_paragraphs(&["Só isto"]);
    let output = fill(&template, ACME_XML, &docx_with_paragraphs(&["x"]));
    let filled = extract_docx(&output).unwrap();
    assert_eq!(filled.paragraphs, vec!["Só isto"]);
}

#[test]
fn test_refilling_output_changes_nothing() {
    let template = docx_with_paragraphs(&["Cliente: {{CLIENTE}}"]);
    let content = docx_with_paragraphs(&["x"]);
    let record = extract_xml(ACME_XML.as_bytes()).unwrap();
    let content = extract_docx(&content).unwrap();

    let first = fill_template(&template, &record, &content, "primeiro").unwrap();
    let second = fill_template(&first, &record, &content, "segundo").unwrap();

    assert_eq!(
        extract_docx(&first).unwrap(),
        extract_docx(&second).unwrap()
    );
}

#[test]
fn test_xml_value_overrides_fixed_placeholder() {
    let xml = r#"<r><cliente>Acme</cliente><valor tipo="cliente">Outro</valor></r>"#;
    let template = docx_with_paragraphs(&["{{CLIENTE}}"]);

    let output = fill(&template, xml, &docx_with_paragraphs(&["x"]));
    let filled = extract_docx(&output).unwrap();

    assert_eq!(filled.paragraphs, vec!["Outro"]);
}

#[test]
fn test_split_placeholder_keeps_first_run_formatting() {
    let template = pack(
        Docx::new().add_paragraph(
            docx_rs::Paragraph::new()
                .add_run(Run::new().add_text("Total: {{TO").bold())
                .add_run(Run::new().add_text("TAL}}")),
        ),
    );

    let output = fill(&template, ACME_XML, &docx_with_paragraphs(&["x"]));
    let docx = docx_rs::read_docx(&output).unwrap();

    let paragraph = match &docx.document.children[0] {
        docx_rs::DocumentChild::Paragraph(p) => p,
        _ => panic!("expected a paragraph"),
    };
    let runs: Vec<_> = paragraph
        .children
        .iter()
        .filter_map(|c| match c {
            ParagraphChild::Run(run) => Some(run),
            _ => None,
        })
        .collect();

    assert_eq!(runs.len(), 1);
    assert!(runs[0].run_property.bold.is_some());
    assert_eq!(
        extract_docx(&output).unwrap().paragraphs,
        vec!["Total: 42"]
    );
}

#[test]
fn test_tab_layout_survives_fill() {
    let template = pack(
        Docx::new().add_paragraph(
            docx_rs::Paragraph::new().add_run(
                Run::new()
                    .add_text("Cliente:")
                    .add_tab()
                    .add_text("{{CLIENTE}}"),
            ),
        ),
    );
    let content = pack(
        Docx::new().add_paragraph(
            docx_rs::Paragraph::new().add_run(
                Run::new()
                    .add_text("Nome:")
                    .add_tab()
                    .add_text("Acme")
                    .add_break(BreakType::TextWrapping)
                    .add_text("SP"),
            ),
        ),
    );

    let extracted = extract_docx(&content).unwrap();
    assert_eq!(extracted.full_text, "Nome:\tAcme\nSP");

    let output = fill(&template, ACME_XML, &content);
    let docx = docx_rs::read_docx(&output).unwrap();
    let docx_rs::DocumentChild::Paragraph(paragraph) = &docx.document.children[0] else {
        panic!("expected a paragraph");
    };
    let ParagraphChild::Run(run) = &paragraph.children[0] else {
        panic!("expected a run");
    };
    let sequence: Vec<String> = run
        .children
        .iter()
        .filter_map(|c| match c {
            RunChild::Text(t) => Some(t.text.clone()),
            RunChild::Tab(_) => Some("<TAB>".to_string()),
            _ => None,
        })
        .collect();

    assert_eq!(sequence, vec!["Cliente:", "<TAB>", "Acme"]);
    assert_eq!(
        extract_docx(&output).unwrap().paragraphs,
        vec!["Cliente:\tAcme"]
    );
}

#[test]
fn test_content_placeholder_keeps_tabs_and_breaks() {
    let template = docx_with_paragraphs(&["{{CONTEUDO}}"]);
    let content = pack(
        Docx::new().add_paragraph(
            docx_rs::Paragraph::new().add_run(
                Run::new()
                    .add_text("a")
                    .add_tab()
                    .add_text("b")
                    .add_break(BreakType::TextWrapping)
                    .add_text("c"),
            ),
        ),
    );

    let output = fill(&template, "<r/>", &content);
    assert_eq!(extract_docx(&output).unwrap().paragraphs, vec!["a\tb\nc"]);
}

#[test]
fn test_invalid_template_is_malformed_input() {
    let err = fill_template(
        b"not a zip",
        &ExtractedXmlRecord::default(),
        &ExtractedDocxContent::default(),
        "req",
    )
    .unwrap_err();

    assert!(matches!(
        err,
        ProcessingError::MalformedInput {
            kind: InputKind::Template,
            ..
        }
    ));
}

#[test]
fn test_fill_stage_display() {
    assert_eq!(FillStage::Mutation.to_string(), "mutation");
    assert_eq!(FillStage::Serialization.to_string(), "serialization");
}
