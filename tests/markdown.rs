//! Markdown → PDF and Markdown → DOCX through the public entry points.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use docshift::pipeline::docx::{map_markdown, Block, Run};
use docshift::{
    convert_markdown_to_docx, convert_markdown_to_pdf, markdown_to_pdf_bytes, ConverterConfig,
    DocumentInfo, ErrorKind, Locale,
};
use std::io::{Cursor, Read};
use std::time::{Duration, Instant};

fn decode(data: Option<String>) -> Vec<u8> {
    STANDARD.decode(data.expect("conversion should succeed")).unwrap()
}

fn document_xml(docx: &[u8]) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(docx)).unwrap();
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .unwrap()
        .read_to_string(&mut xml)
        .unwrap();
    xml
}

// ── Markdown → PDF ───────────────────────────────────────────────────────────

#[test]
fn short_document_fits_one_page() {
    let resp = convert_markdown_to_pdf(
        "# Meeting notes\n\nWe agreed on **three** things:\n\n1. ship\n2. test\n3. rest",
        &ConverterConfig::default(),
    );
    assert!(resp.error.is_none());
    let pdf = decode(resp.data);

    let doc = lopdf::Document::load_mem(&pdf).unwrap();
    assert_eq!(doc.get_pages().len(), 1);
}

#[test]
fn long_document_spans_pages() {
    let markdown = (1..=200)
        .map(|i| format!("Paragraph number {i} with a little text."))
        .collect::<Vec<_>>()
        .join("\n\n");
    let pdf = markdown_to_pdf_bytes(&markdown, &ConverterConfig::default()).unwrap();

    let doc = lopdf::Document::load_mem(&pdf).unwrap();
    // 200 paragraphs separated by blank lines = 399 text lines at 44 per page.
    assert_eq!(doc.get_pages().len(), 10);
}

#[test]
fn large_markdown_converts_in_linear_time() {
    // 900 KB, well under the 5 MiB ceiling: about 13,600 pages.
    let markdown = "a\n\n".repeat(300_000);
    let started = Instant::now();
    let pdf = markdown_to_pdf_bytes(&markdown, &ConverterConfig::default()).unwrap();
    let elapsed = started.elapsed();

    assert!(
        elapsed < Duration::from_secs(120),
        "conversion took {elapsed:?}"
    );
    let doc = lopdf::Document::load_mem(&pdf).unwrap();
    assert!(doc.get_pages().len() > 13_000);
}

#[test]
fn pdf_info_uses_configured_metadata() {
    let config = ConverterConfig::builder()
        .document_info(DocumentInfo {
            title: "Quarterly".into(),
            creator: "Reports".into(),
            producer: "docshift-tests".into(),
        })
        .build()
        .unwrap();
    let pdf = markdown_to_pdf_bytes("hello", &config).unwrap();

    let doc = lopdf::Document::load_mem(&pdf).unwrap();
    let id = doc.trailer.get(b"Info").unwrap().as_reference().unwrap();
    let info = doc.get_dictionary(id).unwrap();
    assert_eq!(info.get(b"Title").unwrap().as_str().unwrap(), b"Quarterly");
    assert_eq!(info.get(b"Producer").unwrap().as_str().unwrap(), b"docshift-tests");
}

#[test]
fn non_latin_text_still_converts() {
    let resp = convert_markdown_to_pdf("# Привет\n\nこんにちは — café", &ConverterConfig::default());
    assert!(resp.is_success());
}

#[test]
fn empty_markdown_yields_a_blank_page() {
    let pdf = markdown_to_pdf_bytes("", &ConverterConfig::default()).unwrap();
    let doc = lopdf::Document::load_mem(&pdf).unwrap();
    assert_eq!(doc.get_pages().len(), 1);
}

#[test]
fn oversized_markdown_reports_too_large() {
    let markdown = "x".repeat(5 * 1024 * 1024 + 1);
    for locale in [Locale::En, Locale::Es] {
        let config = ConverterConfig::builder().locale(locale).build().unwrap();
        let pdf = convert_markdown_to_pdf(&markdown, &config);
        let docx = convert_markdown_to_docx(&markdown, &config);
        for resp in [pdf, docx] {
            assert!(resp.data.is_none());
            assert_eq!(resp.error_kind, Some(ErrorKind::InputTooLarge));
            assert_eq!(
                resp.error.as_deref(),
                Some(ErrorKind::InputTooLarge.message(locale))
            );
        }
    }
}

#[test]
fn multibyte_markdown_ceiling_counts_bytes() {
    // 3 bytes per char: 2 MiB chars is 6 MiB of UTF-8.
    let markdown = "€".repeat(2 * 1024 * 1024);
    let resp = convert_markdown_to_docx(&markdown, &ConverterConfig::default());
    assert_eq!(resp.error_kind, Some(ErrorKind::InputTooLarge));
}

// ── Markdown → DOCX ──────────────────────────────────────────────────────────

#[test]
fn heading_blank_line_and_emphasis_map_to_blocks() {
    let blocks = map_markdown("# Title\n\nSome *italic* and **bold** text");
    assert_eq!(
        blocks,
        vec![
            Block::Heading {
                level: 1,
                text: "Title".into()
            },
            Block::Empty,
            Block::Paragraph(vec![
                Run::plain("Some "),
                Run::italic("italic"),
                Run::plain(" and "),
                Run::bold("bold"),
                Run::plain(" text"),
            ]),
        ]
    );
}

#[test]
fn block_order_follows_line_order() {
    let markdown = "## Steps\n1. open\n2. close\n\n- note\n* aside\n### End\nbye";
    let blocks = map_markdown(markdown);
    assert_eq!(blocks.len(), markdown.lines().count());
    assert!(matches!(&blocks[0], Block::Heading { level: 2, text } if text == "Steps"));
    assert_eq!(blocks[1], Block::Numbered("open".into()));
    assert_eq!(blocks[4], Block::Bullet("note".into()));
    assert_eq!(blocks[5], Block::Bullet("aside".into()));
    assert!(matches!(&blocks[6], Block::Heading { level: 3, .. }));
}

#[test]
fn docx_package_contains_the_document() {
    let resp = convert_markdown_to_docx(
        "# Title\n\nSome *italic* and **bold** text\n\n- a & b",
        &ConverterConfig::default(),
    );
    let docx = decode(resp.data);
    assert!(docx.starts_with(b"PK"));

    let xml = document_xml(&docx);
    assert!(xml.contains("<w:pStyle w:val=\"Heading1\"/>"));
    assert!(xml.contains("<w:rPr><w:i/></w:rPr><w:t xml:space=\"preserve\">italic</w:t>"));
    assert!(xml.contains("<w:rPr><w:b/></w:rPr><w:t xml:space=\"preserve\">bold</w:t>"));
    assert!(xml.contains("a &amp; b"));
}

#[test]
fn docx_has_the_required_parts() {
    let docx = decode(convert_markdown_to_docx("hi", &ConverterConfig::default()).data);
    let archive = zip::ZipArchive::new(Cursor::new(docx)).unwrap();
    let names: Vec<&str> = archive.file_names().collect();
    for part in [
        "[Content_Types].xml",
        "_rels/.rels",
        "word/document.xml",
        "word/_rels/document.xml.rels",
        "word/styles.xml",
        "word/numbering.xml",
        "docProps/core.xml",
    ] {
        assert!(names.contains(&part), "missing {part}");
    }
}
