//! PDF serialisation of laid-out text via `lopdf`.
//!
//! The document is deliberately minimal: one content stream per page, two
//! non-embedded base fonts (`/F1` Helvetica, `/F2` Helvetica-Bold) with
//! WinAnsi encoding, and an Info dictionary. Streams are Flate-compressed
//! before saving.

use crate::config::{DocumentInfo, PageLayout};
use crate::error::DocShiftError;
use crate::pipeline::fonts::{encode_winansi, FontWeight};
use crate::pipeline::layout::{DrawCommand, LayoutOutput};
use chrono::{DateTime, Utc};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};
use tracing::debug;

const REGULAR_FONT: &str = "F1";
const BOLD_FONT: &str = "F2";

/// Serialise `layout` into PDF bytes.
pub fn write_pdf(
    layout: &LayoutOutput,
    page: &PageLayout,
    info: &DocumentInfo,
) -> Result<Vec<u8>, DocShiftError> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(base_font(FontWeight::Regular));
    let bold_id = doc.add_object(base_font(FontWeight::Bold));
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            REGULAR_FONT => regular_id,
            BOLD_FONT => bold_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(layout.page_count);
    for (page_index, commands) in commands_by_page(layout).into_iter().enumerate() {
        let content = page_content(&commands);
        let encoded = content.encode().map_err(|e| DocShiftError::PdfWriteFailed {
            detail: format!("page {} content: {e}", page_index + 1),
        })?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                page.width.into(),
                page.height.into(),
            ],
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => layout.page_count as i64,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let info_id = add_info(&mut doc, info, Utc::now());
    doc.trailer.set("Info", info_id);

    doc.compress();
    let bytes = save(&mut doc)?;
    debug!(
        "Wrote PDF: {} pages, {} bytes",
        layout.page_count,
        bytes.len()
    );
    Ok(bytes)
}

/// Save a document to an in-memory buffer.
pub(crate) fn save(doc: &mut Document) -> Result<Vec<u8>, DocShiftError> {
    let mut buf = Vec::new();
    doc.save_to(&mut buf)
        .map_err(|e| DocShiftError::PdfWriteFailed {
            detail: e.to_string(),
        })?;
    Ok(buf)
}

/// Format a timestamp as a PDF date string (`D:YYYYMMDDHHmmSSZ`).
pub(crate) fn pdf_date(at: DateTime<Utc>) -> Object {
    Object::string_literal(at.format("D:%Y%m%d%H%M%SZ").to_string())
}

fn base_font(weight: FontWeight) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => weight.base_font(),
        "Encoding" => "WinAnsiEncoding",
    }
}

fn add_info(doc: &mut Document, info: &DocumentInfo, at: DateTime<Utc>) -> ObjectId {
    doc.add_object(dictionary! {
        "Title" => Object::string_literal(info.title.as_str()),
        "Creator" => Object::string_literal(info.creator.as_str()),
        "Producer" => Object::string_literal(info.producer.as_str()),
        "CreationDate" => pdf_date(at),
        "ModDate" => pdf_date(at),
    })
}

/// Bucket commands by page in one pass. Pages without text stay empty.
fn commands_by_page(layout: &LayoutOutput) -> Vec<Vec<&DrawCommand>> {
    let mut pages = vec![Vec::new(); layout.page_count];
    for cmd in &layout.commands {
        if let Some(page) = pages.get_mut(cmd.page) {
            page.push(cmd);
        }
    }
    pages
}

fn page_content(commands: &[&DrawCommand]) -> Content {
    let mut operations = Vec::with_capacity(commands.len() * 5);
    for cmd in commands {
        let font = match cmd.weight {
            FontWeight::Regular => REGULAR_FONT,
            FontWeight::Bold => BOLD_FONT,
        };
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new("Tf", vec![font.into(), cmd.size.into()]));
        operations.push(Operation::new("Td", vec![cmd.x.into(), cmd.y.into()]));
        operations.push(Operation::new(
            "Tj",
            vec![Object::String(
                encode_winansi(&cmd.text),
                StringFormat::Literal,
            )],
        ));
        operations.push(Operation::new("ET", vec![]));
    }
    Content { operations }
}
