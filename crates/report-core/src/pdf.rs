//! PDF serialization of a paginated layout
//!
//! Text uses the standard Helvetica faces, so nothing is embedded but the
//! images. Output depends only on the layout, theme and info fields.

use crate::blocks::RasterImage;
use crate::error::ReportError;
use crate::layout::{Element, Layout, Rect};
use crate::style::{FontWeight, Theme};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use std::io::Write;

/// PDF points per millimetre
pub const MM_TO_PT: f64 = 72.0 / 25.4;

const FONT_REGULAR: &str = "F1";
const FONT_BOLD: &str = "F2";

/// Stroke width of placeholder frames, in points
const FRAME_LINE_WIDTH: f32 = 0.5;

/// Document-level Info dictionary fields
#[derive(Debug, Clone, Default)]
pub struct DocumentInfo {
    pub title: String,
    pub generated_at: String,
    pub subject_id: Option<String>,
}

fn real(value: f64) -> Object {
    Object::Real(value as f32)
}

fn name(value: &str) -> Object {
    Object::Name(value.as_bytes().to_vec())
}

fn literal(text: &str) -> Object {
    Object::String(encode_win_ansi(text), StringFormat::Literal)
}

/// Encode for WinAnsiEncoding; unmappable characters become `?`
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            ' '..='~' | '\u{A0}'..='\u{FF}' => c as u8,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            _ => b'?',
        })
        .collect()
}

fn font_dictionary(base_font: &str) -> Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => name(base_font),
        "Encoding" => "WinAnsiEncoding",
    }
}

fn image_stream(image: &RasterImage, level: u32) -> Result<Stream, ReportError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::new(level.min(9)));
    encoder
        .write_all(&image.rgb)
        .map_err(|e| ReportError::Pdf(e.to_string()))?;
    let data = encoder
        .finish()
        .map_err(|e| ReportError::Pdf(e.to_string()))?;

    Ok(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => image.width as i64,
            "Height" => image.height as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "FlateDecode",
        },
        data,
    ))
}

/// Content stream operations for one page
fn page_operations(
    elements: &[Element<'_>],
    page_height: f64,
    theme: &Theme,
    image_name: impl Fn(&RasterImage) -> String,
) -> Vec<Operation> {
    // Layout measures from the top; PDF from the bottom
    let flip = |y: f64| (page_height - y) * MM_TO_PT;
    let box_origin = |rect: &Rect| {
        (
            rect.x * MM_TO_PT,
            flip(rect.y + rect.height),
            rect.width * MM_TO_PT,
            rect.height * MM_TO_PT,
        )
    };

    let mut ops = Vec::new();
    for element in elements {
        match element {
            Element::Text {
                text,
                x,
                baseline,
                style,
                ..
            } => {
                let font = match style.weight {
                    FontWeight::Regular => FONT_REGULAR,
                    FontWeight::Bold => FONT_BOLD,
                };
                let (r, g, b) = theme.rgb_f32(style.role);
                ops.push(Operation::new("BT", vec![]));
                ops.push(Operation::new("Tf", vec![name(font), real(style.size)]));
                ops.push(Operation::new(
                    "rg",
                    vec![Object::Real(r), Object::Real(g), Object::Real(b)],
                ));
                ops.push(Operation::new(
                    "Td",
                    vec![real(x * MM_TO_PT), real(flip(*baseline))],
                ));
                ops.push(Operation::new("Tj", vec![literal(text)]));
                ops.push(Operation::new("ET", vec![]));
            }
            Element::Image { image, rect, .. } => {
                let (x, y, w, h) = box_origin(rect);
                ops.push(Operation::new("q", vec![]));
                ops.push(Operation::new(
                    "cm",
                    vec![real(w), real(0.0), real(0.0), real(h), real(x), real(y)],
                ));
                ops.push(Operation::new("Do", vec![name(&image_name(image))]));
                ops.push(Operation::new("Q", vec![]));
            }
            Element::Frame { rect, role, .. } => {
                let (x, y, w, h) = box_origin(rect);
                let (r, g, b) = theme.rgb_f32(*role);
                ops.push(Operation::new("q", vec![]));
                ops.push(Operation::new(
                    "RG",
                    vec![Object::Real(r), Object::Real(g), Object::Real(b)],
                ));
                ops.push(Operation::new("w", vec![Object::Real(FRAME_LINE_WIDTH)]));
                ops.push(Operation::new(
                    "re",
                    vec![real(x), real(y), real(w), real(h)],
                ));
                ops.push(Operation::new("S", vec![]));
                ops.push(Operation::new("Q", vec![]));
            }
        }
    }
    ops
}

/// Serialize `layout` to PDF bytes
pub fn render(
    layout: &Layout<'_>,
    theme: &Theme,
    info: &DocumentInfo,
    image_compression: u32,
) -> Result<Vec<u8>, ReportError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(font_dictionary("Helvetica"));
    let bold_id = doc.add_object(font_dictionary("Helvetica-Bold"));

    // One XObject per distinct image, named in order of first appearance
    let mut images: Vec<(&RasterImage, String, ObjectId)> = Vec::new();
    for (image, _) in layout.images() {
        if images.iter().any(|(seen, _, _)| std::ptr::eq(*seen, image)) {
            continue;
        }
        let id = doc.add_object(image_stream(image, image_compression)?);
        images.push((image, format!("Im{}", images.len() + 1), id));
    }

    let mut xobjects = Dictionary::new();
    for (_, image_name, id) in &images {
        xobjects.set(image_name.as_str(), Object::Reference(*id));
    }
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            FONT_REGULAR => Object::Reference(regular_id),
            FONT_BOLD => Object::Reference(bold_id),
        },
        "XObject" => xobjects,
    });

    let lookup = |image: &RasterImage| -> String {
        images
            .iter()
            .find(|(seen, _, _)| std::ptr::eq(*seen, image))
            .map(|(_, image_name, _)| image_name.clone())
            .unwrap_or_default()
    };

    let geometry = layout.geometry;
    let media_box = vec![
        real(0.0),
        real(0.0),
        real(geometry.width * MM_TO_PT),
        real(geometry.height * MM_TO_PT),
    ];

    let mut kids = Vec::with_capacity(layout.pages.len());
    for page in &layout.pages {
        let content = Content {
            operations: page_operations(&page.elements, geometry.height, theme, &lookup),
        };
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "MediaBox" => media_box.clone(),
            "Contents" => Object::Reference(content_id),
            "Resources" => Object::Reference(resources_id),
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut info_dict = dictionary! {
        "Title" => literal(&info.title),
        "Creator" => literal("report-core"),
        "Subject" => literal(&format!("Generated: {}", info.generated_at)),
    };
    if let Some(subject_id) = &info.subject_id {
        info_dict.set("Keywords", literal(subject_id));
    }
    let info_id = doc.add_object(info_dict);
    doc.trailer.set("Info", Object::Reference(info_id));

    let mut output = Vec::new();
    doc.save_to(&mut output)
        .map_err(|e| ReportError::Pdf(e.to_string()))?;
    Ok(output)
}
