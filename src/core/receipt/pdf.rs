//! Minimal PDF 1.4 writer for receipts.
//!
//! Produces an A4 document using the standard Helvetica fonts (no embedding) and, when a
//! logo is available, one JPEG image XObject. Long orders continue on further pages; the
//! TOTAL row is printed once, after the last line.

use super::{Receipt, format_money, format_quantity, header_lines};
use crate::errors::Result;
use image::{DynamicImage, codecs::jpeg::JpegEncoder};

const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
const MARGIN: f32 = 40.0;
const LOGO_BOX: f32 = 85.0;
const ROW_HEIGHT: f32 = 22.0;
const TABLE_TOP_FIRST: f32 = 680.0;
const TABLE_TOP_NEXT: f32 = PAGE_HEIGHT - MARGIN;
const TABLE_BOTTOM: f32 = MARGIN + ROW_HEIGHT;
const COLUMNS: [f32; 4] = [230.0, 80.0, 100.0, 105.0];
const HEADERS: [&str; 4] = ["Product", "Qty (ml)", "Unit cost", "Total"];
const PRODUCT_CHARS: usize = 34;

/// Object store that serializes into a PDF file with a cross-reference table.
#[derive(Default)]
struct PdfDocument {
    objects: Vec<Vec<u8>>,
}

impl PdfDocument {
    /// Reserves an object number to be filled later with [`Self::set`].
    fn reserve(&mut self) -> usize {
        self.objects.push(Vec::new());
        self.objects.len()
    }

    fn set(&mut self, id: usize, body: Vec<u8>) {
        self.objects[id - 1] = body;
    }

    fn add(&mut self, body: Vec<u8>) -> usize {
        let id = self.reserve();
        self.set(id, body);
        id
    }

    fn finish(self, root: usize) -> Vec<u8> {
        let mut out = b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n".to_vec();
        let mut offsets = Vec::with_capacity(self.objects.len());

        for (index, body) in self.objects.iter().enumerate() {
            offsets.push(out.len());
            out.extend_from_slice(format!("{} 0 obj\n", index + 1).as_bytes());
            out.extend_from_slice(body);
            out.extend_from_slice(b"\nendobj\n");
        }

        let xref = out.len();
        out.extend_from_slice(
            format!("xref\n0 {}\n0000000000 65535 f \n", self.objects.len() + 1).as_bytes(),
        );
        for offset in offsets {
            out.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
        }
        out.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root {root} 0 R >>\nstartxref\n{xref}\n%%EOF\n",
                self.objects.len() + 1
            )
            .as_bytes(),
        );
        out
    }
}

fn stream(dictionary: &str, data: &[u8]) -> Vec<u8> {
    let mut body = format!("<< {dictionary} /Length {} >>\nstream\n", data.len()).into_bytes();
    body.extend_from_slice(data);
    body.extend_from_slice(b"\nendstream");
    body
}

/// Encodes text as a PDF literal string in `WinAnsiEncoding`.
fn push_text_literal(out: &mut Vec<u8>, text: &str) {
    out.push(b'(');
    for c in text.chars() {
        match c {
            '(' | ')' | '\\' => out.extend_from_slice(&[b'\\', c as u8]),
            '€' => out.push(0x80),
            // ASCII and the Latin-1 supplement map 1:1 onto WinAnsi
            ' '..='~' | '\u{A0}'..='\u{FF}' => out.push(u8::try_from(c).unwrap_or(b'?')),
            _ => out.push(b'?'),
        }
    }
    out.push(b')');
}

/// Width of text made of digits and money punctuation in Helvetica, in points.
fn numeric_width(text: &str, size: f32) -> f32 {
    let units: u32 = text
        .chars()
        .map(|c| match c {
            '.' | ',' | ' ' => 278,
            '-' => 333,
            _ => 556,
        })
        .sum();
    #[allow(clippy::cast_precision_loss)]
    let units = units as f32;
    units * size / 1000.0
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut short: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    short.push_str("...");
    short
}

/// Builder for one page's content stream.
#[derive(Default)]
struct Content {
    ops: Vec<u8>,
}

impl Content {
    fn raw(&mut self, op: &str) {
        self.ops.extend_from_slice(op.as_bytes());
    }

    fn text(&mut self, font: &str, size: f32, x: f32, y: f32, text: &str) {
        self.raw(&format!("BT /{font} {size} Tf {x:.2} {y:.2} Td "));
        push_text_literal(&mut self.ops, text);
        self.raw(" Tj ET\n");
    }

    fn text_right(&mut self, font: &str, size: f32, right: f32, y: f32, text: &str) {
        let x = right - numeric_width(text, size);
        self.text(font, size, x, y, text);
    }

    fn cell(&mut self, x: f32, top: f32, width: f32, fill_grey: Option<f32>) {
        let y = top - ROW_HEIGHT;
        if let Some(grey) = fill_grey {
            self.raw(&format!(
                "{grey:.2} g {x:.2} {y:.2} {width:.2} {ROW_HEIGHT:.2} re f 0 g\n"
            ));
        }
        self.raw(&format!("{x:.2} {y:.2} {width:.2} {ROW_HEIGHT:.2} re S\n"));
    }

    /// Draws one table row. Column 0 is left aligned, the others right aligned.
    fn row(&mut self, top: f32, font: &str, cells: [&str; 4], fill_grey: Option<f32>) {
        let baseline = top - 15.0;
        let mut x = MARGIN;
        for (i, (width, text)) in COLUMNS.iter().zip(cells).enumerate() {
            self.cell(x, top, *width, fill_grey);
            if i == 0 || text.chars().any(char::is_alphabetic) {
                self.text(font, 11.0, x + 5.0, baseline, text);
            } else {
                self.text_right(font, 11.0, x + width - 5.0, baseline, text);
            }
            x += width;
        }
    }
}

struct PdfLogo {
    jpeg: Vec<u8>,
    width: u32,
    height: u32,
}

fn encode_logo(logo: &DynamicImage) -> Result<PdfLogo> {
    let rgb = logo.to_rgb8();
    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, 90).encode_image(&rgb)?;
    Ok(PdfLogo {
        jpeg,
        width: rgb.width(),
        height: rgb.height(),
    })
}

fn draw_logo(content: &mut Content, logo: &PdfLogo) {
    #[allow(clippy::cast_precision_loss)]
    let (w, h) = (logo.width as f32, logo.height as f32);
    let scale = (LOGO_BOX / w).min(LOGO_BOX / h);
    let (w, h) = (w * scale, h * scale);
    let x = PAGE_WIDTH - MARGIN - w;
    let y = PAGE_HEIGHT - 30.0 - h;
    content.raw(&format!(
        "q {w:.2} 0 0 {h:.2} {x:.2} {y:.2} cm /Im1 Do Q\n"
    ));
}

fn draw_header(content: &mut Content, receipt: &Receipt) {
    content.text("F2", 16.0, MARGIN, 800.0, &receipt.business_name);
    content.text("F2", 14.0, MARGIN, 772.0, &format!("Order #{}", receipt.order_id));
    for (i, line) in header_lines(receipt).iter().enumerate() {
        #[allow(clippy::cast_precision_loss)]
        let y = 17.0f32.mul_add(-(i as f32), 752.0);
        content.text("F1", 12.0, MARGIN, y, line);
    }
}

/// Lays out every page's content stream.
fn layout(receipt: &Receipt, logo: Option<&PdfLogo>) -> Vec<Content> {
    let mut pages = Vec::new();
    let mut page = Content::default();
    page.raw("0.8 w\n");
    if let Some(logo) = logo {
        draw_logo(&mut page, logo);
    }
    draw_header(&mut page, receipt);

    let mut top = TABLE_TOP_FIRST;
    page.row(top, "F2", HEADERS, Some(0.93));
    top -= ROW_HEIGHT;

    for line in &receipt.lines {
        if top - ROW_HEIGHT < TABLE_BOTTOM {
            pages.push(std::mem::take(&mut page));
            page.raw("0.8 w\n");
            top = TABLE_TOP_NEXT;
            page.row(top, "F2", HEADERS, Some(0.93));
            top -= ROW_HEIGHT;
        }
        let product = truncate(&line.product_name, PRODUCT_CHARS);
        let quantity = format_quantity(line.quantity);
        let unit_cost = format_money(line.unit_cost);
        let total = format_money(line.line_total);
        page.row(top, "F1", [&product, &quantity, &unit_cost, &total], None);
        top -= ROW_HEIGHT;
    }

    if top - ROW_HEIGHT < MARGIN {
        pages.push(std::mem::take(&mut page));
        page.raw("0.8 w\n");
        top = TABLE_TOP_NEXT;
    }
    draw_total(&mut page, top, receipt);
    pages.push(page);
    pages
}

fn draw_total(content: &mut Content, top: f32, receipt: &Receipt) {
    let label_width: f32 = COLUMNS[..3].iter().sum();
    let total_width = COLUMNS[3];
    let baseline = top - 15.0;

    content.cell(MARGIN, top, label_width, Some(0.86));
    content.cell(MARGIN + label_width, top, total_width, Some(0.86));
    content.text("F2", 12.0, MARGIN + 5.0, baseline, "TOTAL");
    content.text_right(
        "F2",
        12.0,
        MARGIN + label_width + total_width - 5.0,
        baseline,
        &format_money(receipt.total()),
    );
}

/// Renders `receipt` as a PDF document.
pub(super) fn render(receipt: &Receipt, logo: Option<&DynamicImage>) -> Result<Vec<u8>> {
    let logo = logo.map(encode_logo).transpose()?;
    let pages = layout(receipt, logo.as_ref());

    let mut doc = PdfDocument::default();
    let catalog = doc.reserve();
    let page_tree = doc.reserve();
    let regular = doc.add(
        b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_vec(),
    );
    let bold = doc.add(
        b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>"
            .to_vec(),
    );

    let image = logo.as_ref().map(|logo| {
        doc.add(stream(
            &format!(
                "/Type /XObject /Subtype /Image /Width {} /Height {} /ColorSpace /DeviceRGB \
                 /BitsPerComponent 8 /Filter /DCTDecode",
                logo.width, logo.height
            ),
            &logo.jpeg,
        ))
    });
    let xobjects = image.map_or_else(String::new, |id| format!(" /XObject << /Im1 {id} 0 R >>"));

    let mut kids = Vec::with_capacity(pages.len());
    for content in pages {
        let contents = doc.add(stream("", &content.ops));
        let page = doc.add(
            format!(
                "<< /Type /Page /Parent {page_tree} 0 R /MediaBox [0 0 {PAGE_WIDTH} {PAGE_HEIGHT}] \
                 /Resources << /Font << /F1 {regular} 0 R /F2 {bold} 0 R >>{xobjects} >> \
                 /Contents {contents} 0 R >>"
            )
            .into_bytes(),
        );
        kids.push(format!("{page} 0 R"));
    }

    doc.set(
        page_tree,
        format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            kids.len()
        )
        .into_bytes(),
    );
    doc.set(
        catalog,
        format!("<< /Type /Catalog /Pages {page_tree} 0 R >>").into_bytes(),
    );

    Ok(doc.finish(catalog))
}
