//! Raster receipts drawn with a built-in 5x7 bitmap font.

use super::{Receipt, format_money, format_quantity, header_lines};
use crate::errors::Result;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, imageops};
use std::io::Cursor;

pub(super) const WIDTH: u32 = 760;
pub(super) const MARGIN: u32 = 30;
const LOGO_BOX: u32 = 120;
const ROW_HEIGHT: u32 = 28;
const COLUMNS: [u32; 4] = [340, 100, 120, 140];
const HEADERS: [&str; 4] = ["Product", "Qty (ml)", "Unit cost", "Total"];

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
const HEADER_GREY: Rgb<u8> = Rgb([237, 237, 237]);
const TOTAL_GREY: Rgb<u8> = Rgb([220, 220, 220]);

/// Glyphs for ASCII 0x20..=0x7E, five columns each, least significant bit at the top.
const FONT: [[u8; 5]; 95] = [
    [0x00, 0x00, 0x00, 0x00, 0x00], // ' '
    [0x00, 0x00, 0x5F, 0x00, 0x00], // !
    [0x00, 0x07, 0x00, 0x07, 0x00], // "
    [0x14, 0x7F, 0x14, 0x7F, 0x14], // #
    [0x24, 0x2A, 0x7F, 0x2A, 0x12], // $
    [0x23, 0x13, 0x08, 0x64, 0x62], // %
    [0x36, 0x49, 0x56, 0x20, 0x50], // &
    [0x00, 0x05, 0x03, 0x00, 0x00], // '
    [0x00, 0x1C, 0x22, 0x41, 0x00], // (
    [0x00, 0x41, 0x22, 0x1C, 0x00], // )
    [0x2A, 0x1C, 0x7F, 0x1C, 0x2A], // *
    [0x08, 0x08, 0x3E, 0x08, 0x08], // +
    [0x00, 0x50, 0x30, 0x00, 0x00], // ,
    [0x08, 0x08, 0x08, 0x08, 0x08], // -
    [0x00, 0x60, 0x60, 0x00, 0x00], // .
    [0x20, 0x10, 0x08, 0x04, 0x02], // /
    [0x3E, 0x51, 0x49, 0x45, 0x3E], // 0
    [0x00, 0x42, 0x7F, 0x40, 0x00], // 1
    [0x42, 0x61, 0x51, 0x49, 0x46], // 2
    [0x21, 0x41, 0x45, 0x4B, 0x31], // 3
    [0x18, 0x14, 0x12, 0x7F, 0x10], // 4
    [0x27, 0x45, 0x45, 0x45, 0x39], // 5
    [0x3C, 0x4A, 0x49, 0x49, 0x30], // 6
    [0x01, 0x71, 0x09, 0x05, 0x03], // 7
    [0x36, 0x49, 0x49, 0x49, 0x36], // 8
    [0x06, 0x49, 0x49, 0x29, 0x1E], // 9
    [0x00, 0x36, 0x36, 0x00, 0x00], // :
    [0x00, 0x56, 0x36, 0x00, 0x00], // ;
    [0x08, 0x14, 0x22, 0x41, 0x00], // <
    [0x14, 0x14, 0x14, 0x14, 0x14], // =
    [0x00, 0x41, 0x22, 0x14, 0x08], // >
    [0x02, 0x01, 0x51, 0x09, 0x06], // ?
    [0x32, 0x49, 0x79, 0x41, 0x3E], // @
    [0x7E, 0x11, 0x11, 0x11, 0x7E], // A
    [0x7F, 0x49, 0x49, 0x49, 0x36], // B
    [0x3E, 0x41, 0x41, 0x41, 0x22], // C
    [0x7F, 0x41, 0x41, 0x22, 0x1C], // D
    [0x7F, 0x49, 0x49, 0x49, 0x41], // E
    [0x7F, 0x09, 0x09, 0x09, 0x01], // F
    [0x3E, 0x41, 0x49, 0x49, 0x7A], // G
    [0x7F, 0x08, 0x08, 0x08, 0x7F], // H
    [0x00, 0x41, 0x7F, 0x41, 0x00], // I
    [0x20, 0x40, 0x41, 0x3F, 0x01], // J
    [0x7F, 0x08, 0x14, 0x22, 0x41], // K
    [0x7F, 0x40, 0x40, 0x40, 0x40], // L
    [0x7F, 0x02, 0x0C, 0x02, 0x7F], // M
    [0x7F, 0x04, 0x08, 0x10, 0x7F], // N
    [0x3E, 0x41, 0x41, 0x41, 0x3E], // O
    [0x7F, 0x09, 0x09, 0x09, 0x06], // P
    [0x3E, 0x41, 0x51, 0x21, 0x5E], // Q
    [0x7F, 0x09, 0x19, 0x29, 0x46], // R
    [0x46, 0x49, 0x49, 0x49, 0x31], // S
    [0x01, 0x01, 0x7F, 0x01, 0x01], // T
    [0x3F, 0x40, 0x40, 0x40, 0x3F], // U
    [0x1F, 0x20, 0x40, 0x20, 0x1F], // V
    [0x3F, 0x40, 0x38, 0x40, 0x3F], // W
    [0x63, 0x14, 0x08, 0x14, 0x63], // X
    [0x07, 0x08, 0x70, 0x08, 0x07], // Y
    [0x61, 0x51, 0x49, 0x45, 0x43], // Z
    [0x00, 0x7F, 0x41, 0x41, 0x00], // [
    [0x02, 0x04, 0x08, 0x10, 0x20], // \
    [0x00, 0x41, 0x41, 0x7F, 0x00], // ]
    [0x04, 0x02, 0x01, 0x02, 0x04], // ^
    [0x40, 0x40, 0x40, 0x40, 0x40], // _
    [0x00, 0x01, 0x02, 0x04, 0x00], // `
    [0x20, 0x54, 0x54, 0x54, 0x78], // a
    [0x7F, 0x48, 0x44, 0x44, 0x38], // b
    [0x38, 0x44, 0x44, 0x44, 0x20], // c
    [0x38, 0x44, 0x44, 0x48, 0x7F], // d
    [0x38, 0x54, 0x54, 0x54, 0x18], // e
    [0x08, 0x7E, 0x09, 0x01, 0x02], // f
    [0x0C, 0x52, 0x52, 0x52, 0x3E], // g
    [0x7F, 0x08, 0x04, 0x04, 0x78], // h
    [0x00, 0x44, 0x7D, 0x40, 0x00], // i
    [0x20, 0x40, 0x44, 0x3D, 0x00], // j
    [0x7F, 0x10, 0x28, 0x44, 0x00], // k
    [0x00, 0x41, 0x7F, 0x40, 0x00], // l
    [0x7C, 0x04, 0x18, 0x04, 0x78], // m
    [0x7C, 0x08, 0x04, 0x04, 0x78], // n
    [0x38, 0x44, 0x44, 0x44, 0x38], // o
    [0x7C, 0x14, 0x14, 0x14, 0x08], // p
    [0x08, 0x14, 0x14, 0x18, 0x7C], // q
    [0x7C, 0x08, 0x04, 0x04, 0x08], // r
    [0x48, 0x54, 0x54, 0x54, 0x20], // s
    [0x04, 0x3F, 0x44, 0x40, 0x20], // t
    [0x3C, 0x40, 0x40, 0x20, 0x7C], // u
    [0x1C, 0x20, 0x40, 0x20, 0x1C], // v
    [0x3C, 0x40, 0x30, 0x40, 0x3C], // w
    [0x44, 0x28, 0x10, 0x28, 0x44], // x
    [0x0C, 0x50, 0x50, 0x50, 0x3C], // y
    [0x44, 0x64, 0x54, 0x4C, 0x44], // z
    [0x00, 0x08, 0x36, 0x41, 0x00], // {
    [0x00, 0x00, 0x7F, 0x00, 0x00], // |
    [0x00, 0x41, 0x36, 0x08, 0x00], // }
    [0x08, 0x04, 0x08, 0x10, 0x08], // ~
];

/// Maps accented Latin letters onto their base letter; anything else outside the font
/// becomes `?`.
fn fold(c: char) -> char {
    match c {
        'á' | 'à' | 'ä' | 'â' | 'ã' => 'a',
        'é' | 'è' | 'ë' | 'ê' => 'e',
        'í' | 'ì' | 'ï' | 'î' => 'i',
        'ó' | 'ò' | 'ö' | 'ô' | 'õ' => 'o',
        'ú' | 'ù' | 'ü' | 'û' => 'u',
        'ñ' => 'n',
        'ç' => 'c',
        'Á' | 'À' | 'Ä' | 'Â' | 'Ã' => 'A',
        'É' | 'È' | 'Ë' | 'Ê' => 'E',
        'Í' | 'Ì' | 'Ï' | 'Î' => 'I',
        'Ó' | 'Ò' | 'Ö' | 'Ô' | 'Õ' => 'O',
        'Ú' | 'Ù' | 'Ü' | 'Û' => 'U',
        'Ñ' => 'N',
        'Ç' => 'C',
        ' '..='~' => c,
        _ => '?',
    }
}

fn glyph(c: char) -> &'static [u8; 5] {
    let index = (u32::from(fold(c)) - 0x20) as usize;
    &FONT[index.min(FONT.len() - 1)]
}

/// Pixel width of `text` at `scale`: 5 columns plus 1 spacing per glyph.
fn text_width(text: &str, scale: u32) -> u32 {
    u32::try_from(text.chars().count()).unwrap_or(u32::MAX / 8).saturating_mul(6 * scale)
}

struct Canvas {
    image: RgbImage,
}

impl Canvas {
    fn new(height: u32) -> Self {
        Self {
            image: RgbImage::from_pixel(WIDTH, height, WHITE),
        }
    }

    fn fill(&mut self, x: u32, y: u32, w: u32, h: u32, color: Rgb<u8>) {
        let x_end = (x + w).min(self.image.width());
        let y_end = (y + h).min(self.image.height());
        for py in y..y_end {
            for px in x..x_end {
                self.image.put_pixel(px, py, color);
            }
        }
    }

    fn outline(&mut self, x: u32, y: u32, w: u32, h: u32) {
        self.fill(x, y, w, 1, BLACK);
        self.fill(x, y + h - 1, w, 1, BLACK);
        self.fill(x, y, 1, h, BLACK);
        self.fill(x + w - 1, y, 1, h, BLACK);
    }

    fn text(&mut self, x: u32, y: u32, scale: u32, text: &str) {
        let mut cursor = x;
        for c in text.chars() {
            for (col, bits) in glyph(c).iter().enumerate() {
                for row in 0..7 {
                    if bits & (1 << row) != 0 {
                        let px = cursor + u32::try_from(col).unwrap_or(0) * scale;
                        self.fill(px, y + row * scale, scale, scale, BLACK);
                    }
                }
            }
            cursor += 6 * scale;
        }
    }

    /// Text clipped to `max_width` pixels, right-aligned when `right` is set.
    fn text_in(&mut self, x: u32, y: u32, max_width: u32, right: bool, text: &str) {
        let fits = (max_width / 12) as usize;
        let clipped: String = if text.chars().count() > fits {
            let mut short: String = text.chars().take(fits.saturating_sub(2)).collect();
            short.push_str("..");
            short
        } else {
            text.to_string()
        };
        let x = if right {
            x + max_width.saturating_sub(text_width(&clipped, 2))
        } else {
            x
        };
        self.text(x, y, 2, &clipped);
    }

    fn row(&mut self, top: u32, cells: [&str; 4], background: Option<Rgb<u8>>) {
        let mut x = MARGIN;
        for (i, (width, text)) in COLUMNS.iter().zip(cells).enumerate() {
            if let Some(color) = background {
                self.fill(x, top, *width, ROW_HEIGHT, color);
            }
            self.outline(x, top, *width, ROW_HEIGHT);
            let right = i > 0 && !text.chars().any(char::is_alphabetic);
            self.text_in(x + 6, top + 7, width - 12, right, text);
            x += width;
        }
    }

    fn logo(&mut self, logo: &DynamicImage) {
        let logo = if logo.width() > LOGO_BOX || logo.height() > LOGO_BOX {
            logo.resize(LOGO_BOX, LOGO_BOX, imageops::FilterType::Triangle)
        } else {
            logo.clone()
        };
        let logo = logo.to_rgb8();
        let x = WIDTH - MARGIN - logo.width();
        imageops::overlay(&mut self.image, &logo, i64::from(x), i64::from(MARGIN));
    }
}

/// Renders `receipt` as a PNG image.
pub(super) fn render(receipt: &Receipt, logo: Option<&DynamicImage>) -> Result<Vec<u8>> {
    let table_top = MARGIN + 170;
    let rows = u32::try_from(receipt.lines.len()).unwrap_or(u32::MAX / ROW_HEIGHT - 16);
    let height = table_top + (rows + 2) * ROW_HEIGHT + MARGIN;

    let mut canvas = Canvas::new(height);
    if let Some(logo) = logo {
        canvas.logo(logo);
    }

    canvas.text(MARGIN, MARGIN, 4, &receipt.business_name);
    canvas.text(MARGIN, MARGIN + 48, 3, &format!("Order #{}", receipt.order_id));
    for (i, line) in (0u32..).zip(header_lines(receipt).iter()) {
        canvas.text(MARGIN, MARGIN + 84 + i * 24, 2, line);
    }

    let mut top = table_top;
    canvas.row(top, HEADERS, Some(HEADER_GREY));
    top += ROW_HEIGHT;

    for line in &receipt.lines {
        let quantity = format_quantity(line.quantity);
        let unit_cost = format_money(line.unit_cost);
        let total = format_money(line.line_total);
        canvas.row(
            top,
            [&line.product_name, &quantity, &unit_cost, &total],
            None,
        );
        top += ROW_HEIGHT;
    }

    let label_width: u32 = COLUMNS[..3].iter().sum();
    let total_width = COLUMNS[3];
    canvas.fill(MARGIN, top, label_width + total_width, ROW_HEIGHT, TOTAL_GREY);
    canvas.outline(MARGIN, top, label_width, ROW_HEIGHT);
    canvas.outline(MARGIN + label_width, top, total_width, ROW_HEIGHT);
    canvas.text_in(MARGIN + 6, top + 7, label_width - 12, false, "TOTAL");
    canvas.text_in(
        MARGIN + label_width + 6,
        top + 7,
        total_width - 12,
        true,
        &format_money(receipt.total()),
    );

    let mut bytes = Vec::new();
    canvas
        .image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}
