//! Grayscale conversion and detection overlays.
//!
//! Boxes are drawn as 2px hollow rectangles with `imageproc`. The "Person"
//! label uses a small built-in 5x7 bitmap font so no font file has to ship
//! with the service.

use crate::models::{BoundingBox, Detection, ScanParams};
use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

pub const BOX_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
pub const BOX_THICKNESS: i32 = 2;
pub const LABEL_TEXT: &str = "Person";

/// Gap between the label baseline and the raw box top.
const LABEL_OFFSET: i32 = 10;
const GLYPH_WIDTH: i32 = 5;
const GLYPH_HEIGHT: i32 = 7;
const GLYPH_SCALE: i32 = 2;
const GLYPH_ADVANCE: i32 = (GLYPH_WIDTH + 1) * GLYPH_SCALE;

/// Intensity image with ITU-R BT.601 weights, rounded to nearest.
pub fn to_grayscale(image: &RgbImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let Rgb([r, g, b]) = *image.get_pixel(x, y);
        let luma = (299 * r as u32 + 587 * g as u32 + 114 * b as u32 + 500) / 1000;
        Luma([luma as u8])
    })
}

/// Inclusive corners of the rectangle drawn for a raw detection window.
///
/// The classifier's windows include a margin of background, so each side
/// is pulled in by a fixed fraction of the box size.
pub fn shrunk_corners(bbox: &BoundingBox, params: &ScanParams) -> ((i32, i32), (i32, i32)) {
    let pad_w = (params.shrink_x * bbox.width as f64).floor() as i32;
    let pad_h = (params.shrink_y * bbox.height as f64).floor() as i32;
    (
        (bbox.x + pad_w, bbox.y + pad_h),
        (bbox.x + bbox.width - pad_w, bbox.y + bbox.height - pad_h),
    )
}

/// Inclusive pixel bounds covered by the label of a raw detection window.
pub fn label_bounds(bbox: &BoundingBox) -> ((i32, i32), (i32, i32)) {
    let left = bbox.x;
    let bottom = bbox.y - LABEL_OFFSET - 1;
    let top = bottom - GLYPH_HEIGHT * GLYPH_SCALE + 1;
    let right = left + GLYPH_ADVANCE * LABEL_TEXT.chars().count() as i32 - 1;
    ((left, top), (right, bottom))
}

/// Returns a copy of `image` with every detection outlined and labelled.
pub fn annotate(image: &RgbImage, detections: &[Detection], params: &ScanParams) -> RgbImage {
    let mut canvas = image.clone();
    for detection in detections {
        draw_detection(&mut canvas, &detection.bbox, params);
    }
    canvas
}

pub fn draw_detection(canvas: &mut RgbImage, bbox: &BoundingBox, params: &ScanParams) {
    let (top_left, bottom_right) = shrunk_corners(bbox, params);
    draw_outline(canvas, top_left, bottom_right, BOX_THICKNESS, BOX_COLOR);

    let ((left, top), _) = label_bounds(bbox);
    draw_text(canvas, left, top, LABEL_TEXT, BOX_COLOR);
}

/// Draws `thickness` nested rings inward from the given inclusive corners.
fn draw_outline(
    canvas: &mut RgbImage,
    (x0, y0): (i32, i32),
    (x1, y1): (i32, i32),
    thickness: i32,
    color: Rgb<u8>,
) {
    for inset in 0..thickness {
        let width = x1 - x0 + 1 - 2 * inset;
        let height = y1 - y0 + 1 - 2 * inset;
        if width <= 0 || height <= 0 {
            break;
        }
        let rect = Rect::at(x0 + inset, y0 + inset).of_size(width as u32, height as u32);
        draw_hollow_rect_mut(canvas, rect, color);
    }
}

fn draw_text(canvas: &mut RgbImage, left: i32, top: i32, text: &str, color: Rgb<u8>) {
    for (index, ch) in text.chars().enumerate() {
        let Some(rows) = glyph(ch) else { continue };
        let origin_x = left + index as i32 * GLYPH_ADVANCE;

        for (row, bits) in rows.iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                    continue;
                }
                let px = origin_x + col * GLYPH_SCALE;
                let py = top + row as i32 * GLYPH_SCALE;
                fill_block(canvas, px, py, GLYPH_SCALE, color);
            }
        }
    }
}

fn fill_block(canvas: &mut RgbImage, x: i32, y: i32, size: i32, color: Rgb<u8>) {
    let (width, height) = (canvas.width() as i32, canvas.height() as i32);
    for dy in 0..size {
        for dx in 0..size {
            let (px, py) = (x + dx, y + dy);
            if px >= 0 && py >= 0 && px < width && py < height {
                canvas.put_pixel(px as u32, py as u32, color);
            }
        }
    }
}

fn glyph(ch: char) -> Option<[u8; 7]> {
    let rows = match ch {
        'P' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
        'e' => [0b00000, 0b00000, 0b01110, 0b10001, 0b11111, 0b10000, 0b01110],
        'r' => [0b00000, 0b00000, 0b10110, 0b11001, 0b10000, 0b10000, 0b10000],
        's' => [0b00000, 0b00000, 0b01111, 0b10000, 0b01110, 0b00001, 0b11110],
        'o' => [0b00000, 0b00000, 0b01110, 0b10001, 0b10001, 0b10001, 0b01110],
        'n' => [0b00000, 0b00000, 0b10110, 0b11001, 0b10001, 0b10001, 0b10001],
        _ => return None,
    };
    Some(rows)
}
