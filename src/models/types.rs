use serde::Serialize;

/// Raw detection window in image pixel coordinates.
///
/// `x`/`y` can be negative: windows found near the border with padding
/// extend past the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BoundingBox {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }
}

/// One classifier hit: the window plus its SVM weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Detection {
    pub bbox: BoundingBox,
    pub weight: f64,
}

/// Fixed sliding-window scan settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanParams {
    /// Window stride (x, y) in pixels
    pub win_stride: (i32, i32),
    /// Padding (x, y) added around the image before scanning
    pub padding: (i32, i32),
    /// Scale factor between pyramid levels
    pub scale: f64,
    /// SVM hit threshold
    pub hit_threshold: f64,
    /// Minimum cluster size when grouping overlapping windows
    pub group_threshold: f64,
    /// Fraction of the width trimmed from each horizontal side before drawing
    pub shrink_x: f64,
    /// Fraction of the height trimmed from each vertical side before drawing
    pub shrink_y: f64,
}

impl Default for ScanParams {
    fn default() -> Self {
        Self {
            win_stride: (10, 10),
            padding: (32, 32),
            scale: 1.1,
            hit_threshold: 0.0,
            group_threshold: 2.0,
            shrink_x: 0.15,
            shrink_y: 0.01,
        }
    }
}
