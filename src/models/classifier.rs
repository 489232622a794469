use crate::models::{Detection, ScanParams};
use crate::Result;
use image::GrayImage;

/// A pretrained people classifier run as a multi-scale sliding-window scan.
///
/// Implementations must be shareable across requests; the configuration
/// is loaded once and never mutated.
pub trait PeopleClassifier: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Scans an intensity image and returns every grouped hit.
    fn detect_multi_scale(&self, gray: &GrayImage, params: &ScanParams) -> Result<Vec<Detection>>;
}
