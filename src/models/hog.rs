use crate::models::{BoundingBox, Detection, PeopleClassifier, ScanParams};
use crate::utils::error::ServiceError;
use crate::Result;
use image::GrayImage;
use opencv::core::{Mat, Rect, Size, Vector};
use opencv::objdetect::HOGDescriptor;
use opencv::prelude::*;
use std::cell::RefCell;

thread_local! {
    // One descriptor per blocking worker, so concurrent scans never wait on each other.
    static DESCRIPTOR: RefCell<Option<HOGDescriptor>> = RefCell::new(None);
}

/// OpenCV HOG descriptor with the stock pedestrian SVM.
pub struct HogPeopleClassifier;

impl HogPeopleClassifier {
    /// Builds one descriptor up front so a broken OpenCV install fails at startup.
    pub fn new() -> Result<Self> {
        tracing::info!("Initializing HOG people detector");

        let hog = build_descriptor()?;
        tracing::debug!("HOG window size: {:?}", hog.win_size());

        Ok(Self)
    }
}

fn build_descriptor() -> Result<HOGDescriptor> {
    let mut hog = HOGDescriptor::default().map_err(opencv_error)?;
    let svm = HOGDescriptor::get_default_people_detector().map_err(opencv_error)?;
    hog.set_svm_detector(&svm).map_err(opencv_error)?;
    Ok(hog)
}

fn with_descriptor<T>(scan: impl FnOnce(&HOGDescriptor) -> Result<T>) -> Result<T> {
    DESCRIPTOR.with(|cell| {
        let mut slot = cell.borrow_mut();
        if slot.is_none() {
            tracing::debug!("Building HOG descriptor for worker thread {:?}", std::thread::current().id());
            *slot = Some(build_descriptor()?);
        }
        let hog = slot
            .as_ref()
            .ok_or_else(|| ServiceError::Detection("HOG descriptor unavailable".to_string()))?;
        scan(hog)
    })
}

impl PeopleClassifier for HogPeopleClassifier {
    fn name(&self) -> &str {
        "opencv-hog-default-people"
    }

    fn detect_multi_scale(&self, gray: &GrayImage, params: &ScanParams) -> Result<Vec<Detection>> {
        let (width, height) = gray.dimensions();
        let mat = Mat::new_rows_cols_with_data(height as i32, width as i32, gray.as_raw())
            .map_err(opencv_error)?;

        let mut locations: Vector<Rect> = Vector::new();
        let mut weights: Vector<f64> = Vector::new();

        with_descriptor(|hog| {
            hog.detect_multi_scale_weights(
                &*mat,
                &mut locations,
                &mut weights,
                params.hit_threshold,
                Size::new(params.win_stride.0, params.win_stride.1),
                Size::new(params.padding.0, params.padding.1),
                params.scale,
                params.group_threshold,
                false,
            )
            .map_err(opencv_error)
        })?;

        let detections = locations
            .iter()
            .zip(weights.iter())
            .map(|(rect, weight)| Detection {
                bbox: BoundingBox::new(rect.x, rect.y, rect.width, rect.height),
                weight,
            })
            .collect();

        Ok(detections)
    }
}

fn opencv_error(e: opencv::Error) -> ServiceError {
    ServiceError::Detection(e.to_string())
}
