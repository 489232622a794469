use crate::image::annotate;
use crate::models::{Detection, PeopleClassifier, ScanParams};
use crate::{Config, Result};
use image::RgbImage;
use std::time::Instant;

/// Result of one detection pass. Every variant carries the image to forward.
#[derive(Debug, Clone)]
pub enum ScanOutcome {
    /// At least one person; `image` is an annotated copy.
    Found {
        image: RgbImage,
        detections: Vec<Detection>,
    },
    /// Clean scan with no hits; `image` is an unmodified copy.
    NotFound { image: RgbImage },
    /// The scan errored and counts as a negative; `image` is an unmodified copy.
    Failed { image: RgbImage, reason: String },
}

impl ScanOutcome {
    pub fn has_person(&self) -> bool {
        matches!(self, ScanOutcome::Found { .. })
    }

    pub fn image(&self) -> &RgbImage {
        match self {
            ScanOutcome::Found { image, .. }
            | ScanOutcome::NotFound { image }
            | ScanOutcome::Failed { image, .. } => image,
        }
    }

    pub fn into_image(self) -> RgbImage {
        match self {
            ScanOutcome::Found { image, .. }
            | ScanOutcome::NotFound { image }
            | ScanOutcome::Failed { image, .. } => image,
        }
    }

    pub fn detections(&self) -> &[Detection] {
        match self {
            ScanOutcome::Found { detections, .. } => detections,
            _ => &[],
        }
    }
}

pub struct PersonDetector {
    classifier: Box<dyn PeopleClassifier>,
    params: ScanParams,
}

impl PersonDetector {
    pub fn new(classifier: Box<dyn PeopleClassifier>) -> Self {
        Self::with_params(classifier, ScanParams::default())
    }

    pub fn with_params(classifier: Box<dyn PeopleClassifier>, params: ScanParams) -> Self {
        tracing::info!("Person detector ready: classifier={}, params={:?}", classifier.name(), params);
        Self { classifier, params }
    }

    /// Builds the detector backed by the OpenCV HOG people classifier.
    #[cfg(feature = "opencv")]
    pub fn from_config(_config: &Config) -> Result<Self> {
        let classifier = crate::models::hog::HogPeopleClassifier::new()?;
        Ok(Self::new(Box::new(classifier)))
    }

    #[cfg(not(feature = "opencv"))]
    pub fn from_config(_config: &Config) -> Result<Self> {
        Err(crate::utils::error::ServiceError::Config(
            "built without the `opencv` feature, no people classifier available".to_string(),
        ))
    }

    pub fn params(&self) -> &ScanParams {
        &self.params
    }

    /// Scans `image` for people. Never fails: classifier errors are logged
    /// and reported as [`ScanOutcome::Failed`]. The input is left untouched.
    pub fn detect(&self, image: &RgbImage) -> ScanOutcome {
        let start = Instant::now();
        let gray = annotate::to_grayscale(image);

        let detections = match self.classifier.detect_multi_scale(&gray, &self.params) {
            Ok(detections) => detections,
            Err(e) => {
                tracing::error!("Person detection failed: {}", e);
                return ScanOutcome::Failed {
                    image: image.clone(),
                    reason: e.to_string(),
                };
            }
        };

        tracing::debug!(
            "Scanned {}x{} image in {:.3}s",
            image.width(),
            image.height(),
            start.elapsed().as_secs_f32()
        );

        if detections.is_empty() {
            tracing::info!("No people found in image");
            return ScanOutcome::NotFound {
                image: image.clone(),
            };
        }

        tracing::info!("Found {} people in image", detections.len());
        for detection in &detections {
            tracing::debug!("Detection {:?} weight={:.3}", detection.bbox, detection.weight);
        }

        let annotated = annotate::annotate(image, &detections, &self.params);
        ScanOutcome::Found {
            image: annotated,
            detections,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BoundingBox;
    use crate::utils::error::ServiceError;
    use image::{GrayImage, Rgb};

    struct Fixed(Vec<Detection>);

    impl PeopleClassifier for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn detect_multi_scale(&self, _gray: &GrayImage, _params: &ScanParams) -> Result<Vec<Detection>> {
            Ok(self.0.clone())
        }
    }

    struct Broken;

    impl PeopleClassifier for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        fn detect_multi_scale(&self, _gray: &GrayImage, _params: &ScanParams) -> Result<Vec<Detection>> {
            Err(ServiceError::Detection("scan exploded".to_string()))
        }
    }

    /// Records the grayscale frame it was given.
    struct Recorder(parking_lot::Mutex<Option<GrayImage>>);

    impl PeopleClassifier for Recorder {
        fn name(&self) -> &str {
            "recorder"
        }

        fn detect_multi_scale(&self, gray: &GrayImage, _params: &ScanParams) -> Result<Vec<Detection>> {
            *self.0.lock() = Some(gray.clone());
            Ok(Vec::new())
        }
    }

    fn room() -> RgbImage {
        RgbImage::from_fn(160, 240, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 128]))
    }

    #[test]
    fn no_hits_returns_identical_copy() {
        let detector = PersonDetector::new(Box::new(Fixed(Vec::new())));
        let image = room();

        let outcome = detector.detect(&image);
        assert!(!outcome.has_person());
        assert!(matches!(outcome, ScanOutcome::NotFound { .. }));
        assert_eq!(outcome.image(), &image);
    }

    #[test]
    fn hits_return_annotated_copy() {
        let bbox = BoundingBox::new(30, 60, 64, 128);
        let detector = PersonDetector::new(Box::new(Fixed(vec![Detection { bbox, weight: 1.3 }])));
        let image = room();
        let before = image.clone();

        let outcome = detector.detect(&image);
        assert!(outcome.has_person());
        assert_eq!(outcome.detections().len(), 1);
        assert_ne!(outcome.image(), &image);
        assert_eq!(image, before);

        let ((x0, y0), _) = annotate::shrunk_corners(&bbox, detector.params());
        assert_eq!(*outcome.image().get_pixel(x0 as u32, y0 as u32), annotate::BOX_COLOR);
    }

    #[test]
    fn classifier_errors_become_negative_verdict() {
        let detector = PersonDetector::new(Box::new(Broken));
        let image = room();

        let outcome = detector.detect(&image);
        assert!(!outcome.has_person());
        match &outcome {
            ScanOutcome::Failed { reason, .. } => assert!(reason.contains("scan exploded")),
            _ => panic!("expected a failed scan"),
        }
        assert_eq!(outcome.into_image(), image);
    }

    #[test]
    fn classifier_sees_grayscale_of_input() {
        let recorder = std::sync::Arc::new(Recorder(parking_lot::Mutex::new(None)));

        struct Shared(std::sync::Arc<Recorder>);
        impl PeopleClassifier for Shared {
            fn name(&self) -> &str {
                self.0.name()
            }
            fn detect_multi_scale(&self, gray: &GrayImage, params: &ScanParams) -> Result<Vec<Detection>> {
                self.0.detect_multi_scale(gray, params)
            }
        }

        let detector = PersonDetector::new(Box::new(Shared(recorder.clone())));
        let image = room();
        detector.detect(&image);

        let seen = recorder.0.lock().clone().expect("classifier was not called");
        assert_eq!(seen.dimensions(), image.dimensions());
        assert_eq!(seen, annotate::to_grayscale(&image));
    }
}
