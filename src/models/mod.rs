pub mod classifier;
pub mod detector;
#[cfg(feature = "opencv")]
pub mod hog;
pub mod types;

pub use classifier::PeopleClassifier;
pub use detector::{PersonDetector, ScanOutcome};
#[cfg(feature = "opencv")]
pub use hog::HogPeopleClassifier;
pub use types::{BoundingBox, Detection, ScanParams};
