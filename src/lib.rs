pub mod config;
pub mod image;
pub mod models;
pub mod notify;
pub mod utils;
pub mod web;

pub use config::Config;
pub use models::{PersonDetector, ScanOutcome};
pub use notify::{Delivery, TelegramNotifier};
pub use utils::error::ServiceError;

pub type Result<T> = std::result::Result<T, ServiceError>;
