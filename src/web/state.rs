use crate::models::PersonDetector;
use crate::notify::TelegramNotifier;
use crate::{Config, Result};
use std::sync::Arc;

/// Read-only collaborators shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub detector: Arc<PersonDetector>,
    pub notifier: Arc<TelegramNotifier>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let detector = PersonDetector::from_config(&config)?;
        let notifier = TelegramNotifier::new(&config.telegram);
        Ok(Self::from_parts(config, detector, notifier))
    }

    pub fn from_parts(config: Config, detector: PersonDetector, notifier: TelegramNotifier) -> Self {
        Self {
            config: Arc::new(config),
            detector: Arc::new(detector),
            notifier: Arc::new(notifier),
        }
    }
}
