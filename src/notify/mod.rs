pub mod telegram;

pub use telegram::{Delivery, TelegramNotifier};
