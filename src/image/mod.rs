pub mod annotate;
pub mod loader;

pub use loader::ImageLoader;
