//! Image generation module.

mod provider;
pub mod providers;
mod resource;
mod types;

pub use provider::ImageProvider;
pub use resource::ImageResource;
pub use types::{AspectRatio, GenerationRequest, ImageFormat};
