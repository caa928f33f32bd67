//! Image provider trait.

use crate::error::Result;
use crate::image::resource::ImageResource;
use crate::image::types::GenerationRequest;
use async_trait::async_trait;

/// Trait for image generation backends.
///
/// One call to [`generate`](ImageProvider::generate) issues exactly one remote
/// request. Implementations never retry; a retry is a new call by the caller.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Generates an image from the given request.
    ///
    /// The caller guarantees `request.prompt` is non-empty after trimming.
    async fn generate(&self, request: &GenerationRequest) -> Result<ImageResource>;

    /// Returns the name of this provider for display.
    fn name(&self) -> &str;

    /// Checks if the provider is reachable and authenticated.
    async fn health_check(&self) -> Result<()>;
}
