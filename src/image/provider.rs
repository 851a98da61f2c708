//! Image provider trait.

use crate::error::Result;
use crate::image::types::{GeneratedImage, GenerationRequest};
use async_trait::async_trait;

/// Boundary with the generative image service.
///
/// One call is one request: implementations never retry on their own.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Produces a single image for the request, editing `input_image` when
    /// one is attached.
    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedImage>;

    /// Returns the name of this provider for display.
    fn name(&self) -> &str;

    /// Checks if the provider is reachable and authenticated.
    async fn health_check(&self) -> Result<()>;
}
