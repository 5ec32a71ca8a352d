//! Base provider trait for vision question answering

use crate::attachment::AttachedImage;
use crate::error::Result;
use async_trait::async_trait;

/// Capability that answers a question about an image
///
/// Implementations wrap a hosted or local vision model. The call is opaque
/// to the rest of the crate: it either yields answer text or fails. No
/// retry happens at this layer.
///
/// # Examples
///
/// ```no_run
/// use saanra::attachment::AttachedImage;
/// use saanra::error::Result;
/// use saanra::providers::VisionProvider;
/// use async_trait::async_trait;
///
/// struct EchoProvider;
///
/// #[async_trait]
/// impl VisionProvider for EchoProvider {
///     fn name(&self) -> &str {
///         "echo"
///     }
///
///     async fn describe(&self, _image: &AttachedImage, prompt: &str) -> Result<String> {
///         Ok(format!("You asked: {}", prompt))
///     }
/// }
/// ```
#[async_trait]
pub trait VisionProvider: Send + Sync {
    /// Short provider name used in logs and status output
    fn name(&self) -> &str;

    /// Answer `prompt` about `image`
    ///
    /// # Errors
    ///
    /// Returns error if the API call fails or the response carries no text
    async fn describe(&self, image: &AttachedImage, prompt: &str) -> Result<String>;
}
