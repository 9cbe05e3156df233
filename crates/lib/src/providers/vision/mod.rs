pub mod azure;

use crate::{errors::TagError, types::VisionResult};
use async_trait::async_trait;
use dyn_clone::DynClone;
use std::fmt::Debug;

/// A trait for interacting with an image-analysis service.
///
/// Implementations upload an encoded image and return the service's caption,
/// categories and tags. They perform no retries.
#[async_trait]
pub trait VisionProvider: Send + Sync + Debug + DynClone {
    /// Analyzes an encoded (JPEG) image.
    async fn analyze(&self, image: &[u8]) -> Result<VisionResult, TagError>;
}

dyn_clone::clone_trait_object!(VisionProvider);
