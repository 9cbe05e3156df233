use crate::{
    constants::{SUBSCRIPTION_KEY_HEADER, VISUAL_FEATURES},
    errors::TagError,
    providers::vision::VisionProvider,
    types::VisionResult,
};
use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client as ReqwestClient};
use serde_json::Value;
use std::fmt;
use tracing::{debug, info};

/// A provider for the Azure Computer Vision `analyze` operation.
#[derive(Clone)]
pub struct AzureVisionProvider {
    client: ReqwestClient,
    api_url: String,
    api_key: String,
}

impl fmt::Debug for AzureVisionProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AzureVisionProvider")
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}

impl AzureVisionProvider {
    /// Creates a new `AzureVisionProvider`.
    pub fn new(api_url: String, api_key: String) -> Result<Self, TagError> {
        if api_key.trim().is_empty() {
            return Err(TagError::MissingApiKey);
        }
        let client = ReqwestClient::builder()
            .build()
            .map_err(TagError::ReqwestClientBuild)?;
        Ok(Self {
            client,
            api_url,
            api_key,
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

#[async_trait]
impl VisionProvider for AzureVisionProvider {
    /// Uploads the image as an octet stream and decodes the analysis.
    async fn analyze(&self, image: &[u8]) -> Result<VisionResult, TagError> {
        info!(
            "Uploading to vision API (length: {} bytes)",
            image.len()
        );

        let response = self
            .client
            .post(&self.api_url)
            .query(&[("visualFeatures", VISUAL_FEATURES)])
            .header(CONTENT_TYPE, "application/octet-stream")
            .header(SUBSCRIPTION_KEY_HEADER, &self.api_key)
            .body(image.to_vec())
            .send()
            .await
            .map_err(TagError::VisionRequest)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TagError::VisionApi {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(TagError::VisionDeserialization)?;
        // Valid JSON with entries of the wrong shape is a malformed analysis, not a transport failure.
        let result: VisionResult = serde_json::from_value(body)
            .map_err(|e| TagError::MalformedResult(e.to_string()))?;
        debug!("<-- Vision result: {:?}", result);

        Ok(result)
    }
}
