//! # Shared Constants
//!
//! Defaults and fixed values shared by the library, the CLI and the container plugins.

/// The default endpoint of the Computer Vision `analyze` operation.
pub const DEFAULT_VISION_API_URL: &str = "https://api.projectoxford.ai/vision/v1.0/analyze";

/// The visual features requested from the `analyze` operation.
pub const VISUAL_FEATURES: &str = "Categories,Tags,Description";

/// The header carrying the subscription key.
pub const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// Widths at or above this value are rejected by the vision service's resize pipeline.
pub const MAXIMUM_RESIZE_WIDTH: u32 = 10_000;

/// Images wider than this are downscaled before upload unless configured otherwise.
pub const DEFAULT_RESIZE_WIDTH: u32 = 800;

pub const DEFAULT_CAPTION_THRESHOLD: f64 = 0.1;
pub const DEFAULT_TAG_THRESHOLD: f64 = 0.1;
pub const DEFAULT_CATEGORY_THRESHOLD: f64 = 0.0;

/// Dublin Core namespace URI.
pub const NS_DC: &str = "http://purl.org/dc/elements/1.1/";

/// Adobe Photoshop namespace URI.
pub const NS_PHOTOSHOP: &str = "http://ns.adobe.com/photoshop/1.0/";
