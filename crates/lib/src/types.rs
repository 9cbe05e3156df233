use crate::constants::{DEFAULT_CAPTION_THRESHOLD, DEFAULT_CATEGORY_THRESHOLD, DEFAULT_TAG_THRESHOLD};
use crate::errors::TagError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// --- Vision analysis result ---

/// A generated caption and the service's confidence in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Caption {
    pub text: String,
    pub confidence: f64,
}

/// A taxonomy category and its score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub score: f64,
}

/// A content tag and the service's confidence in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Description {
    #[serde(default)]
    pub captions: Vec<Caption>,
}

/// The structured output of the vision `analyze` operation.
///
/// Every section is optional on the wire. Absence is not an error at decode
/// time; the accessors below turn it into `TagError::MalformedResult` so that
/// a single bad response only skips the file it belongs to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisionResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Description>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<Category>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Tag>>,
}

impl VisionResult {
    /// Builds a complete result with a single caption.
    pub fn new(caption: Caption, categories: Vec<Category>, tags: Vec<Tag>) -> Self {
        Self {
            description: Some(Description {
                captions: vec![caption],
            }),
            categories: Some(categories),
            tags: Some(tags),
        }
    }

    /// The first caption in the description, which the service ranks highest.
    pub fn primary_caption(&self) -> Result<&Caption, TagError> {
        self.description
            .as_ref()
            .ok_or_else(|| TagError::MalformedResult("missing 'description' section".to_string()))?
            .captions
            .first()
            .ok_or_else(|| TagError::MalformedResult("'description.captions' is empty".to_string()))
    }

    pub fn categories(&self) -> Result<&[Category], TagError> {
        self.categories
            .as_deref()
            .ok_or_else(|| TagError::MalformedResult("missing 'categories' section".to_string()))
    }

    pub fn tags(&self) -> Result<&[Tag], TagError> {
        self.tags
            .as_deref()
            .ok_or_else(|| TagError::MalformedResult("missing 'tags' section".to_string()))
    }
}

// --- Reconciliation policy ---

/// Minimum confidence each kind of field needs before it is written.
///
/// All three thresholds must lie in `[0, 1]`; use [`ConfidencePolicy::new`] or
/// [`ConfidencePolicy::validate`] to enforce that.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidencePolicy {
    pub caption: f64,
    pub category: f64,
    pub tag: f64,
}

impl Default for ConfidencePolicy {
    fn default() -> Self {
        Self {
            caption: DEFAULT_CAPTION_THRESHOLD,
            category: DEFAULT_CATEGORY_THRESHOLD,
            tag: DEFAULT_TAG_THRESHOLD,
        }
    }
}

impl ConfidencePolicy {
    /// Creates a validated policy.
    pub fn new(caption: f64, category: f64, tag: f64) -> Result<Self, TagError> {
        let policy = Self {
            caption,
            category,
            tag,
        };
        policy.validate()?;
        Ok(policy)
    }

    /// Checks that every threshold lies in `[0, 1]`. NaN is rejected.
    pub fn validate(&self) -> Result<(), TagError> {
        check_threshold("caption", self.caption)?;
        check_threshold("category", self.category)?;
        check_threshold("tag", self.tag)?;
        Ok(())
    }
}

/// Validates a single confidence threshold, returning it unchanged when valid.
pub fn check_threshold(name: &str, value: f64) -> Result<f64, TagError> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(TagError::InvalidPolicy(format!(
            "{name} threshold {value} is outside [0, 1]"
        )))
    }
}

/// How qualifying categories are merged into the existing category list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReconciliationMode {
    /// Replace the whole list with the single highest-scoring qualifying category.
    ReplaceTop,
    /// Append every qualifying category that is not already present.
    #[default]
    AppendAll,
}

impl ReconciliationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReconciliationMode::ReplaceTop => "replace-top",
            ReconciliationMode::AppendAll => "append-all",
        }
    }
}

impl fmt::Display for ReconciliationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReconciliationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "replace-top" => Ok(ReconciliationMode::ReplaceTop),
            "append-all" => Ok(ReconciliationMode::AppendAll),
            other => Err(format!(
                "unknown reconciliation mode '{other}' (expected 'replace-top' or 'append-all')"
            )),
        }
    }
}
