//! # Metadata Reconciliation
//!
//! Decides which caption, categories and tags from a vision result are written
//! into a metadata document, gated by per-field confidence thresholds.
//!
//! Rules run in a fixed order and are independent of each other:
//! 1. caption: replaces the description outright,
//! 2. categories: merged according to the [`ReconciliationMode`],
//! 3. tags: appended if absent, never removed.

use crate::{
    errors::TagError,
    metadata::{MetadataDocument, MetadataFields},
    types::{Caption, Category, ConfidencePolicy, ReconciliationMode, Tag, VisionResult},
};
use tracing::{debug, info};

/// What a single reconciliation changed in the document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileOutcome {
    /// The caption written to the description property, if any.
    pub caption: Option<String>,
    /// Categories newly added to the category list.
    pub categories_added: Vec<String>,
    /// Categories dropped by a `replace-top` reconciliation.
    pub categories_removed: Vec<String>,
    /// Tags newly added to the tag list.
    pub tags_added: Vec<String>,
}

impl ReconcileOutcome {
    /// `true` if the document was not modified.
    pub fn is_unchanged(&self) -> bool {
        self.caption.is_none()
            && self.categories_added.is_empty()
            && self.categories_removed.is_empty()
            && self.tags_added.is_empty()
    }
}

/// A validated reconciliation policy bound to a set of target fields.
#[derive(Debug, Clone)]
pub struct Reconciler {
    policy: ConfidencePolicy,
    mode: ReconciliationMode,
    fields: MetadataFields,
}

impl Reconciler {
    /// Creates a reconciler, rejecting thresholds outside `[0, 1]`.
    pub fn new(
        policy: ConfidencePolicy,
        mode: ReconciliationMode,
        fields: MetadataFields,
    ) -> Result<Self, TagError> {
        policy.validate()?;
        Ok(Self {
            policy,
            mode,
            fields,
        })
    }

    pub fn policy(&self) -> &ConfidencePolicy {
        &self.policy
    }

    pub fn mode(&self) -> ReconciliationMode {
        self.mode
    }

    pub fn fields(&self) -> &MetadataFields {
        &self.fields
    }

    /// Applies `result` to `doc`.
    ///
    /// The result is checked for completeness before anything is touched, so a
    /// `MalformedResult` error leaves the document exactly as it was.
    pub fn reconcile(
        &self,
        doc: &mut MetadataDocument,
        result: &VisionResult,
    ) -> Result<ReconcileOutcome, TagError> {
        let caption = result.primary_caption()?;
        let categories = result.categories()?;
        let tags = result.tags()?;

        let mut outcome = ReconcileOutcome::default();
        self.apply_caption(doc, caption, &mut outcome);
        match self.mode {
            ReconciliationMode::AppendAll => self.append_categories(doc, categories, &mut outcome),
            ReconciliationMode::ReplaceTop => self.replace_top_category(doc, categories, &mut outcome),
        }
        self.append_tags(doc, tags, &mut outcome);
        Ok(outcome)
    }

    fn apply_caption(&self, doc: &mut MetadataDocument, caption: &Caption, outcome: &mut ReconcileOutcome) {
        if caption.confidence < self.policy.caption {
            debug!(
                "Skipping caption '{}' (confidence: {:.2} < {:.2})",
                caption.text, caption.confidence, self.policy.caption
            );
            return;
        }
        let field = &self.fields.description;
        doc.delete_property(&field.namespace, &field.name);
        doc.set_property(&field.namespace, &field.name, caption.text.as_str());
        info!(
            "Set caption '{}' (confidence: {:.2} >= {:.2})",
            caption.text, caption.confidence, self.policy.caption
        );
        outcome.caption = Some(caption.text.clone());
    }

    fn append_categories(
        &self,
        doc: &mut MetadataDocument,
        categories: &[Category],
        outcome: &mut ReconcileOutcome,
    ) {
        let field = &self.fields.category;
        for category in categories.iter().filter(|c| c.score >= self.policy.category) {
            if doc.ensure_array_item(&field.namespace, &field.name, &category.name) {
                info!(
                    "Appended category '{}' (confidence: {:.2} >= {:.2})",
                    category.name, category.score, self.policy.category
                );
                outcome.categories_added.push(category.name.clone());
            }
        }
    }

    fn replace_top_category(
        &self,
        doc: &mut MetadataDocument,
        categories: &[Category],
        outcome: &mut ReconcileOutcome,
    ) {
        let Some(top) = top_category(categories, self.policy.category) else {
            debug!("No category reached {:.2}; category list left untouched", self.policy.category);
            return;
        };
        let field = &self.fields.category;
        let previous = doc.array_items(&field.namespace, &field.name).to_vec();
        if previous.len() == 1 && previous[0] == top.name {
            return;
        }

        doc.delete_property(&field.namespace, &field.name);
        doc.set_array(&field.namespace, &field.name, vec![top.name.clone()]);
        info!(
            "Replaced categories with '{}' (confidence: {:.2} >= {:.2})",
            top.name, top.score, self.policy.category
        );

        outcome.categories_removed = previous.iter().filter(|p| **p != top.name).cloned().collect();
        if !previous.contains(&top.name) {
            outcome.categories_added.push(top.name.clone());
        }
    }

    fn append_tags(&self, doc: &mut MetadataDocument, tags: &[Tag], outcome: &mut ReconcileOutcome) {
        let field = &self.fields.tag;
        for tag in tags {
            if tag.confidence < self.policy.tag {
                continue;
            }
            if doc.ensure_array_item(&field.namespace, &field.name, &tag.name) {
                info!(
                    "Appended tag '{}' (confidence: {:.2} >= {:.2})",
                    tag.name, tag.confidence, self.policy.tag
                );
                outcome.tags_added.push(tag.name.clone());
            }
        }
    }
}

/// The highest-scoring category at or above `threshold`; the earliest wins ties.
fn top_category(categories: &[Category], threshold: f64) -> Option<&Category> {
    categories
        .iter()
        .filter(|c| c.score >= threshold)
        .fold(None, |best: Option<&Category>, c| match best {
            Some(b) if b.score >= c.score => Some(b),
            _ => Some(c),
        })
}

/// Reconciles `result` into `doc` using the default field mapping.
///
/// Convenience wrapper around [`Reconciler`] for one-off calls.
pub fn reconcile(
    doc: &mut MetadataDocument,
    result: &VisionResult,
    policy: &ConfidencePolicy,
    mode: ReconciliationMode,
) -> Result<ReconcileOutcome, TagError> {
    Reconciler::new(*policy, mode, MetadataFields::default())?.reconcile(doc, result)
}
