//! # autotag
//!
//! This crate writes computer-vision analysis results (caption, categories and
//! tags) into an image's embedded metadata. A field is only written when the
//! service's confidence reaches the configured threshold, and list properties
//! never receive duplicate entries.
//!
//! The vision service and the metadata container are reached through the
//! [`providers::vision::VisionProvider`] and [`providers::metadata::MetadataStore`]
//! traits; the [`tagger::Tagger`] ties them together for a batch of files.

pub mod constants;
pub mod errors;
pub mod metadata;
pub mod providers;
pub mod reconcile;
pub mod tagger;
pub mod types;
pub mod upload;

pub use errors::TagError;
pub use metadata::{MetadataDocument, MetadataField, MetadataFields, PropertyValue};
pub use reconcile::{reconcile, ReconcileOutcome, Reconciler};
pub use tagger::{BatchReport, FileReport, Tagger, TaggerBuilder};
pub use types::{
    Caption, Category, ConfidencePolicy, Description, ReconciliationMode, Tag, VisionResult,
};
