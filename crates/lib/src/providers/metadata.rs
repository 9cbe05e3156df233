//! # Metadata Containers
//!
//! Traits for the component that loads a [`MetadataDocument`] out of an image
//! file and writes it back. Implementations live in plugin crates (e.g.
//! `autotag-xmp`) so the core library stays free of native dependencies.

use crate::{errors::TagError, metadata::MetadataDocument};
use dyn_clone::DynClone;
use std::fmt::Debug;
use std::path::Path;

/// Opens image files for metadata access.
pub trait MetadataStore: Send + Sync + Debug + DynClone {
    /// Opens `path` for update. Only one handle per file should be open at a time.
    fn open(&self, path: &Path) -> Result<Box<dyn MetadataFile>, TagError>;
}

dyn_clone::clone_trait_object!(MetadataStore);

/// An open image file whose metadata can be read and replaced.
pub trait MetadataFile {
    /// Reads the current metadata block.
    fn read(&mut self) -> Result<MetadataDocument, TagError>;

    /// Whether `doc` can be written back into this file.
    fn can_write(&self, doc: &MetadataDocument) -> bool;

    /// Writes `doc` into the file.
    fn write(&mut self, doc: &MetadataDocument) -> Result<(), TagError>;

    /// Flushes and releases the file. Further calls are invalid.
    fn close(&mut self);
}
