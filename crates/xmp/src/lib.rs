//! # `autotag-xmp`: Embedded XMP Container
//!
//! This crate implements the `MetadataStore` trait from the core `autotag`
//! library on top of the Adobe XMP Toolkit. Only the three configured target
//! properties are projected into the `MetadataDocument`; every other property
//! in the file's XMP packet is carried through a write untouched, and arrays
//! already in the file keep their form.

use autotag::{
    constants::NS_DC,
    providers::metadata::{MetadataFile, MetadataStore},
    MetadataDocument, MetadataField, MetadataFields, PropertyValue, TagError,
};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};
use xmp_toolkit::{OpenFileOptions, XmpError, XmpFile, XmpMeta, XmpValue};

/// Custom error types for XMP container access.
#[derive(Error, Debug)]
pub enum XmpStoreError {
    #[error("XMP toolkit error: {0}")]
    Toolkit(#[from] XmpError),
    #[error("Failed to open '{path}' for update: {source}")]
    Open { path: String, source: XmpError },
    #[error("Failed to register namespace '{namespace}' as '{prefix}': {source}")]
    Namespace {
        namespace: String,
        prefix: String,
        source: XmpError,
    },
}

/// A helper to convert the specific `XmpStoreError` into the generic `TagError`.
impl From<XmpStoreError> for TagError {
    fn from(err: XmpStoreError) -> Self {
        TagError::Metadata(err.to_string())
    }
}

/// Opens image files and exposes their embedded XMP.
#[derive(Debug, Clone)]
pub struct XmpStore {
    fields: MetadataFields,
}

impl XmpStore {
    /// Creates a store for the given field mapping, registering any custom namespaces.
    pub fn new(fields: MetadataFields) -> Result<Self, XmpStoreError> {
        for field in fields.all() {
            let registered = XmpMeta::register_namespace(&field.namespace, &field.prefix)
                .map_err(|source| XmpStoreError::Namespace {
                    namespace: field.namespace.clone(),
                    prefix: field.prefix.clone(),
                    source,
                })?;
            if registered.trim_end_matches(':') != field.prefix {
                debug!(
                    "Namespace '{}' already registered with prefix '{}'",
                    field.namespace, registered
                );
            }
        }
        Ok(Self { fields })
    }

    pub fn fields(&self) -> &MetadataFields {
        &self.fields
    }
}

impl MetadataStore for XmpStore {
    fn open(&self, path: &Path) -> Result<Box<dyn MetadataFile>, TagError> {
        let mut file = XmpFile::new().map_err(XmpStoreError::from)?;
        file.open_file(path, OpenFileOptions::default().for_update())
            .map_err(|source| XmpStoreError::Open {
                path: path.display().to_string(),
                source,
            })?;
        let meta = match file.xmp() {
            Some(meta) => meta,
            None => XmpMeta::new().map_err(XmpStoreError::from)?,
        };
        Ok(Box::new(XmpImageFile {
            file,
            meta,
            fields: self.fields.clone(),
            original: MetadataDocument::new(),
            closed: false,
        }))
    }
}

/// An image opened for update.
struct XmpImageFile {
    file: XmpFile,
    meta: XmpMeta,
    fields: MetadataFields,
    /// The document as last read, used to leave unchanged properties alone.
    original: MetadataDocument,
    closed: bool,
}

impl XmpImageFile {
    /// Returns the file's XMP with every changed target property replaced by `doc`'s value.
    fn merged(&self, doc: &MetadataDocument) -> Result<XmpMeta, XmpStoreError> {
        let mut meta = self.meta.clone();
        for field in self.fields.all() {
            let value = doc.property(&field.namespace, &field.name);
            let original = self.original.property(&field.namespace, &field.name);
            if value != original {
                apply_field(&mut meta, field, original, value)?;
            }
        }
        Ok(meta)
    }
}

impl MetadataFile for XmpImageFile {
    fn read(&mut self) -> Result<MetadataDocument, TagError> {
        let mut doc = MetadataDocument::new();
        for field in self.fields.all() {
            read_field(&self.meta, field, &mut doc);
        }
        self.original = doc.clone();
        Ok(doc)
    }

    fn can_write(&self, doc: &MetadataDocument) -> bool {
        match self.merged(doc) {
            Ok(meta) => self.file.can_put_xmp(&meta),
            Err(e) => {
                warn!("Cannot apply metadata: {}", e);
                false
            }
        }
    }

    fn write(&mut self, doc: &MetadataDocument) -> Result<(), TagError> {
        let meta = self.merged(doc)?;
        self.file.put_xmp(&meta).map_err(XmpStoreError::from)?;
        self.meta = meta;
        self.original = doc.clone();
        Ok(())
    }

    fn close(&mut self) {
        if !self.closed {
            self.file.close();
            self.closed = true;
        }
    }
}

impl Drop for XmpImageFile {
    fn drop(&mut self) {
        self.close();
    }
}

/// Copies one XMP property into `doc`.
///
/// Language alternatives collapse to their `x-default` text, other arrays become lists.
fn read_field(meta: &XmpMeta, field: &MetadataField, doc: &mut MetadataDocument) {
    let Some(value) = meta.property(&field.namespace, &field.name) else {
        return;
    };
    if value.is_alternate() {
        if let Some((text, _)) = meta.localized_text(&field.namespace, &field.name, None, "x-default") {
            doc.set_property(&field.namespace, &field.name, text.value);
        }
    } else if value.is_array() {
        let items: Vec<String> = meta
            .property_array(&field.namespace, &field.name)
            .map(|item| item.value)
            .collect();
        doc.set_array(&field.namespace, &field.name, items);
    } else {
        doc.set_property(&field.namespace, &field.name, value.value);
    }
}

/// Writes `value` over a property last read as `original`; `None` deletes it.
///
/// Items appended to an existing array are added in place, so its form is kept
/// (`rdf:Bag` stays a Bag). Any other change rewrites the property, keeping a Bag
/// a Bag and language alternatives as `x-default` text.
fn apply_field(
    meta: &mut XmpMeta,
    field: &MetadataField,
    original: Option<&PropertyValue>,
    value: Option<&PropertyValue>,
) -> Result<(), XmpStoreError> {
    let existing = meta.property(&field.namespace, &field.name);

    if let (Some(current), Some(PropertyValue::List(old)), Some(PropertyValue::List(new))) =
        (&existing, original, value)
    {
        if current.is_array() && !current.is_alternate() && new.starts_with(old) {
            // No array flags: the toolkit appends using the form already in the file.
            let array_name = XmpValue::new(field.name.clone());
            for item in &new[old.len()..] {
                meta.append_array_item(&field.namespace, &array_name, &XmpValue::new(item.clone()))?;
            }
            return Ok(());
        }
    }

    let bag = existing
        .as_ref()
        .is_some_and(|current| current.is_array() && !current.is_ordered());
    let alt_text = existing.as_ref().is_some_and(|current| current.is_alternate())
        || (field.namespace == NS_DC && field.name == "description");

    meta.delete_property(&field.namespace, &field.name)?;
    match value {
        None => {}
        Some(PropertyValue::Text(text)) if alt_text => {
            meta.set_localized_text(&field.namespace, &field.name, None, "x-default", text)?;
        }
        Some(PropertyValue::Text(text)) => {
            meta.set_property(&field.namespace, &field.name, &XmpValue::new(text.clone()))?;
        }
        Some(PropertyValue::List(items)) => {
            let array_name = XmpValue::new(field.name.clone())
                .set_is_array(true)
                .set_is_ordered(!bag);
            for item in items {
                meta.append_array_item(&field.namespace, &array_name, &XmpValue::new(item.clone()))?;
            }
        }
    }
    Ok(())
}
