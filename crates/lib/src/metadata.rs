//! # Metadata Document
//!
//! An in-memory, namespaced key/value view of an image's embedded metadata.
//! Properties are addressed by `(namespace URI, property name)` and hold either
//! a single text value or an ordered list of strings.

use crate::constants::{NS_DC, NS_PHOTOSHOP};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identifies a property inside a metadata document.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PropertyKey {
    pub namespace: String,
    pub name: String,
}

impl PropertyKey {
    pub fn new(namespace: &str, name: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyValue {
    Text(String),
    List(Vec<String>),
}

/// A mutable metadata block opened from a file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataDocument {
    properties: BTreeMap<PropertyKey, PropertyValue>,
}

impl MetadataDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PropertyKey, &PropertyValue)> {
        self.properties.iter()
    }

    pub fn property(&self, namespace: &str, name: &str) -> Option<&PropertyValue> {
        self.properties.get(&PropertyKey::new(namespace, name))
    }

    /// Returns the value of a scalar property. Lists yield `None`.
    pub fn text(&self, namespace: &str, name: &str) -> Option<&str> {
        match self.property(namespace, name) {
            Some(PropertyValue::Text(value)) => Some(value),
            _ => None,
        }
    }

    /// Sets a scalar property, overwriting whatever was stored under the key.
    pub fn set_property(&mut self, namespace: &str, name: &str, value: impl Into<String>) {
        self.properties.insert(
            PropertyKey::new(namespace, name),
            PropertyValue::Text(value.into()),
        );
    }

    pub fn delete_property(&mut self, namespace: &str, name: &str) -> Option<PropertyValue> {
        self.properties.remove(&PropertyKey::new(namespace, name))
    }

    /// Items of a list property. A scalar reads as a one-item list, an absent property as empty.
    pub fn array_items(&self, namespace: &str, name: &str) -> &[String] {
        match self.property(namespace, name) {
            Some(PropertyValue::List(items)) => items,
            Some(PropertyValue::Text(value)) => std::slice::from_ref(value),
            None => &[],
        }
    }

    /// Exact string membership test on a list property.
    pub fn does_array_item_exist(&self, namespace: &str, name: &str, item: &str) -> bool {
        self.array_items(namespace, name).iter().any(|i| i == item)
    }

    /// Appends an item to a list property, creating the list if needed.
    ///
    /// A scalar value already stored under the key becomes the first list item.
    pub fn append_array_item(&mut self, namespace: &str, name: &str, item: impl Into<String>) {
        let entry = self
            .properties
            .entry(PropertyKey::new(namespace, name))
            .or_insert_with(|| PropertyValue::List(Vec::new()));
        match entry {
            PropertyValue::List(items) => items.push(item.into()),
            PropertyValue::Text(existing) => {
                let first = std::mem::take(existing);
                *entry = PropertyValue::List(vec![first, item.into()]);
            }
        }
    }

    /// Appends `item` unless the list already contains it. Returns `true` if appended.
    pub fn ensure_array_item(&mut self, namespace: &str, name: &str, item: &str) -> bool {
        if self.does_array_item_exist(namespace, name, item) {
            return false;
        }
        self.append_array_item(namespace, name, item);
        true
    }

    /// Replaces a list property wholesale.
    pub fn set_array(&mut self, namespace: &str, name: &str, items: Vec<String>) {
        self.properties
            .insert(PropertyKey::new(namespace, name), PropertyValue::List(items));
    }
}

// --- Field mapping ---

/// Where one kind of output is stored: namespace URI, preferred prefix and property name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataField {
    pub namespace: String,
    pub prefix: String,
    pub name: String,
}

impl MetadataField {
    pub fn new(namespace: &str, prefix: &str, name: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            prefix: prefix.to_string(),
            name: name.to_string(),
        }
    }
}

/// The properties receiving the caption, the categories and the tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataFields {
    pub description: MetadataField,
    pub category: MetadataField,
    pub tag: MetadataField,
}

impl MetadataFields {
    /// The three target fields, in reconciliation order.
    pub fn all(&self) -> [&MetadataField; 3] {
        [&self.description, &self.category, &self.tag]
    }
}

impl Default for MetadataFields {
    fn default() -> Self {
        Self {
            description: MetadataField::new(NS_DC, "dc", "description"),
            category: MetadataField::new(NS_PHOTOSHOP, "photoshop", "SupplementalCategories"),
            tag: MetadataField::new(NS_DC, "dc", "subject"),
        }
    }
}
