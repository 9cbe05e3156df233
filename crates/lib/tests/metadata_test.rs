//! # Metadata Document Tests

use autotag::{MetadataDocument, PropertyValue};

const NS: &str = "http://purl.org/dc/elements/1.1/";

#[test]
fn test_set_and_delete_scalar() {
    let mut doc = MetadataDocument::new();
    doc.set_property(NS, "description", "first");
    doc.set_property(NS, "description", "second");

    assert_eq!(doc.text(NS, "description"), Some("second"));
    assert_eq!(
        doc.delete_property(NS, "description"),
        Some(PropertyValue::Text("second".to_string()))
    );
    assert!(doc.is_empty());
    assert_eq!(doc.delete_property(NS, "description"), None);
}

#[test]
fn test_ensure_array_item_is_append_if_absent() {
    let mut doc = MetadataDocument::new();

    assert!(doc.ensure_array_item(NS, "subject", "cat"));
    assert!(doc.ensure_array_item(NS, "subject", "dog"));
    assert!(!doc.ensure_array_item(NS, "subject", "cat"));
    // Membership is an exact string match.
    assert!(doc.ensure_array_item(NS, "subject", "Cat"));

    assert_eq!(doc.array_items(NS, "subject"), ["cat", "dog", "Cat"]);
    assert!(doc.does_array_item_exist(NS, "subject", "dog"));
    assert!(!doc.does_array_item_exist(NS, "subject", "bird"));
}

#[test]
fn test_namespaces_are_distinct() {
    let mut doc = MetadataDocument::new();
    doc.append_array_item(NS, "subject", "cat");
    doc.append_array_item("http://example.com/other/", "subject", "dog");

    assert_eq!(doc.array_items(NS, "subject"), ["cat"]);
    assert_eq!(doc.len(), 2);
}

#[test]
fn test_append_to_scalar_promotes_to_list() {
    let mut doc = MetadataDocument::new();
    doc.set_property(NS, "subject", "legacy");

    doc.append_array_item(NS, "subject", "cat");

    assert_eq!(doc.array_items(NS, "subject"), ["legacy", "cat"]);
    assert_eq!(doc.text(NS, "subject"), None);
}

#[test]
fn test_array_items_of_missing_property_is_empty() {
    let doc = MetadataDocument::new();
    assert!(doc.array_items(NS, "subject").is_empty());
    assert!(!doc.does_array_item_exist(NS, "subject", "cat"));
}

#[test]
fn test_scalar_reads_as_single_item_list() {
    let mut doc = MetadataDocument::new();
    doc.set_property(NS, "subject", "cat");

    assert_eq!(doc.array_items(NS, "subject"), ["cat"]);
    assert!(doc.does_array_item_exist(NS, "subject", "cat"));
    assert!(!doc.ensure_array_item(NS, "subject", "cat"));
    assert_eq!(doc.text(NS, "subject"), Some("cat"), "a present item leaves the scalar alone");

    assert!(doc.ensure_array_item(NS, "subject", "mat"));
    assert_eq!(doc.array_items(NS, "subject"), ["cat", "mat"]);
}
