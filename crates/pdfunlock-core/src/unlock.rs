//! PDF Unlock algorithm
//!
//! Rebuilds a document page by page so that no encryption dictionary or
//! permission flags survive into the output.

use crate::error::UnlockError;
use crate::metrics::{EncryptionStatus, UnlockMetrics, UnlockOutcome};
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::HashSet;
use std::time::Instant;
use tracing::{debug, warn};

/// Page attributes a page may inherit from its ancestors in the page tree
const INHERITABLE_ATTRIBUTES: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Remove encryption and permission restrictions from a PDF
///
/// The algorithm:
/// 1. Parse the source, ignoring its encryption dictionary (no password is asked for)
/// 2. Collect the page object ids in page-tree order
/// 3. Create a new, empty destination document
/// 4. Copy every page and the objects it depends on, in order
/// 5. Compress and serialize the destination without encryption
pub fn unlock_document(bytes: &[u8]) -> Result<UnlockOutcome, UnlockError> {
    let started = Instant::now();

    let mut source =
        Document::load_mem(bytes).map_err(|e| UnlockError::ParseError(e.to_string()))?;

    let encryption = remove_encryption(&mut source);

    let page_ids: Vec<ObjectId> = source.get_pages().into_values().collect();
    if page_ids.is_empty() {
        return Err(UnlockError::NoPages);
    }

    let mut dest = copy_pages(&source, &page_ids)?;
    dest.compress();

    let mut buffer = Vec::new();
    dest.save_to(&mut buffer)
        .map_err(|e| UnlockError::SerializationError(format!("Failed to save PDF: {}", e)))?;

    let metrics = UnlockMetrics {
        input_size_bytes: bytes.len(),
        output_size_bytes: buffer.len(),
        page_count: page_ids.len() as u32,
        processing_time_ms: started.elapsed().as_millis() as u64,
        encryption,
    };
    debug!(?metrics, "Unlocked document");

    Ok(UnlockOutcome {
        bytes: buffer,
        metrics,
    })
}

/// Get rid of the source's encryption so its objects can be copied
///
/// Documents restricted only by an owner password open with the empty user
/// password. Anything else keeps its objects untouched and just loses the
/// encryption dictionary.
fn remove_encryption(doc: &mut Document) -> EncryptionStatus {
    if !doc.is_encrypted() {
        return EncryptionStatus::Unencrypted;
    }

    match doc.decrypt("") {
        Ok(()) => EncryptionStatus::Decrypted,
        Err(e) => {
            warn!("Empty-password decryption failed, ignoring encryption: {}", e);
            doc.trailer.remove(b"Encrypt");
            EncryptionStatus::Stripped
        }
    }
}

/// Build a fresh document holding copies of `page_ids` in the given order
///
/// Object ids are kept from the source; only the new page tree root and
/// catalog get fresh ids above the source's `max_id`.
fn copy_pages(source: &Document, page_ids: &[ObjectId]) -> Result<Document, UnlockError> {
    let mut dest = Document::with_version(source.version.clone());
    dest.max_id = source.max_id;
    let pages_id = dest.new_object_id();

    let mut copied: HashSet<ObjectId> = page_ids.iter().copied().collect();
    let mut pending = Vec::new();

    for &page_id in page_ids {
        let mut page = source
            .get_dictionary(page_id)
            .map_err(|e| {
                UnlockError::OperationError(format!("Page object {:?} is invalid: {}", page_id, e))
            })?
            .clone();

        for key in INHERITABLE_ATTRIBUTES {
            if page.has(key) {
                continue;
            }
            if let Some(value) = inherited_attribute(source, &page, key) {
                page.set(key.to_vec(), value);
            }
        }

        page.set("Parent", Object::Reference(pages_id));
        for (key, value) in page.iter() {
            if key.as_slice() != b"Parent" {
                collect_references(value, &mut pending);
            }
        }

        dest.objects.insert(page_id, Object::Dictionary(page));
    }

    while let Some(id) = pending.pop() {
        if !copied.insert(id) {
            continue;
        }

        let object = match source.get_object(id) {
            Ok(object) => object,
            Err(_) => {
                // Dangling references read as null
                debug!("Skipping missing object {:?}", id);
                continue;
            }
        };

        if is_page_tree_object(object) {
            continue;
        }

        collect_references(object, &mut pending);
        dest.objects.insert(id, object.clone());
    }

    let kids = page_ids
        .iter()
        .map(|&id| Object::Reference(id))
        .collect::<Vec<_>>();
    let pages = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Count", Object::Integer(page_ids.len() as i64)),
        ("Kids", Object::Array(kids)),
    ]);
    dest.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]);
    let catalog_id = dest.add_object(catalog);
    dest.trailer.set("Root", Object::Reference(catalog_id));

    Ok(dest)
}

/// Walk up the source page tree looking for an inherited attribute
fn inherited_attribute(doc: &Document, page: &Dictionary, key: &[u8]) -> Option<Object> {
    let mut visited = HashSet::new();
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();

    while let Some(id) = parent {
        if !visited.insert(id) {
            break;
        }
        let node = doc.get_dictionary(id).ok()?;
        if let Ok(value) = node.get(key) {
            return Some(value.clone());
        }
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }

    None
}

/// Catalog, page tree nodes and pages outside the copied set stay behind
fn is_page_tree_object(object: &Object) -> bool {
    let Ok(dict) = object.as_dict() else {
        return false;
    };
    matches!(
        dict.get(b"Type").and_then(Object::as_name),
        Ok(b"Catalog") | Ok(b"Pages") | Ok(b"Page")
    )
}

/// Push every object id referenced (directly or nested) by `obj`
fn collect_references(obj: &Object, out: &mut Vec<ObjectId>) {
    match obj {
        Object::Reference(id) => out.push(*id),
        Object::Array(arr) => {
            for item in arr {
                collect_references(item, out);
            }
        }
        Object::Dictionary(dict) => {
            for (_, value) in dict.iter() {
                collect_references(value, out);
            }
        }
        Object::Stream(stream) => {
            for (_, value) in stream.dict.iter() {
                collect_references(value, out);
            }
        }
        _ => {}
    }
}
