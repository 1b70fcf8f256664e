//! Copying pages between documents.
//!
//! Pages are copied out of a source document into a [`PageBatch`]: a small,
//! self-contained object graph with its own numbering. The batch holds no
//! borrow of the source, so the source handle can be dropped before the
//! batch is appended anywhere.

use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

use crate::document::{DocumentHandle, INHERITABLE_ATTRIBUTES};
use crate::error::Result;

/// Pages copied out of a document, with everything they reference.
#[derive(Debug, Clone, Default)]
pub struct PageBatch {
    objects: BTreeMap<ObjectId, Object>,
    pages: Vec<ObjectId>,
    max_id: u32,
}

impl PageBatch {
    /// Number of pages in the batch.
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Whether the batch holds no pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Number of objects (pages included) carried by the batch.
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    fn reserve(&mut self) -> ObjectId {
        self.max_id += 1;
        (self.max_id, 0)
    }
}

/// Recursively copies objects from a source document into a batch,
/// assigning fresh ids and rewriting references as it goes.
struct Importer<'a> {
    source: &'a Document,
    mapped: HashMap<ObjectId, ObjectId>,
    /// Page objects of the source. References to pages outside the copy
    /// (link targets, annotation owners) become null instead of dragging
    /// the other page into the batch.
    source_pages: HashSet<ObjectId>,
}

impl<'a> Importer<'a> {
    fn new(source: &'a Document, source_pages: &[ObjectId]) -> Self {
        Self {
            source,
            mapped: HashMap::new(),
            source_pages: source_pages.iter().copied().collect(),
        }
    }

    fn import(&mut self, obj: &Object, batch: &mut PageBatch) -> Object {
        match obj {
            Object::Reference(id) => self.import_reference(*id, batch),
            Object::Array(items) => {
                Object::Array(items.iter().map(|item| self.import(item, batch)).collect())
            }
            Object::Dictionary(dict) => Object::Dictionary(self.import_dict(dict, batch)),
            Object::Stream(stream) => {
                let mut copy = stream.clone();
                copy.dict = self.import_dict(&stream.dict, batch);
                Object::Stream(copy)
            }
            other => other.clone(),
        }
    }

    fn import_dict(&mut self, dict: &Dictionary, batch: &mut PageBatch) -> Dictionary {
        let mut copy = Dictionary::new();
        for (key, value) in dict.iter() {
            copy.set(key.clone(), self.import(value, batch));
        }
        copy
    }

    fn import_reference(&mut self, id: ObjectId, batch: &mut PageBatch) -> Object {
        if let Some(&new_id) = self.mapped.get(&id) {
            return Object::Reference(new_id);
        }
        if self.source_pages.contains(&id) {
            return Object::Null;
        }

        let Ok(target) = self.source.get_object(id) else {
            // Dangling references read as null
            return Object::Null;
        };

        let new_id = batch.reserve();
        self.mapped.insert(id, new_id);
        let copy = self.import(target, batch);
        batch.objects.insert(new_id, copy);
        Object::Reference(new_id)
    }
}

impl DocumentHandle {
    /// Copy 1-based pages into a detached batch, in the order given.
    ///
    /// Repeated page numbers produce independent copies. Inherited
    /// attributes are flattened onto each copy so it renders the same
    /// outside its original page tree.
    ///
    /// # Errors
    ///
    /// Returns a range error if any page does not exist; nothing is copied
    /// in that case.
    pub fn copy_pages(&self, pages: &[u32]) -> Result<PageBatch> {
        let page_ids = pages
            .iter()
            .map(|&page| self.page_id(page))
            .collect::<Result<Vec<_>>>()?;

        let mut batch = PageBatch::default();
        let mut importer = Importer::new(&self.doc, &self.pages);

        for page_id in page_ids {
            let mut dict = self.page_dict(page_id)?.clone();
            for key in INHERITABLE_ATTRIBUTES {
                if !dict.has(key)
                    && let Some(value) = self.inherited(page_id, key)
                {
                    dict.set(key.to_vec(), value);
                }
            }
            dict.remove(b"Parent");

            // Self references (annotation /P) point at this copy only
            let new_id = batch.reserve();
            importer.mapped.insert(page_id, new_id);
            let copy = importer.import_dict(&dict, &mut batch);
            importer.mapped.remove(&page_id);

            batch.objects.insert(new_id, Object::Dictionary(copy));
            batch.pages.push(new_id);
        }

        debug!(
            source = %self.name,
            pages = batch.len(),
            objects = batch.object_count(),
            "copied pages"
        );
        Ok(batch)
    }

    /// Append a batch of pages after the last page, in batch order.
    pub fn append_pages(&mut self, batch: PageBatch) -> Result<()> {
        let offset = self.doc.max_id;

        for (id, obj) in batch.objects {
            self.doc
                .objects
                .insert(shift_id(id, offset), shift_references(obj, offset));
        }
        self.doc.max_id = offset + batch.max_id;

        let page_ids: Vec<ObjectId> = batch
            .pages
            .into_iter()
            .map(|id| shift_id(id, offset))
            .collect();
        self.attach_pages(&page_ids)?;

        debug!(
            target = %self.name,
            appended = page_ids.len(),
            total = self.page_count(),
            "appended pages"
        );
        Ok(())
    }
}

fn shift_id(id: ObjectId, offset: u32) -> ObjectId {
    (id.0 + offset, id.1)
}

fn shift_references(obj: Object, offset: u32) -> Object {
    match obj {
        Object::Reference(id) => Object::Reference(shift_id(id, offset)),
        Object::Array(items) => Object::Array(
            items
                .into_iter()
                .map(|item| shift_references(item, offset))
                .collect(),
        ),
        Object::Dictionary(mut dict) => {
            shift_dict(&mut dict, offset);
            Object::Dictionary(dict)
        }
        Object::Stream(mut stream) => {
            shift_dict(&mut stream.dict, offset);
            Object::Stream(stream)
        }
        other => other,
    }
}

fn shift_dict(dict: &mut Dictionary, offset: u32) {
    for (_, value) in dict.iter_mut() {
        let owned = std::mem::replace(value, Object::Null);
        *value = shift_references(owned, offset);
    }
}
