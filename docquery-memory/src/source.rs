//! In-memory document source.
//!
//! A simple, thread-safe backend that keeps each collection as a vector
//! of BSON documents behind an async-aware read-write lock. Insertion
//! order is the collection's natural order: unsorted results come back in
//! it, and sorted results fall back to it on ties (the sort is stable).
//!
//! # Performance
//!
//! Every query scans the full collection. That is the point — this source
//! exists for tests, development and small deployments; larger datasets
//! belong on a persistent source.
//!
//! # Example
//!
//! ```ignore
//! use docquery_memory::InMemorySource;
//! use bson::doc;
//!
//! let source = InMemorySource::new()
//!     .with_relation("persons", "cats", "cats");
//!
//! source.insert("persons", vec![doc! { "_id": "p1", "name": "Alice" }]).await;
//! ```

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bson::{Bson, Document};
use mea::rwlock::RwLock;
use tracing::debug;

use docquery_core::{
    descriptor::{Populate, Projection, QueryDescriptor, Sort, SortDirection},
    error::{QueryEngineError, QueryEngineResult},
    source::DocumentSource,
};

use crate::evaluator::{self, Comparable};

type CollectionMap = HashMap<String, Vec<Document>>;
type RelationMap = HashMap<String, HashMap<String, String>>;

/// Thread-safe in-memory document source.
///
/// Cloneable; clones share the same underlying collections. Relations are
/// registered with [`InMemorySource::with_relation`] before the source is
/// shared and are copied into each clone.
#[derive(Default, Clone, Debug)]
pub struct InMemorySource {
    collections: Arc<RwLock<CollectionMap>>,
    relations: RelationMap,
}

impl InMemorySource {
    /// Creates a new empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a relation: `populate` directives for `field` on
    /// documents of `collection` resolve against `target`'s `_id` values.
    /// Directives naming an unregistered relation fail with a store error.
    pub fn with_relation(mut self, collection: &str, field: &str, target: &str) -> Self {
        self.relations
            .entry(collection.to_string())
            .or_default()
            .insert(field.to_string(), target.to_string());
        self
    }

    /// Appends documents to a collection, creating it on first use.
    pub async fn insert(&self, collection: &str, documents: Vec<Document>) {
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .extend(documents);
    }
}

#[async_trait]
impl DocumentSource for InMemorySource {
    async fn find(&self, collection: &str, query: &QueryDescriptor) -> QueryEngineResult<Vec<Document>> {
        let collections = self.collections.read().await;
        let documents = match collections.get(collection) {
            Some(documents) => documents,
            None => return Ok(vec![]),
        };

        let mut matched = evaluator::filter_documents(documents, query.filter())?;

        if !query.sort().is_empty() {
            // Vec::sort_by is stable, so equal keys keep natural order.
            matched.sort_by(|a, b| compare_documents(a, b, query.sort()));
        }

        let after_skip = matched.into_iter().skip(query.skip() as usize);
        let mut page: Vec<Document> = match query.limit() {
            // A limit of zero caps the page at zero documents.
            Some(limit) => after_skip.take(limit as usize).collect(),
            None => after_skip.collect(),
        };

        resolve_populate(&collections, &self.relations, collection, &mut page, query.populate())?;

        if !query.projection().is_empty() {
            page = page
                .iter()
                .map(|document| project_document(document, query.projection()))
                .collect();
        }

        debug!(collection, returned = page.len(), "memory source find");

        Ok(page)
    }

    async fn count(&self, collection: &str, filter: &Document) -> QueryEngineResult<u64> {
        let collections = self.collections.read().await;
        let documents = match collections.get(collection) {
            Some(documents) => documents,
            None => return Ok(0),
        };

        let mut total = 0u64;
        for document in documents {
            if evaluator::matches_filter(document, filter)? {
                total += 1;
            }
        }

        Ok(total)
    }
}

fn compare_documents(a: &Document, b: &Document, sort: &[Sort]) -> Ordering {
    for key in sort {
        let left = evaluator::lookup_path(a, &key.field)
            .map(Comparable::from)
            .unwrap_or(Comparable::Null);
        let right = evaluator::lookup_path(b, &key.field)
            .map(Comparable::from)
            .unwrap_or(Comparable::Null);

        let ordering = match key.direction {
            SortDirection::Asc => left.partial_cmp(&right).unwrap_or(Ordering::Equal),
            SortDirection::Desc => right.partial_cmp(&left).unwrap_or(Ordering::Equal),
        };

        if ordering != Ordering::Equal {
            return ordering;
        }
    }

    Ordering::Equal
}

/// Replaces reference fields with the documents they point at.
///
/// Array-valued references resolve to arrays of documents (unresolvable
/// ids are dropped); scalar references are replaced when the target
/// exists and left untouched otherwise.
fn resolve_populate(
    collections: &CollectionMap,
    relations: &RelationMap,
    collection: &str,
    page: &mut [Document],
    directives: &[Populate],
) -> QueryEngineResult<()> {
    for directive in directives {
        let target = relations
            .get(collection)
            .and_then(|fields| fields.get(&directive.path))
            .ok_or_else(|| {
                QueryEngineError::store(format!(
                    "unresolved relation `{}` on collection `{collection}`",
                    directive.path
                ))
            })?;

        let related = collections
            .get(target.as_str())
            .map(Vec::as_slice)
            .unwrap_or(&[]);

        for document in page.iter_mut() {
            match document.get(&directive.path).cloned() {
                Some(Bson::Array(ids)) => {
                    let resolved = ids
                        .iter()
                        .filter_map(|id| find_by_id(related, id))
                        .map(|found| Bson::Document(project_document(found, &directive.select)))
                        .collect::<Vec<_>>();
                    document.insert(directive.path.clone(), Bson::Array(resolved));
                }
                Some(Bson::Null) | None => {}
                Some(id) => {
                    if let Some(found) = find_by_id(related, &id) {
                        document.insert(
                            directive.path.clone(),
                            Bson::Document(project_document(found, &directive.select)),
                        );
                    }
                }
            }
        }
    }

    Ok(())
}

fn find_by_id<'a>(related: &'a [Document], id: &Bson) -> Option<&'a Document> {
    related.iter().find(|document| document.get("_id") == Some(id))
}

/// Applies a normalized field selection to one document.
///
/// Include-mode keeps the listed fields plus `_id` unless `_id` is
/// explicitly excluded; exclude-mode removes the listed fields. Field
/// names are matched at the top level.
fn project_document(document: &Document, projection: &Projection) -> Document {
    if projection.is_empty() {
        return document.clone();
    }

    if !projection.include().is_empty() {
        let mut projected = Document::new();

        if !projection.excludes("_id") {
            if let Some(id) = document.get("_id") {
                projected.insert("_id", id.clone());
            }
        }

        for field in projection.include() {
            if field == "_id" {
                continue;
            }
            if let Some(value) = document.get(field) {
                projected.insert(field.clone(), value.clone());
            }
        }

        return projected;
    }

    let mut projected = document.clone();
    for field in projection.exclude() {
        projected.remove(field);
    }

    projected
}
