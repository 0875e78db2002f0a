//! Document store collaborator interface.
//!
//! The engine consumes the store through two read primitives and nothing
//! else: a find that applies a normalized [`QueryDescriptor`] exactly, and
//! a count over a bare filter. Connection management, schema validation
//! and retry policy all live behind this seam.
//!
//! # Traits
//!
//! - [`DocumentSource`]: the core trait for store implementations
//! - [`DynDocumentSource`]: a trait for dynamic dispatch over sources
//!
//! Implementations must be thread-safe (`Send + Sync`); the engine issues
//! the find and count of a single request concurrently.

use async_trait::async_trait;
use bson::Document;
use std::fmt::Debug;

use crate::{descriptor::QueryDescriptor, error::QueryEngineResult};

/// Abstract interface for document stores the engine can read from.
#[async_trait]
pub trait DocumentSource: Send + Sync + Debug {
    /// Runs the primary find against a collection with the descriptor's
    /// filter, projection, sort, population directives, skip and limit
    /// applied exactly as normalized.
    ///
    /// Returns matching documents in store order (after sorting). A
    /// population directive referencing an unknown relation must fail with
    /// [`QueryEngineError::Store`](crate::error::QueryEngineError::Store),
    /// never silently resolve to nothing.
    async fn find(&self, collection: &str, query: &QueryDescriptor) -> QueryEngineResult<Vec<Document>>;

    /// Counts the documents matching `filter` alone — no skip, limit or
    /// projection. Used to answer `totalCount` requests.
    async fn count(&self, collection: &str, filter: &Document) -> QueryEngineResult<u64>;
}

#[async_trait]
impl<S> DocumentSource for &S
where
    S: DocumentSource,
{
    async fn find(&self, collection: &str, query: &QueryDescriptor) -> QueryEngineResult<Vec<Document>> {
        (*self).find(collection, query).await
    }

    async fn count(&self, collection: &str, filter: &Document) -> QueryEngineResult<u64> {
        (*self).count(collection, filter).await
    }
}

/// Object-safe variant of [`DocumentSource`] for runtime source selection.
///
/// Automatically implemented for every [`DocumentSource`].
#[async_trait]
pub trait DynDocumentSource: Send + Sync + Debug {
    async fn find(&self, collection: &str, query: &QueryDescriptor) -> QueryEngineResult<Vec<Document>>;
    async fn count(&self, collection: &str, filter: &Document) -> QueryEngineResult<u64>;
}

#[async_trait]
impl<S: DocumentSource> DynDocumentSource for S {
    async fn find(&self, collection: &str, query: &QueryDescriptor) -> QueryEngineResult<Vec<Document>> {
        DocumentSource::find(self, collection, query).await
    }

    async fn count(&self, collection: &str, filter: &Document) -> QueryEngineResult<u64> {
        DocumentSource::count(self, collection, filter).await
    }
}

#[async_trait]
impl DocumentSource for &dyn DynDocumentSource {
    async fn find(&self, collection: &str, query: &QueryDescriptor) -> QueryEngineResult<Vec<Document>> {
        DynDocumentSource::find(*self, collection, query).await
    }

    async fn count(&self, collection: &str, filter: &Document) -> QueryEngineResult<u64> {
        DynDocumentSource::count(*self, collection, filter).await
    }
}
