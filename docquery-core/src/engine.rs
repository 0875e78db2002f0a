//! Engine types binding a document source to pagination configuration.
//!
//! An engine owns the source and the explicit [`PaginationDefaults`] and
//! hands out per-collection readers. Nothing in the engine is
//! per-request: descriptors are built fresh inside each reader call and
//! discarded with the envelope.
//!
//! # Example
//!
//! ```ignore
//! use docquery::engine::QueryEngine;
//! use docquery::memory::InMemorySource;
//!
//! let engine = QueryEngine::new(InMemorySource::new());
//! let persons = engine.collection("persons");
//! let envelope = persons.list(&params).await?;
//! ```

use crate::{
    pagination::PaginationDefaults,
    reader::{CollectionReader, DynCollectionReader},
    source::{DocumentSource, DynDocumentSource},
};

/// A query engine bound to a statically-typed document source.
#[derive(Debug)]
pub struct QueryEngine<S: DocumentSource> {
    source: S,
    defaults: PaginationDefaults,
}

impl<S: DocumentSource> QueryEngine<S> {
    /// Creates an engine with default pagination configuration.
    pub fn new(source: S) -> Self {
        Self::with_defaults(source, PaginationDefaults::default())
    }

    /// Creates an engine with explicit pagination configuration.
    pub fn with_defaults(source: S, defaults: PaginationDefaults) -> Self {
        Self { source, defaults }
    }

    /// Gets a reader for the named collection.
    pub fn collection(&self, name: &str) -> CollectionReader<'_, S> {
        CollectionReader::new(name.to_string(), &self.source, &self.defaults)
    }

    /// The pagination configuration this engine applies.
    pub fn defaults(&self) -> &PaginationDefaults {
        &self.defaults
    }

    /// The underlying source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Converts this engine into a dynamically dispatched one.
    pub fn into_dyn(self) -> DynQueryEngine
    where
        S: 'static,
    {
        DynQueryEngine {
            source: Box::new(self.source),
            defaults: self.defaults,
        }
    }
}

/// A query engine over a boxed source selected at runtime.
#[derive(Debug)]
pub struct DynQueryEngine {
    source: Box<dyn DynDocumentSource>,
    defaults: PaginationDefaults,
}

impl DynQueryEngine {
    /// Creates an engine with default pagination configuration.
    pub fn new(source: Box<dyn DynDocumentSource>) -> Self {
        Self::with_defaults(source, PaginationDefaults::default())
    }

    /// Creates an engine with explicit pagination configuration.
    pub fn with_defaults(source: Box<dyn DynDocumentSource>, defaults: PaginationDefaults) -> Self {
        Self { source, defaults }
    }

    /// Gets a reader for the named collection.
    pub fn collection(&self, name: &str) -> DynCollectionReader<'_> {
        DynCollectionReader::new(name.to_string(), &*self.source, &self.defaults)
    }

    /// The pagination configuration this engine applies.
    pub fn defaults(&self) -> &PaginationDefaults {
        &self.defaults
    }
}
