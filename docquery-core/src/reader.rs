//! Collection readers: the operation entry points used by route generation.
//!
//! A reader binds one collection name to a source and the engine's
//! pagination defaults, and exposes one operation per read verb. Both
//! [`CollectionReader::list`] (parameters sourced from a query string) and
//! [`CollectionReader::search`] (parameters sourced from a request body)
//! funnel into the same normalize → resolve → execute pipeline, so
//! behavior is identical regardless of transport — the only difference is
//! where the caller got the parameters.
//!
//! The route layer surfaces the envelope's `totalCount`, when present, as
//! a response header; readers only decide whether it is computed.

use crate::{
    descriptor::QueryDescriptor,
    error::QueryEngineResult,
    executor::{QueryExecutor, ResultEnvelope},
    normalize::{RawParams, normalize},
    pagination::PaginationDefaults,
    source::{DocumentSource, DynDocumentSource},
};

/// A read-only view of one collection over a statically-typed source.
#[derive(Debug)]
pub struct CollectionReader<'a, S: DocumentSource> {
    name: String,
    source: &'a S,
    defaults: &'a PaginationDefaults,
}

impl<'a, S: DocumentSource> CollectionReader<'a, S> {
    pub(crate) fn new(name: String, source: &'a S, defaults: &'a PaginationDefaults) -> Self {
        Self { name, source, defaults }
    }

    /// Returns the name of this collection.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Handles a list operation: parameters as they arrived in a query
    /// string (every value string-typed).
    pub async fn list(&self, params: &RawParams) -> QueryEngineResult<ResultEnvelope> {
        self.run(params).await
    }

    /// Handles a search operation: parameters as they arrived in a request
    /// body. Same pipeline as [`CollectionReader::list`].
    pub async fn search(&self, params: &RawParams) -> QueryEngineResult<ResultEnvelope> {
        self.run(params).await
    }

    /// Executes a pre-built descriptor directly, skipping normalization.
    pub async fn query(&self, query: &QueryDescriptor) -> QueryEngineResult<ResultEnvelope> {
        QueryExecutor::new(self.source)
            .execute(&self.name, query)
            .await
    }

    async fn run(&self, params: &RawParams) -> QueryEngineResult<ResultEnvelope> {
        let query = normalize(params, self.defaults)?;

        QueryExecutor::new(self.source)
            .execute(&self.name, &query)
            .await
    }
}

/// A read-only view of one collection over a dynamically dispatched source.
#[derive(Debug)]
pub struct DynCollectionReader<'a> {
    name: String,
    source: &'a dyn DynDocumentSource,
    defaults: &'a PaginationDefaults,
}

impl<'a> DynCollectionReader<'a> {
    pub(crate) fn new(name: String, source: &'a dyn DynDocumentSource, defaults: &'a PaginationDefaults) -> Self {
        Self { name, source, defaults }
    }

    /// Returns the name of this collection.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Handles a list operation: parameters sourced from a query string.
    pub async fn list(&self, params: &RawParams) -> QueryEngineResult<ResultEnvelope> {
        self.run(params).await
    }

    /// Handles a search operation: parameters sourced from a request body.
    pub async fn search(&self, params: &RawParams) -> QueryEngineResult<ResultEnvelope> {
        self.run(params).await
    }

    /// Executes a pre-built descriptor directly, skipping normalization.
    pub async fn query(&self, query: &QueryDescriptor) -> QueryEngineResult<ResultEnvelope> {
        QueryExecutor::new(self.source)
            .execute(&self.name, query)
            .await
    }

    async fn run(&self, params: &RawParams) -> QueryEngineResult<ResultEnvelope> {
        let query = normalize(params, self.defaults)?;

        QueryExecutor::new(self.source)
            .execute(&self.name, &query)
            .await
    }
}
