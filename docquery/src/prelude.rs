//! Convenient re-exports of commonly used types from docquery.
//!
//! Import this prelude module to quickly access the most frequently used
//! types and traits without needing to import from multiple sub-modules:
//!
//! ```ignore
//! use docquery::prelude::*;
//! ```
//!
//! This provides access to:
//! - Query descriptors and their builder
//! - The engine and reader surface
//! - Source traits
//! - Parameter normalization and pagination configuration
//! - Error types and the result envelope

pub use docquery_core::{
    descriptor::{Populate, Projection, QueryDescriptor, QueryDescriptorBuilder, Sort, SortDirection},
    engine::{DynQueryEngine, QueryEngine},
    error::{QueryEngineError, QueryEngineResult},
    executor::{QueryExecutor, ResultEnvelope},
    normalize::{RawParams, normalize},
    pagination::{PaginationDefaults, ResolvedPage},
    reader::{CollectionReader, DynCollectionReader},
    schema::{ResponseShape, find_options_schema, response_schema},
    source::{DocumentSource, DynDocumentSource},
};
