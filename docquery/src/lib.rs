//! Main docquery crate: normalized read queries over document collections.
//!
//! This crate is the primary entry point for users of the docquery
//! framework. Route generation hands each incoming request's parameters —
//! a query string for list operations, a body for search operations — to
//! a collection reader, and gets back a result envelope: the matching
//! documents plus, when requested, the pre-pagination total count.
//!
//! # Features
//!
//! - **Multi-shape parameter normalization** - Filters, projections, sorts and
//!   population directives arrive as objects, JSON strings or token lists and
//!   collapse into one canonical descriptor
//! - **Deterministic pagination** - Explicit `skip`/`limit` versus
//!   `page`/`pageSize` with fixed precedence and explicit defaults
//! - **Multiple sources** - In-memory and MongoDB backends behind one narrow
//!   find/count trait
//! - **Optional total counts** - A second, concurrent count query answers
//!   `totalCount` requests; the route layer surfaces it as a header
//!
//! # Quick Start
//!
//! ```ignore
//! use docquery::{engine::QueryEngine, memory::InMemorySource};
//! use bson::doc;
//! use serde_json::{Map, json};
//!
//! #[tokio::main]
//! async fn main() {
//!     let source = InMemorySource::new();
//!     source.insert("persons", vec![
//!         doc! { "_id": "p1", "name": "Alice", "age": 30 },
//!         doc! { "_id": "p2", "name": "Bob", "age": 25 },
//!     ]).await;
//!
//!     let engine = QueryEngine::new(source);
//!     let persons = engine.collection("persons");
//!
//!     let mut params = Map::new();
//!     params.insert("query".into(), json!({ "age": { "$gte": 28 } }));
//!     params.insert("sort".into(), json!("-name"));
//!     params.insert("totalCount".into(), json!(true));
//!
//!     let envelope = persons.list(&params).await.unwrap();
//!     assert_eq!(envelope.resources.len(), 1);
//!     assert_eq!(envelope.total_count, Some(1));
//! }
//! ```
//!
//! # Dynamic Dispatch
//!
//! When the source type is not known at compile time, convert an engine
//! with `into_dyn` and keep working against the same reader surface:
//!
//! ```ignore
//! use docquery::{engine::QueryEngine, memory::InMemorySource};
//!
//! let engine = QueryEngine::new(InMemorySource::new()).into_dyn();
//! let envelope = engine.collection("persons").search(&params).await?;
//! ```
//!
//! # Sources
//!
//! - [`memory`] - Fast in-memory source for development and testing
//! - [`mongodb`] - Persistent MongoDB source (requires the `mongodb` feature)

pub mod prelude;

pub use docquery_core::{descriptor, engine, error, executor, normalize, pagination, reader, schema, source};

// Re-export BSON types for convenience
pub use bson;

/// In-memory source implementations.
pub mod memory {
    pub use docquery_memory::InMemorySource;
}

/// MongoDB source implementations.
///
/// This module is only available when the `mongodb` feature is enabled.
#[cfg(feature = "mongodb")]
pub mod mongodb {
    pub use docquery_mongodb::{MongoSource, MongoSourceBuilder};
}
