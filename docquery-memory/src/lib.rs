//! In-memory document source for docquery.
//!
//! This crate provides a thread-safe, in-memory implementation of the
//! `DocumentSource` trait with full support for filtering, sorting,
//! pagination, projection and relation population. It is ideal for
//! tests, development, and small-scale deployments.
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
//!         doc! { "_id": "p1", "name": "Alice" },
//!         doc! { "_id": "p2", "name": "Bob" },
//!     ]).await;
//!
//!     let engine = QueryEngine::new(source);
//!     let mut params = Map::new();
//!     params.insert("sort".into(), json!("name"));
//!
//!     let envelope = engine.collection("persons").list(&params).await.unwrap();
//!     assert_eq!(envelope.resources.len(), 2);
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as docquery_memory;

pub mod evaluator;
pub mod source;

pub use source::InMemorySource;
