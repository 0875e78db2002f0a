//! Normalized read queries over document collections.
//!
//! This crate is the core of the docquery project and provides:
//!
//! - **Query descriptors** ([`descriptor`]) - The canonical form every accepted request shape collapses into
//! - **Parameter normalization** ([`normalize`]) - Multi-shape request fields to one descriptor
//! - **Pagination resolution** ([`pagination`]) - `skip`/`limit` vs `page`/`pageSize` precedence and explicit defaults
//! - **Source abstraction** ([`source`]) - The narrow find/count interface stores implement
//! - **Execution** ([`executor`]) - Find plus optional concurrent count, assembled into a result envelope
//! - **Readers and engines** ([`reader`], [`engine`]) - The list/search operation surface handed to route generation
//! - **Error handling** ([`error`]) - Malformed-parameter and store error taxonomy
//! - **Schema helpers** ([`schema`]) - Response/request schema fragments for generated routes
//!
//! # Example
//!
//! ```ignore
//! use docquery_core::engine::QueryEngine;
//! use serde_json::{Map, json};
//!
//! let engine = QueryEngine::new(source);
//! let persons = engine.collection("persons");
//!
//! let mut params = Map::new();
//! params.insert("sort".into(), json!("-name"));
//! params.insert("totalCount".into(), json!(true));
//!
//! let envelope = persons.list(&params).await?;
//! ```

#[allow(unused_extern_crates)]
extern crate self as docquery_core;

pub mod descriptor;
pub mod engine;
pub mod error;
pub mod executor;
pub mod normalize;
pub mod pagination;
pub mod reader;
pub mod schema;
pub mod source;
