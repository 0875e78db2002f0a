//! MongoDB document source for docquery.
//!
//! This crate implements the `DocumentSource` trait on top of the MongoDB
//! async driver, mapping normalized query descriptors onto native find
//! options and answering count queries with `count_documents`. Relation
//! population is batched: one `$in` query per directive.
//!
//! To use this source through the facade crate, enable the `mongodb`
//! feature:
//!
//! ```toml
//! [dependencies]
//! docquery = { version = "x.y.z", features = ["mongodb"] }
//! ```
//!
//! # Example
//!
//! ```ignore
//! use docquery::mongodb::MongoSource;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = MongoSource::builder("mongodb://localhost:27017", "my_database")
//!         .with_relation("persons", "cats", "cats")
//!         .build()
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as docquery_mongodb;

pub mod source;

pub use source::{MongoSource, MongoSourceBuilder};
