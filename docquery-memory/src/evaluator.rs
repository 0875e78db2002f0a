//! Filter evaluation for in-memory document matching.
//!
//! Filters reach this backend as the same structural predicate the engine
//! hands to any store: a BSON document with implicit AND across top-level
//! entries, implicit equality for bare values, operator sub-documents
//! (`$eq`, `$ne`, `$gt`, `$gte`, `$lt`, `$lte`, `$in`, `$nin`, `$exists`),
//! logical `$and`/`$or`, and dotted field paths. An operator this backend
//! does not understand is a store error, never a silent non-match.

use std::cmp::Ordering;
use std::collections::HashMap;

use bson::{Bson, Document, datetime::DateTime};

use docquery_core::error::{QueryEngineError, QueryEngineResult};

/// Type-erased, comparable representation of BSON values.
///
/// Wraps BSON values for equality and ordering during filtering and
/// sorting; all numeric types are normalized to f64.
#[derive(Debug)]
pub(crate) enum Comparable<'a> {
    /// Null or missing value
    Null,
    /// Boolean value
    Bool(bool),
    /// Numeric value (all integers and floats normalized to f64)
    Number(f64),
    /// DateTime value
    DateTime(DateTime),
    /// String value
    String(&'a str),
    /// Array of comparable values
    Array(Vec<Comparable<'a>>),
    /// Map/Object of comparable values
    Map(HashMap<&'a str, Comparable<'a>>),
}

impl<'a> From<&'a Bson> for Comparable<'a> {
    fn from(bson: &'a Bson) -> Self {
        match bson {
            Bson::Null => Comparable::Null,
            Bson::Boolean(value) => Comparable::Bool(*value),
            Bson::Int32(value) => Comparable::Number(*value as f64),
            Bson::Int64(value) => Comparable::Number(*value as f64),
            Bson::Double(value) => Comparable::Number(*value),
            Bson::DateTime(value) => Comparable::DateTime(*value),
            Bson::String(value) => Comparable::String(value),
            Bson::Array(arr) => Comparable::Array(
                arr.iter()
                    .map(Comparable::from)
                    .collect::<Vec<_>>(),
            ),
            Bson::Document(doc) => Comparable::Map(
                doc.iter()
                    .map(|(k, v)| (k.as_str(), Comparable::from(v)))
                    .collect::<HashMap<_, _>>(),
            ),
            _ => Comparable::Null, // Other types are not comparable
        }
    }
}

impl<'a> PartialEq for Comparable<'a> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => true,
            (Comparable::Bool(a), Comparable::Bool(b)) => a == b,
            (Comparable::Number(a), Comparable::Number(b)) => a == b,
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a == b,
            (Comparable::String(a), Comparable::String(b)) => a == b,
            (Comparable::Array(a), Comparable::Array(b)) => a == b,
            (Comparable::Map(a), Comparable::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl<'a> PartialOrd for Comparable<'a> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Comparable::Bool(a), Comparable::Bool(b)) => a.partial_cmp(b),
            (Comparable::Number(a), Comparable::Number(b)) => a.partial_cmp(b),
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a.partial_cmp(b),
            (Comparable::String(a), Comparable::String(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

/// Returns the documents matching the filter, in input order.
pub(crate) fn filter_documents(documents: &[Document], filter: &Document) -> QueryEngineResult<Vec<Document>> {
    let mut matched = Vec::new();
    for document in documents {
        if matches_filter(document, filter)? {
            matched.push(document.clone());
        }
    }

    Ok(matched)
}

/// Evaluates a filter against one document. An empty filter matches.
pub(crate) fn matches_filter(document: &Document, filter: &Document) -> QueryEngineResult<bool> {
    for (key, condition) in filter {
        let matched = match key.as_str() {
            "$and" => logical(document, condition, true)?,
            "$or" => logical(document, condition, false)?,
            key if key.starts_with('$') => {
                return Err(QueryEngineError::store(format!(
                    "unsupported filter operator `{key}`"
                )));
            }
            path => field_matches(document, path, condition)?,
        };

        if !matched {
            return Ok(false);
        }
    }

    Ok(true)
}

/// Resolves a possibly dotted field path against a document.
pub(crate) fn lookup_path<'a>(document: &'a Document, path: &str) -> Option<&'a Bson> {
    let mut segments = path.split('.');
    let mut value = document.get(segments.next()?)?;

    for segment in segments {
        value = value.as_document()?.get(segment)?;
    }

    Some(value)
}

fn logical(document: &Document, condition: &Bson, all: bool) -> QueryEngineResult<bool> {
    let clauses = condition
        .as_array()
        .ok_or_else(|| QueryEngineError::store("$and/$or expects an array of documents"))?;

    for clause in clauses {
        let clause = clause
            .as_document()
            .ok_or_else(|| QueryEngineError::store("$and/$or entries must be documents"))?;
        let matched = matches_filter(document, clause)?;

        if all && !matched {
            return Ok(false);
        }
        if !all && matched {
            return Ok(true);
        }
    }

    Ok(all)
}

fn field_matches(document: &Document, path: &str, condition: &Bson) -> QueryEngineResult<bool> {
    let value = lookup_path(document, path);

    // A sub-document whose first key starts with `$` is an operator spec;
    // any other condition is an implicit equality.
    if let Bson::Document(spec) = condition {
        if spec.keys().next().is_some_and(|key| key.starts_with('$')) {
            return operator_matches(value, spec);
        }
    }

    Ok(equality(value, condition))
}

fn operator_matches(value: Option<&Bson>, spec: &Document) -> QueryEngineResult<bool> {
    for (op, operand) in spec {
        let matched = match op.as_str() {
            "$eq" => equality(value, operand),
            "$ne" => !equality(value, operand),
            "$gt" | "$gte" | "$lt" | "$lte" => ordered(value, operand, op),
            "$in" => membership(value, operand, op)?,
            "$nin" => !membership(value, operand, op)?,
            "$exists" => match operand {
                Bson::Boolean(should_exist) => value.is_some() == *should_exist,
                _ => return Err(QueryEngineError::store("$exists expects a boolean")),
            },
            other => {
                return Err(QueryEngineError::store(format!(
                    "unsupported filter operator `{other}`"
                )));
            }
        };

        if !matched {
            return Ok(false);
        }
    }

    Ok(true)
}

fn equality(value: Option<&Bson>, operand: &Bson) -> bool {
    let Some(value) = value else {
        // A null operand matches a missing field.
        return matches!(operand, Bson::Null);
    };

    if Comparable::from(value) == Comparable::from(operand) {
        return true;
    }

    // An array field also matches when any element equals the operand.
    match value {
        Bson::Array(items) => items
            .iter()
            .any(|item| Comparable::from(item) == Comparable::from(operand)),
        _ => false,
    }
}

fn ordered(value: Option<&Bson>, operand: &Bson, op: &str) -> bool {
    let Some(value) = value else { return false };

    match Comparable::from(value).partial_cmp(&Comparable::from(operand)) {
        Some(ordering) => match op {
            "$gt" => ordering == Ordering::Greater,
            "$gte" => ordering != Ordering::Less,
            "$lt" => ordering == Ordering::Less,
            "$lte" => ordering != Ordering::Greater,
            _ => unreachable!(),
        },
        None => false,
    }
}

fn membership(value: Option<&Bson>, operand: &Bson, op: &str) -> QueryEngineResult<bool> {
    let candidates = operand
        .as_array()
        .ok_or_else(|| QueryEngineError::store(format!("{op} expects an array")))?;

    Ok(candidates.iter().any(|candidate| equality(value, candidate)))
}
