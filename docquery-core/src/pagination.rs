//! Pagination resolution for collection reads.
//!
//! Two competing input schemes can request pagination: explicit
//! `skip`/`limit`, and page-based `page` (alias `p`)/`pageSize`. This
//! module resolves them into one effective `(skip, limit)` pair with a
//! fixed precedence: explicit `skip`/`limit` always win, and page-based
//! inputs are ignored entirely when either is present — the two schemes
//! are never merged.
//!
//! Store-wide defaults (default result cap, default page size) are not
//! ambient state; they are carried by [`PaginationDefaults`] and passed in
//! by the engine at construction time.

use serde_json::Value;

use crate::error::{QueryEngineError, QueryEngineResult};
use crate::normalize::RawParams;

const DEFAULT_PAGE_SIZE: u64 = 10;

/// Explicit pagination configuration for an engine.
///
/// # Example
///
/// ```ignore
/// use docquery::pagination::PaginationDefaults;
///
/// let defaults = PaginationDefaults::builder()
///     .with_default_limit(100)
///     .with_page_size(25)
///     .build();
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationDefaults {
    default_limit: Option<u64>,
    page_size: u64,
}

impl PaginationDefaults {
    /// Creates defaults with no result cap and a page size of 10.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new builder for constructing pagination defaults.
    pub fn builder() -> PaginationDefaultsBuilder {
        PaginationDefaultsBuilder::new()
    }

    /// The cap applied when a request names neither `limit` nor a page
    /// scheme. `None` leaves results uncapped.
    pub fn default_limit(&self) -> Option<u64> {
        self.default_limit
    }

    /// The page size assumed when `page` arrives without `pageSize`.
    pub fn page_size(&self) -> u64 {
        self.page_size
    }
}

impl Default for PaginationDefaults {
    fn default() -> Self {
        Self { default_limit: None, page_size: DEFAULT_PAGE_SIZE }
    }
}

/// Builder for [`PaginationDefaults`].
#[derive(Debug, Default)]
pub struct PaginationDefaultsBuilder {
    default_limit: Option<u64>,
    page_size: Option<u64>,
}

impl PaginationDefaultsBuilder {
    /// Creates a new builder with no overrides set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the cap used when a request specifies no pagination at all.
    pub fn with_default_limit(mut self, limit: u64) -> Self {
        self.default_limit = Some(limit);
        self
    }

    /// Sets the page size assumed when `pageSize` is absent.
    pub fn with_page_size(mut self, page_size: u64) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Builds and returns the [`PaginationDefaults`].
    pub fn build(self) -> PaginationDefaults {
        PaginationDefaults {
            default_limit: self.default_limit,
            page_size: self.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        }
    }
}

/// The effective pagination of one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedPage {
    /// Documents to skip; never negative.
    pub skip: u64,
    /// Result cap; `None` means no cap was configured or requested.
    pub limit: Option<u64>,
}

/// Derives the effective `(skip, limit)` pair from the raw parameters.
///
/// Each input may be an integer or an integer-like string. A negative
/// `skip` clamps to zero; a negative `limit` or `pageSize` is a
/// [`QueryEngineError::MalformedParameter`] — it must not silently become
/// "unlimited". `page` values below 1 are treated as 1.
pub fn resolve(params: &RawParams, defaults: &PaginationDefaults) -> QueryEngineResult<ResolvedPage> {
    let skip = int_param(params, "skip")?;
    let limit = int_param(params, "limit")?;

    // Explicit skip/limit shadow the page scheme entirely.
    if skip.is_some() || limit.is_some() {
        let limit = match limit {
            Some(limit) if limit < 0 => {
                return Err(QueryEngineError::malformed("limit", "must not be negative"));
            }
            Some(limit) => Some(limit as u64),
            None => defaults.default_limit(),
        };

        return Ok(ResolvedPage {
            skip: skip.unwrap_or(0).max(0) as u64,
            limit,
        });
    }

    let page = match (int_param(params, "page")?, int_param(params, "p")?) {
        // `page` wins over its alias `p` when both are present.
        (Some(page), _) => Some(page),
        (None, p) => p,
    };
    let page_size = int_param(params, "pageSize")?;

    if page.is_none() && page_size.is_none() {
        return Ok(ResolvedPage { skip: 0, limit: defaults.default_limit() });
    }

    let size = match page_size {
        Some(size) if size < 0 => {
            return Err(QueryEngineError::malformed("pageSize", "must not be negative"));
        }
        Some(size) => size as u64,
        None => defaults.page_size(),
    };
    let page = page.unwrap_or(1).max(1) as u64;

    Ok(ResolvedPage {
        skip: (page - 1) * size,
        limit: Some(size),
    })
}

fn int_param(params: &RawParams, field: &'static str) -> QueryEngineResult<Option<i64>> {
    match params.get(field) {
        None => Ok(None),
        Some(Value::Number(number)) => number
            .as_i64()
            .map(Some)
            .ok_or_else(|| QueryEngineError::malformed(field, "expected an integer")),
        Some(Value::String(raw)) => raw
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| QueryEngineError::malformed(field, format!("`{raw}` is not an integer"))),
        Some(_) => Err(QueryEngineError::malformed(field, "expected an integer")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QueryEngineError;
    use serde_json::{json, Map};

    fn params(value: serde_json::Value) -> RawParams {
        match value {
            serde_json::Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn explicit_skip_and_limit_pass_through() {
        let page = resolve(&params(json!({ "skip": 3, "limit": 7 })), &PaginationDefaults::default()).unwrap();
        assert_eq!(page, ResolvedPage { skip: 3, limit: Some(7) });
    }

    #[test]
    fn lone_skip_defaults_limit_to_configured_cap() {
        let defaults = PaginationDefaults::builder().with_default_limit(50).build();
        let page = resolve(&params(json!({ "skip": 2 })), &defaults).unwrap();
        assert_eq!(page, ResolvedPage { skip: 2, limit: Some(50) });
    }

    #[test]
    fn lone_limit_defaults_skip_to_zero() {
        let page = resolve(&params(json!({ "limit": 5 })), &PaginationDefaults::default()).unwrap();
        assert_eq!(page, ResolvedPage { skip: 0, limit: Some(5) });
    }

    #[test]
    fn page_scheme_computes_offset() {
        let page = resolve(&params(json!({ "page": 2, "pageSize": 5 })), &PaginationDefaults::default()).unwrap();
        assert_eq!(page, ResolvedPage { skip: 5, limit: Some(5) });
    }

    #[test]
    fn explicit_skip_wins_over_page_scheme() {
        let page = resolve(
            &params(json!({ "skip": 2, "page": 2, "pageSize": 5 })),
            &PaginationDefaults::default(),
        )
        .unwrap();
        assert_eq!(page, ResolvedPage { skip: 2, limit: None });
    }

    #[test]
    fn page_wins_over_its_alias() {
        let page = resolve(&params(json!({ "page": 3, "p": 9, "pageSize": 10 })), &PaginationDefaults::default()).unwrap();
        assert_eq!(page.skip, 20);
    }

    #[test]
    fn p_alias_is_honored_alone() {
        let page = resolve(&params(json!({ "p": 4, "pageSize": 10 })), &PaginationDefaults::default()).unwrap();
        assert_eq!(page, ResolvedPage { skip: 30, limit: Some(10) });
    }

    #[test]
    fn page_below_one_is_treated_as_first_page() {
        let page = resolve(&params(json!({ "page": 0, "pageSize": 5 })), &PaginationDefaults::default()).unwrap();
        assert_eq!(page, ResolvedPage { skip: 0, limit: Some(5) });
    }

    #[test]
    fn page_without_page_size_uses_configured_page_size() {
        let defaults = PaginationDefaults::builder().with_page_size(25).build();
        let page = resolve(&params(json!({ "page": 2 })), &defaults).unwrap();
        assert_eq!(page, ResolvedPage { skip: 25, limit: Some(25) });
    }

    #[test]
    fn page_size_without_page_assumes_first_page() {
        let page = resolve(&params(json!({ "pageSize": 5 })), &PaginationDefaults::default()).unwrap();
        assert_eq!(page, ResolvedPage { skip: 0, limit: Some(5) });
    }

    #[test]
    fn negative_skip_clamps_to_zero() {
        let page = resolve(&params(json!({ "skip": -4, "limit": 5 })), &PaginationDefaults::default()).unwrap();
        assert_eq!(page, ResolvedPage { skip: 0, limit: Some(5) });
    }

    #[test]
    fn negative_limit_is_malformed() {
        let err = resolve(&params(json!({ "limit": -1 })), &PaginationDefaults::default()).unwrap_err();
        assert!(matches!(err, QueryEngineError::MalformedParameter(field, _) if field == "limit"));
    }

    #[test]
    fn negative_page_size_is_malformed() {
        let err = resolve(&params(json!({ "page": 1, "pageSize": -5 })), &PaginationDefaults::default()).unwrap_err();
        assert!(matches!(err, QueryEngineError::MalformedParameter(field, _) if field == "pageSize"));
    }

    #[test]
    fn integer_like_strings_are_accepted() {
        let page = resolve(&params(json!({ "skip": "1", "limit": "5" })), &PaginationDefaults::default()).unwrap();
        assert_eq!(page, ResolvedPage { skip: 1, limit: Some(5) });
    }

    #[test]
    fn non_integer_input_is_malformed() {
        let err = resolve(&params(json!({ "skip": "lots" })), &PaginationDefaults::default()).unwrap_err();
        assert!(matches!(err, QueryEngineError::MalformedParameter(field, _) if field == "skip"));
    }

    #[test]
    fn zero_limit_is_preserved_not_uncapped() {
        let page = resolve(&params(json!({ "limit": 0 })), &PaginationDefaults::default()).unwrap();
        assert_eq!(page.limit, Some(0));
    }

    #[test]
    fn nothing_specified_falls_back_to_defaults() {
        let defaults = PaginationDefaults::builder().with_default_limit(100).build();
        let page = resolve(&Map::new(), &defaults).unwrap();
        assert_eq!(page, ResolvedPage { skip: 0, limit: Some(100) });
    }
}
