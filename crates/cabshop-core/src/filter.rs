//! # Filter-Query Composition
//!
//! Turns optional, named list filters into a parameterized `WHERE` clause.
//!
//! ## How It Works
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  GET /api/cabs?make=Toyota&status=Available                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  FilterQuery [("make","Toyota"), ("status","Available")]  (in order)   │
//! │       │                                                                 │
//! │       ▼   CAB_FILTERS.build(&query)                                     │
//! │  WhereClause {                                                          │
//! │    conditions: ["LOWER(make) = LOWER(?)", "LOWER(status) = LOWER(?)"], │
//! │    args:       ["Toyota", "Available"],                                │
//! │  }                                                                      │
//! │       │                                                                 │
//! │       ▼   to_sql()                                                      │
//! │  " WHERE LOWER(make) = LOWER(?) AND LOWER(status) = LOWER(?)"          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Absent and blank filters contribute nothing (no NULL matching). Column
//! names come only from the static [`FilterSpec`], never from the request,
//! so the only request data that reaches SQL goes through `args`.

use crate::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

// =============================================================================
// Filter Spec
// =============================================================================

/// How a named filter maps onto columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// Case-insensitive equality on one column.
    Exact(&'static str),
    /// Case-insensitive substring match on any of the columns.
    Search(&'static [&'static str]),
}

/// The filters a table accepts, keyed by query-parameter name.
#[derive(Debug, Clone, Copy)]
pub struct FilterSpec {
    filters: &'static [(&'static str, FilterKind)],
}

impl FilterSpec {
    pub const fn new(filters: &'static [(&'static str, FilterKind)]) -> Self {
        FilterSpec { filters }
    }

    /// Looks up the kind registered for a filter name.
    pub fn kind_of(&self, name: &str) -> Option<FilterKind> {
        self.filters
            .iter()
            .find(|(filter_name, _)| *filter_name == name)
            .map(|(_, kind)| *kind)
    }

    /// Composes the `WHERE` clause for `query`.
    ///
    /// Conditions and arguments follow the insertion order of `query`.
    /// Names not registered here are ignored.
    pub fn build(&self, query: &FilterQuery) -> WhereClause {
        let mut clause = WhereClause::default();

        for (name, value) in query.iter() {
            match self.kind_of(name) {
                Some(FilterKind::Exact(column)) => {
                    clause
                        .conditions
                        .push(format!("LOWER({}) = LOWER(?)", column));
                    clause.args.push(value.to_string());
                }
                Some(FilterKind::Search(columns)) if !columns.is_empty() => {
                    let pattern = format!("%{}%", escape_like(value));
                    let ors: Vec<String> = columns
                        .iter()
                        .map(|column| format!("LOWER({}) LIKE LOWER(?) ESCAPE '\\'", column))
                        .collect();
                    clause.conditions.push(format!("({})", ors.join(" OR ")));
                    clause
                        .args
                        .extend(std::iter::repeat(pattern).take(columns.len()));
                }
                _ => {}
            }
        }

        clause
    }
}

/// Escapes `LIKE` wildcards so a search term matches literally.
///
/// Pairs with `ESCAPE '\'` on every search condition.
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// cabs: `search` over name/make, exact make/status/unit_color.
pub const CAB_FILTERS: FilterSpec = FilterSpec::new(&[
    ("search", FilterKind::Search(&["name", "make"])),
    ("make", FilterKind::Exact("make")),
    ("status", FilterKind::Exact("status")),
    ("unit_color", FilterKind::Exact("unit_color")),
]);

/// accessories: same shape as cabs.
pub const ACCESSORY_FILTERS: FilterSpec = FilterSpec::new(&[
    ("search", FilterKind::Search(&["name", "make"])),
    ("make", FilterKind::Exact("make")),
    ("status", FilterKind::Exact("status")),
    ("unit_color", FilterKind::Exact("unit_color")),
]);

pub const MATERIAL_FILTERS: FilterSpec = FilterSpec::new(&[
    ("search", FilterKind::Search(&["name", "supplier"])),
    ("category", FilterKind::Exact("category")),
    ("supplier", FilterKind::Exact("supplier")),
]);

pub const CUSTOMER_FILTERS: FilterSpec = FilterSpec::new(&[(
    "search",
    FilterKind::Search(&["name", "email", "phone"]),
)]);

pub const SALE_FILTERS: FilterSpec = FilterSpec::new(&[
    ("customer_id", FilterKind::Exact("customer_id")),
    ("sold_by", FilterKind::Exact("sold_by")),
    ("sale_date", FilterKind::Exact("sale_date")),
]);

pub const ACTIVITY_LOG_FILTERS: FilterSpec = FilterSpec::new(&[
    ("user_id", FilterKind::Exact("user_id")),
    ("action", FilterKind::Exact("action")),
    ("entity_type", FilterKind::Exact("entity_type")),
    ("search", FilterKind::Search(&["details"])),
]);

// =============================================================================
// Filter Query
// =============================================================================

/// Ordered set of requested filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterQuery {
    pairs: Vec<(String, String)>,
}

impl FilterQuery {
    pub fn new() -> Self {
        FilterQuery::default()
    }

    /// Appends a filter; blank values are dropped.
    pub fn with(mut self, name: impl Into<String>, value: impl AsRef<str>) -> Self {
        self.push(name, Some(value));
        self
    }

    /// Appends an optional filter; `None` and blank values are dropped.
    pub fn push(&mut self, name: impl Into<String>, value: Option<impl AsRef<str>>) {
        if let Some(value) = value {
            let value = value.as_ref().trim();
            if !value.is_empty() {
                self.pairs.push((name.into(), value.to_string()));
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }
}

impl<N: Into<String>, V: AsRef<str>> FromIterator<(N, V)> for FilterQuery {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut query = FilterQuery::new();
        for (name, value) in iter {
            query.push(name, Some(value));
        }
        query
    }
}

// =============================================================================
// Where Clause
// =============================================================================

/// A composed `WHERE` clause with its positional arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WhereClause {
    pub conditions: Vec<String>,
    pub args: Vec<String>,
}

impl WhereClause {
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// `""` when there are no conditions, else `" WHERE a AND b ..."`.
    pub fn to_sql(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.conditions.join(" AND "))
        }
    }
}

// =============================================================================
// Pagination
// =============================================================================

/// `LIMIT`/`OFFSET` for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: u32,
    pub offset: u32,
}

impl Page {
    /// Builds a page from optional query parameters, clamping the limit to
    /// `1..=MAX_PAGE_SIZE`.
    pub fn new(limit: Option<u32>, offset: Option<u32>) -> Self {
        Page {
            limit: limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
            offset: offset.unwrap_or(0),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Page::new(None, None)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
