//! Offset pagination shared by every list operation.

use crate::domain::error::DomainError;

/// Raw list parameters as received from a caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub order_by: Option<String>,
    pub keyword: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDir {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub dir: SortDir,
}

impl Default for OrderBy {
    fn default() -> Self {
        Self {
            field: "created_at".to_string(),
            dir: SortDir::Desc,
        }
    }
}

/// Parse `<field> [asc|desc]` against the fields an entity allows sorting on.
/// Blank input selects the default `created_at desc`.
pub fn parse_order_by(raw: &str, allowed: &[&str]) -> Result<OrderBy, DomainError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(OrderBy::default());
    }

    let tokens: Vec<&str> = raw.split_whitespace().collect();
    let (field, dir) = match tokens.as_slice() {
        [field] => (*field, SortDir::Asc),
        [field, dir] if dir.eq_ignore_ascii_case("asc") => (*field, SortDir::Asc),
        [field, dir] if dir.eq_ignore_ascii_case("desc") => (*field, SortDir::Desc),
        _ => {
            return Err(DomainError::validation(
                "order_by",
                format!("invalid order clause '{raw}'"),
            ))
        }
    };

    let field = field.to_ascii_lowercase();
    if !allowed.contains(&field.as_str()) {
        return Err(DomainError::validation(
            "order_by",
            format!("cannot order by '{field}'"),
        ));
    }

    Ok(OrderBy { field, dir })
}

/// Fully resolved request handed to repositories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: u64,
    pub offset: u64,
    pub order: OrderBy,
    pub keyword: Option<String>,
}

impl PageRequest {
    /// Apply defaults and bounds. A limit above `max_page_size` is clamped,
    /// a zero limit is rejected.
    pub fn resolve(
        params: &ListParams,
        default_page_size: u64,
        max_page_size: u64,
        allowed_order: &[&str],
    ) -> Result<Self, DomainError> {
        let limit = match params.limit {
            None => default_page_size,
            Some(0) => return Err(DomainError::validation("limit", "must be at least 1")),
            Some(n) => n,
        }
        .min(max_page_size);

        let order = match params.order_by.as_deref() {
            Some(raw) => parse_order_by(raw, allowed_order)?,
            None => OrderBy::default(),
        };

        let keyword = params
            .keyword
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string);

        Ok(Self {
            limit,
            offset: params.offset.unwrap_or(0),
            order,
            keyword,
        })
    }
}

/// One page of results; `total` counts all matching rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, req: &PageRequest) -> Self {
        Self {
            items,
            total,
            limit: req.limit,
            offset: req.offset,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            limit: self.limit,
            offset: self.offset,
        }
    }
}
