//! Page/limit arithmetic shared by both search phases.

use crate::error::ValidationError;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 5;

/// A validated `(page, limit)` pair. Both are always `>= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: u32,
    limit: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Pagination {
    pub fn new(page: u32, limit: u32) -> Result<Self, ValidationError> {
        if page == 0 {
            return Err(ValidationError::new("Invalid page: must be a positive integer"));
        }
        if limit == 0 {
            return Err(ValidationError::new("Invalid limit: must be a positive integer"));
        }
        Ok(Self { page, limit })
    }

    /// Coerce raw query-string values. Missing values take the defaults,
    /// anything that is not a positive integer is rejected, and `limit` is
    /// clamped to `max_limit`.
    pub fn from_params(
        page: Option<&str>,
        limit: Option<&str>,
        max_limit: u32,
    ) -> Result<Self, ValidationError> {
        let page = parse_positive("page", page, DEFAULT_PAGE)?;
        let limit = parse_positive("limit", limit, DEFAULT_LIMIT)?;
        Self::new(page, limit.min(max_limit.max(1)))
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }

    pub fn size(&self) -> u32 {
        self.limit
    }

    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.limit as u64)
    }
}

fn parse_positive(name: &str, raw: Option<&str>, default: u32) -> Result<u32, ValidationError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(default);
    };
    match raw.parse::<u32>() {
        Ok(value) if value >= 1 => Ok(value),
        _ => Err(ValidationError::new(format!(
            "Invalid {name}: must be a positive integer"
        ))),
    }
}
