use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::AppError;

/// Pagination metadata included in list responses.
#[derive(Serialize, ToSchema)]
pub struct Pagination {
    /// Current page number (1-based).
    #[schema(example = 1)]
    pub page: u64,
    /// Number of items per page.
    #[schema(example = 20)]
    pub per_page: u64,
    /// Total number of matching items across all pages.
    #[schema(example = 47)]
    pub total: u64,
    /// Total number of pages.
    #[schema(example = 3)]
    pub total_pages: u64,
}

impl Pagination {
    pub fn new(page: u64, per_page: u64, total: u64) -> Self {
        Self {
            page,
            per_page,
            total,
            total_pages: total.div_ceil(per_page),
        }
    }
}

/// Page selection for list endpoints.
#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Page number, 1-based. Default: 1. Values above 1000000 are clamped.
    pub page: Option<u64>,
    /// Items per page, 1-100. Default: 20.
    pub per_page: Option<u64>,
}

/// Highest page number served by list endpoints.
pub const MAX_PAGE: u64 = 1_000_000;

impl PageQuery {
    /// Returns `(page, per_page)` with defaults applied and bounds clamped.
    pub fn resolve(&self) -> (u64, u64) {
        let page = self.page.unwrap_or(1).clamp(1, MAX_PAGE);
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        (page, per_page)
    }

    /// Number of rows skipped before `page`.
    pub fn offset(page: u64, per_page: u64) -> u64 {
        page.saturating_sub(1).saturating_mul(per_page)
    }
}

/// Validate a trimmed title (1-256 Unicode characters).
pub fn validate_title(title: &str) -> Result<(), AppError> {
    let title = title.trim();
    if title.is_empty() || title.chars().count() > 256 {
        return Err(AppError::Validation("Title must be 1-256 characters".into()));
    }
    Ok(())
}

/// Validate trimmed free text of at most `max` Unicode characters.
pub fn validate_text(field: &str, text: &str, max: usize) -> Result<(), AppError> {
    let text = text.trim();
    if text.is_empty() || text.chars().count() > max {
        return Err(AppError::Validation(format!("{field} must be 1-{max} characters")));
    }
    Ok(())
}
