//! Field validation helpers shared by the intake and alert surfaces.

use crate::error::{CoreError, CoreResult};

/// Reject empty or whitespace-only required text fields.
pub fn require_non_empty(field: &str, value: &str) -> CoreResult<()> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

/// Bound a required text field's length.
pub fn require_max_len(field: &str, value: &str, max: usize) -> CoreResult<()> {
    if value.chars().count() > max {
        return Err(CoreError::Validation(format!(
            "{field} exceeds maximum length of {max} characters"
        )));
    }
    Ok(())
}

/// Validate a caller-supplied page/pageSize pair.
pub fn validate_page(page: u32, page_size: u32) -> CoreResult<()> {
    if page == 0 {
        return Err(CoreError::validation("page must be >= 1"));
    }
    if page_size == 0 {
        return Err(CoreError::validation("pageSize must be >= 1"));
    }
    if page_size > crate::constants::MAX_PAGE_SIZE {
        return Err(CoreError::Validation(format!(
            "pageSize must not exceed {}",
            crate::constants::MAX_PAGE_SIZE
        )));
    }
    Ok(())
}
