//! Shared constants for the pipeline.

/// Default page size for list operations.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Upper bound for caller-supplied page sizes; larger requests are rejected.
pub const MAX_PAGE_SIZE: u32 = 200;

/// CAP 1.2 namespace emitted on every rendered alert.
pub const CAP_XMLNS: &str = "urn:oasis:names:tc:emergency:cap:1.2";

/// Window, in days, for the dashboard's "reports this week" counter.
pub const DASHBOARD_WEEK_DAYS: i64 = 7;
