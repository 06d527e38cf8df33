//! Core domain model for the community-safety incident pipeline.
//!
//! The pipeline has three interacting lifecycles plus one derived view:
//!
//! - **Report** — citizen-submitted incident, owned by the report store.
//! - **TriageDecision** — staff adjudication of a report; the triage engine
//!   is the sole writer of a report's status after intake.
//! - **Alert** — CAP-ready public notice with a strict
//!   draft → approved → published → withdrawn lifecycle.
//! - **KPI** — pure, read-only metric derivations over the stores.
//!
//! Everything in this crate is synchronous and side-effect free: state
//! machines are finite enumerations with explicit transition tables, CAP
//! rendering is a pure function of the alert's fields, and KPI math takes
//! its targets as configuration.

pub mod cap;
pub mod constants;
pub mod error;
pub mod kpi;
pub mod types;
pub mod validate;

pub use error::{CoreError, CoreResult};
