//! KPI math: metric evaluation, targets, and the assembled report.
//!
//! Everything here is pure. Current values are gathered by the metrics
//! service from store snapshots (window: all-time over current contents,
//! so the denominator is stable) and combined with configured targets.

use serde::{Deserialize, Serialize};

/// One KPI with its configured target.
///
/// Direction matters: a direct metric is met when `current >= target`,
/// an inverse (lower-is-better) metric when `current <= target`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub current: f64,
    pub target: f64,
    pub inverse: bool,
}

impl Metric {
    pub fn direct(current: f64, target: f64) -> Self {
        Self { current, target, inverse: false }
    }

    pub fn inverse(current: f64, target: f64) -> Self {
        Self { current, target, inverse: true }
    }

    pub fn met(&self) -> bool {
        if self.inverse {
            self.current <= self.target
        } else {
            self.current >= self.target
        }
    }

    /// Progress-bar fraction in 0..=100.
    ///
    /// Direct: `clamp(0, 100, current/target*100)` so progress caps at 100
    /// once the target is reached. Inverse:
    /// `clamp(0, 100, (target-current)/target*100 + 100)` so a value at or
    /// below target shows full progress while one far above target floors
    /// at 0. Non-positive targets degenerate to all-or-nothing.
    pub fn progress(&self) -> f64 {
        if self.inverse {
            if self.target <= 0.0 {
                return if self.current == 0.0 { 100.0 } else { 0.0 };
            }
            ((self.target - self.current) / self.target * 100.0 + 100.0).clamp(0.0, 100.0)
        } else {
            if self.target <= 0.0 {
                return if self.current > 0.0 { 100.0 } else { 0.0 };
            }
            (self.current / self.target * 100.0).clamp(0.0, 100.0)
        }
    }
}

/// Configured KPI thresholds. Targets are configuration, not code;
/// these defaults match the program's published goals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KpiTargets {
    pub workshops: f64,
    pub participants: f64,
    pub quiz_improvement: f64,
    /// Median report-to-first-decision latency, minutes (inverse).
    pub triage_median_minutes: f64,
    /// Percentage of decided reports verified (triaged or escalated).
    pub verified_ratio: f64,
    /// Percentage of decided reports that were abuse (inverse).
    pub abuse_rate: f64,
    /// Median draft-to-publish latency, minutes (inverse).
    pub publish_latency_minutes: f64,
    pub certified_triagers: f64,
    pub partner_orgs: f64,
    pub external_adoption: f64,
}

impl Default for KpiTargets {
    fn default() -> Self {
        Self {
            workshops: 12.0,
            participants: 300.0,
            quiz_improvement: 25.0,
            triage_median_minutes: 30.0,
            verified_ratio: 60.0,
            abuse_rate: 5.0,
            publish_latency_minutes: 15.0,
            certified_triagers: 15.0,
            partner_orgs: 4.0,
            external_adoption: 2.0,
        }
    }
}

/// Current values gathered from the stores plus the external counts that
/// are tracked outside the system (carried in configuration).
#[derive(Debug, Clone, Default)]
pub struct KpiCurrents {
    pub workshops: f64,
    pub participants: f64,
    pub quiz_improvement: Option<f64>,
    pub triage_median_minutes: Option<f64>,
    pub verified_ratio: Option<f64>,
    pub abuse_rate: Option<f64>,
    pub publish_latency_minutes: Option<f64>,
    pub certified_triagers: f64,
    pub partner_orgs: f64,
    pub external_adoption: f64,
}

/// Education and outreach metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EducationKpis {
    pub workshops: Metric,
    pub participants: Metric,
    pub quiz_improvement: Metric,
}

/// Report pipeline health metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineKpis {
    pub triage_median_minutes: Metric,
    pub verified_ratio: Metric,
    pub abuse_rate: Metric,
    pub publish_latency_minutes: Metric,
}

/// Program adoption metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdoptionKpis {
    pub certified_triagers: Metric,
    pub partner_orgs: Metric,
    pub external_adoption: Metric,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KpiReport {
    pub education: EducationKpis,
    pub pipeline: PipelineKpis,
    pub adoption: AdoptionKpis,
}

/// Combine gathered current values with configured targets.
/// Missing pipeline values (no decided reports yet, no published alerts)
/// evaluate as 0.
pub fn compute(currents: &KpiCurrents, targets: &KpiTargets) -> KpiReport {
    let or_zero = |v: Option<f64>| v.unwrap_or(0.0);
    KpiReport {
        education: EducationKpis {
            workshops: Metric::direct(currents.workshops, targets.workshops),
            participants: Metric::direct(currents.participants, targets.participants),
            quiz_improvement: Metric::direct(
                or_zero(currents.quiz_improvement),
                targets.quiz_improvement,
            ),
        },
        pipeline: PipelineKpis {
            triage_median_minutes: Metric::inverse(
                or_zero(currents.triage_median_minutes),
                targets.triage_median_minutes,
            ),
            verified_ratio: Metric::direct(
                or_zero(currents.verified_ratio),
                targets.verified_ratio,
            ),
            abuse_rate: Metric::inverse(or_zero(currents.abuse_rate), targets.abuse_rate),
            publish_latency_minutes: Metric::inverse(
                or_zero(currents.publish_latency_minutes),
                targets.publish_latency_minutes,
            ),
        },
        adoption: AdoptionKpis {
            certified_triagers: Metric::direct(
                currents.certified_triagers,
                targets.certified_triagers,
            ),
            partner_orgs: Metric::direct(currents.partner_orgs, targets.partner_orgs),
            external_adoption: Metric::direct(
                currents.external_adoption,
                targets.external_adoption,
            ),
        },
    }
}

/// Median with midpoint interpolation for even counts. None for no data.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = sorted.len();
    if n % 2 == 1 {
        Some(sorted[n / 2])
    } else {
        Some((sorted[n / 2 - 1] + sorted[n / 2]) / 2.0)
    }
}
