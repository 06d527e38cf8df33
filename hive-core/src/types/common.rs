//! Severity and evidence scales shared across the pipeline.

use serde::{Deserialize, Serialize};

/// Incident severity scale, S0 (informational) through S4 (critical).
///
/// Citizens may *suggest* a severity at intake; triage assigns the
/// authoritative `severityFinal`. The two never overwrite each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SeverityLevel {
    S0,
    S1,
    S2,
    S3,
    S4,
}

impl SeverityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::S0 => "S0",
            Self::S1 => "S1",
            Self::S2 => "S2",
            Self::S3 => "S3",
            Self::S4 => "S4",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "S0" => Some(Self::S0),
            "S1" => Some(Self::S1),
            "S2" => Some(Self::S2),
            "S3" => Some(Self::S3),
            "S4" => Some(Self::S4),
            _ => None,
        }
    }
}

/// Staff-assigned confidence in supporting evidence, E0 (none) through
/// E3 (strong). Distinct from the citizen-suggested severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EvidenceLevel {
    E0,
    E1,
    E2,
    E3,
}

impl EvidenceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::E0 => "E0",
            Self::E1 => "E1",
            Self::E2 => "E2",
            Self::E3 => "E3",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "E0" => Some(Self::E0),
            "E1" => Some(Self::E1),
            "E2" => Some(Self::E2),
            "E3" => Some(Self::E3),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_round_trips() {
        for s in ["S0", "S1", "S2", "S3", "S4"] {
            assert_eq!(SeverityLevel::parse(s).unwrap().as_str(), s);
        }
        assert!(SeverityLevel::parse("S5").is_none());
        assert!(SeverityLevel::parse("s0").is_none());
    }

    #[test]
    fn severity_orders() {
        assert!(SeverityLevel::S0 < SeverityLevel::S4);
        assert!(EvidenceLevel::E1 < EvidenceLevel::E3);
    }
}
