//! Simplified design checks: cable current-carrying capacity and maximum
//! earth fault loop impedance.
//!
//! These are threshold checks against tabulated values, not a design tool.
//! Callers supply the tabulated figures for the cable and protective device.

pub mod derating;

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{FlowError, Result};

pub use derating::{Insulation, grouping_factor, temperature_factor};

/// Default multiplier applied to tabulated Zs values before comparing with
/// a reading taken at ambient temperature.
pub const DEFAULT_ZS_CORRECTION: f64 = 0.8;

/// Inputs for a cable sizing check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CableCheck {
    /// `Ib`, amperes.
    pub design_current: f64,
    /// `In`, amperes.
    pub device_rating: f64,
    /// `It`, amperes, from the cable's installation method table.
    pub tabulated_capacity: f64,
    pub ambient_c: f64,
    pub grouped_circuits: u32,
    #[serde(default)]
    pub insulation: Insulation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ValidationIssue {
    DesignCurrentExceedsDevice { design_current: f64, device_rating: f64 },
    DeviceExceedsCapacity { device_rating: f64, effective_capacity: f64 },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DesignCurrentExceedsDevice {
                design_current,
                device_rating,
            } => write!(
                f,
                "design current {design_current} A exceeds device rating {device_rating} A"
            ),
            Self::DeviceExceedsCapacity {
                device_rating,
                effective_capacity,
            } => write!(
                f,
                "device rating {device_rating} A exceeds corrected capacity {effective_capacity:.2} A"
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CableAssessment {
    pub temperature_factor: f64,
    pub grouping_factor: f64,
    /// `Iz = It × Ca × Cg`.
    pub effective_capacity: f64,
    pub compliant: bool,
    pub issues: Vec<ValidationIssue>,
}

fn require_positive(parameter: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(FlowError::OutOfRange {
            parameter: parameter.to_string(),
            value,
        })
    }
}

/// Check `Ib ≤ In ≤ Iz` after applying ambient and grouping correction.
pub fn check_cable(check: &CableCheck) -> Result<CableAssessment> {
    require_positive("design current", check.design_current)?;
    require_positive("device rating", check.device_rating)?;
    require_positive("tabulated capacity", check.tabulated_capacity)?;

    let ca = temperature_factor(check.ambient_c, check.insulation)?;
    let cg = grouping_factor(check.grouped_circuits)?;
    let effective_capacity = check.tabulated_capacity * ca * cg;

    let mut issues = Vec::new();
    if check.design_current > check.device_rating {
        issues.push(ValidationIssue::DesignCurrentExceedsDevice {
            design_current: check.design_current,
            device_rating: check.device_rating,
        });
    }
    if check.device_rating > effective_capacity {
        issues.push(ValidationIssue::DeviceExceedsCapacity {
            device_rating: check.device_rating,
            effective_capacity,
        });
    }

    debug!(ca, cg, iz = effective_capacity, issues = issues.len(), "cable check");
    Ok(CableAssessment {
        temperature_factor: ca,
        grouping_factor: cg,
        effective_capacity,
        compliant: issues.is_empty(),
        issues,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZsAssessment {
    pub measured: f64,
    pub tabulated_max: f64,
    pub correction: f64,
    /// `tabulated_max × correction`.
    pub limit: f64,
    pub compliant: bool,
    /// `limit - measured`; negative when over the limit.
    pub margin: f64,
}

/// Compare a measured Zs with the corrected tabulated maximum.
#[must_use]
pub fn check_zs(measured: f64, tabulated_max: f64, correction: f64) -> ZsAssessment {
    let limit = tabulated_max * correction;
    ZsAssessment {
        measured,
        tabulated_max,
        correction,
        limit,
        compliant: measured <= limit,
        margin: limit - measured,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(ib: f64, rating: f64, it: f64) -> CableCheck {
        CableCheck {
            design_current: ib,
            device_rating: rating,
            tabulated_capacity: it,
            ambient_c: 30.0,
            grouped_circuits: 1,
            insulation: Insulation::Thermoplastic,
        }
    }

    #[test]
    fn compliant_cable_has_no_issues() {
        let assessment = check_cable(&check(20.0, 32.0, 37.0)).unwrap();
        assert!(assessment.compliant);
        assert!(assessment.issues.is_empty());
        assert!((assessment.effective_capacity - 37.0).abs() < 1e-9);
    }

    #[test]
    fn grouping_can_push_device_over_capacity() {
        let mut input = check(20.0, 32.0, 37.0);
        input.grouped_circuits = 3;
        let assessment = check_cable(&input).unwrap();
        assert!(!assessment.compliant);
        assert!((assessment.effective_capacity - 25.9).abs() < 1e-9);
        assert!(matches!(
            assessment.issues.as_slice(),
            [ValidationIssue::DeviceExceedsCapacity { .. }]
        ));
    }

    #[test]
    fn both_conditions_can_fail() {
        let assessment = check_cable(&check(40.0, 32.0, 27.0)).unwrap();
        assert_eq!(assessment.issues.len(), 2);
        assert!(assessment.issues[0].to_string().contains("design current"));
    }

    #[test]
    fn non_positive_inputs_are_out_of_range() {
        let err = check_cable(&check(0.0, 32.0, 37.0)).unwrap_err();
        assert!(matches!(err, FlowError::OutOfRange { .. }));
        let mut input = check(20.0, 32.0, 37.0);
        input.grouped_circuits = 0;
        assert!(check_cable(&input).is_err());
    }

    #[test]
    fn zs_uses_corrected_limit() {
        let ok = check_zs(1.0, 1.37, DEFAULT_ZS_CORRECTION);
        assert!(ok.compliant);
        assert!((ok.limit - 1.096).abs() < 1e-9);

        let over = check_zs(1.2, 1.37, DEFAULT_ZS_CORRECTION);
        assert!(!over.compliant);
        assert!(over.margin < 0.0);

        let uncorrected = check_zs(1.2, 1.37, 1.0);
        assert!(uncorrected.compliant);
    }
}
