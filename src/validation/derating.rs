//! BS 7671 Appendix 4 correction factors.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{FlowError, Result};

/// Conductor insulation class, which selects the ambient-temperature table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Insulation {
    /// 70 °C thermoplastic (PVC).
    #[default]
    Thermoplastic,
    /// 90 °C thermosetting (XLPE).
    Thermosetting,
}

impl Insulation {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Thermoplastic => "thermoplastic",
            Self::Thermosetting => "thermosetting",
        }
    }

    const fn table(self) -> &'static [(f64, f64)] {
        match self {
            Self::Thermoplastic => THERMOPLASTIC_70,
            Self::Thermosetting => THERMOSETTING_90,
        }
    }
}

impl fmt::Display for Insulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Insulation {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "thermoplastic" | "pvc" | "70" => Ok(Self::Thermoplastic),
            "thermosetting" | "xlpe" | "90" => Ok(Self::Thermosetting),
            other => Err(FlowError::ValidationFailed(format!(
                "unknown insulation '{other}' (expected thermoplastic or thermosetting)"
            ))),
        }
    }
}

// Table 4B1 rows: (ambient °C, factor).
const THERMOPLASTIC_70: &[(f64, f64)] = &[
    (25.0, 1.03),
    (30.0, 1.00),
    (35.0, 0.94),
    (40.0, 0.87),
    (45.0, 0.79),
    (50.0, 0.71),
    (55.0, 0.61),
    (60.0, 0.50),
];

const THERMOSETTING_90: &[(f64, f64)] = &[
    (25.0, 1.02),
    (30.0, 1.00),
    (35.0, 0.96),
    (40.0, 0.91),
    (45.0, 0.87),
    (50.0, 0.82),
    (55.0, 0.76),
    (60.0, 0.71),
    (65.0, 0.65),
    (70.0, 0.58),
];

// Table 4C1 rows: (circuits, factor). Beyond the last row the factor holds.
const GROUPING: &[(u32, f64)] = &[
    (1, 1.00),
    (2, 0.80),
    (3, 0.70),
    (4, 0.65),
    (5, 0.60),
    (6, 0.57),
    (7, 0.54),
    (8, 0.52),
    (9, 0.50),
    (12, 0.45),
    (16, 0.41),
    (20, 0.38),
];

/// Ambient temperature correction factor `Ca`.
///
/// Rounds up to the next tabulated temperature, so intermediate values get
/// the more conservative factor.
pub fn temperature_factor(ambient_c: f64, insulation: Insulation) -> Result<f64> {
    if !ambient_c.is_finite() {
        return Err(FlowError::OutOfRange {
            parameter: "ambient temperature".to_string(),
            value: ambient_c,
        });
    }
    insulation
        .table()
        .iter()
        .find(|(temperature, _)| ambient_c <= *temperature)
        .map(|(_, factor)| *factor)
        .ok_or_else(|| FlowError::OutOfRange {
            parameter: "ambient temperature".to_string(),
            value: ambient_c,
        })
}

/// Grouping correction factor `Cg` for bunched circuits.
pub fn grouping_factor(circuits: u32) -> Result<f64> {
    if circuits == 0 {
        return Err(FlowError::OutOfRange {
            parameter: "grouped circuits".to_string(),
            value: 0.0,
        });
    }
    let factor = GROUPING
        .iter()
        .find(|(count, _)| circuits <= *count)
        .map_or(0.38, |(_, factor)| *factor);
    Ok(factor)
}
