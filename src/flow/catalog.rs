//! Step catalogs: the ordered inspection steps a session walks through.
//!
//! Catalogs are configuration input. They load from YAML or JSON files, or
//! come from the built-in set (`eicr`, `minor-works`).

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{FlowError, Result};
use crate::flow::results::TestOutcome;

/// One step in an inspection flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDefinition {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Regulation reference, e.g. "BS 7671 643.3".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regulation: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub instructions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<ExpectedReading>,
}

/// Acceptable bounds for a measured value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectedReading {
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl ExpectedReading {
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }
}

impl StepDefinition {
    /// Bare step with only an id and a title.
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            category: None,
            regulation: None,
            instructions: Vec::new(),
            expected: None,
        }
    }

    #[must_use]
    pub fn with_expected(mut self, unit: &str, min: Option<f64>, max: Option<f64>) -> Self {
        self.expected = Some(ExpectedReading {
            unit: unit.to_string(),
            min,
            max,
        });
        self
    }

    /// Assess a measured value against the step's expected range.
    ///
    /// Returns `None` when the step declares no range.
    #[must_use]
    pub fn assess(&self, value: f64) -> Option<TestOutcome> {
        self.expected.as_ref().map(|expected| {
            if expected.contains(value) {
                TestOutcome::Pass
            } else {
                TestOutcome::Fail
            }
        })
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    steps: Vec<StepDefinition>,
}

impl TryFrom<CatalogFile> for StepCatalog {
    type Error = FlowError;

    fn try_from(file: CatalogFile) -> Result<Self> {
        let name = if file.name.is_empty() {
            file.id.clone()
        } else {
            file.name
        };
        Self::new(file.id, name, file.steps)
    }
}

/// Non-empty ordered list of steps with unique ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CatalogFile")]
pub struct StepCatalog {
    id: String,
    name: String,
    steps: Vec<StepDefinition>,
}

impl StepCatalog {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        steps: Vec<StepDefinition>,
    ) -> Result<Self> {
        let id = id.into();
        if steps.is_empty() {
            return Err(FlowError::EmptyCatalog(id));
        }
        let mut seen = HashSet::with_capacity(steps.len());
        for step in &steps {
            if step.id.trim().is_empty() {
                return Err(FlowError::InvalidCatalog(format!(
                    "catalog '{id}' has a step with a blank id"
                )));
            }
            if !seen.insert(step.id.as_str()) {
                return Err(FlowError::InvalidCatalog(format!(
                    "catalog '{id}' repeats step id '{}'",
                    step.id
                )));
            }
        }
        Ok(Self {
            id,
            name: name.into(),
            steps,
        })
    }

    /// Load a catalog file; `.json` is parsed as JSON, anything else as YAML.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|err| {
            FlowError::CatalogNotFound(format!("{}: {err}", path.display()))
        })?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let catalog: Self = if is_json {
            serde_json::from_str(&raw)?
        } else {
            serde_yaml::from_str(&raw)?
        };
        debug!(catalog = %catalog.id, steps = catalog.len(), "loaded catalog from {}", path.display());
        Ok(catalog)
    }

    /// Resolve a built-in catalog id, falling back to a file path.
    pub fn resolve(name: &str) -> Result<Self> {
        if let Some(catalog) = Self::builtin(name) {
            return Ok(catalog);
        }
        let path = Path::new(name);
        if path.is_file() {
            return Self::load(path);
        }
        Err(FlowError::CatalogNotFound(name.to_string()))
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn steps(&self) -> &[StepDefinition] {
        &self.steps
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Always false; kept for the `len`/`is_empty` pairing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&StepDefinition> {
        self.steps.get(index)
    }

    #[must_use]
    pub fn position(&self, step_id: &str) -> Option<usize> {
        self.steps.iter().position(|step| step.id == step_id)
    }

    #[must_use]
    pub fn step(&self, step_id: &str) -> Option<&StepDefinition> {
        self.steps.iter().find(|step| step.id == step_id)
    }

    #[must_use]
    pub fn contains(&self, step_id: &str) -> bool {
        self.position(step_id).is_some()
    }

    /// Ids of the built-in catalogs.
    #[must_use]
    pub const fn builtin_ids() -> &'static [&'static str] {
        &["eicr", "minor-works"]
    }

    #[must_use]
    pub fn builtin(id: &str) -> Option<Self> {
        let (name, steps) = match id {
            "eicr" => ("Electrical Installation Condition Report", eicr_steps()),
            "minor-works" => ("Minor Electrical Installation Works", minor_works_steps()),
            _ => return None,
        };
        Self::new(id, name, steps).ok()
    }
}

fn step(id: &str, title: &str, category: &str, regulation: &str) -> StepDefinition {
    let mut def = StepDefinition::new(id, title);
    def.category = Some(category.to_string());
    def.regulation = Some(regulation.to_string());
    def
}

fn safe_isolation() -> StepDefinition {
    let mut def = step("safe-isolation", "Safe isolation and proving dead", "Preparation", "GS38");
    def.instructions = vec![
        "Prove the voltage indicator on a known source".to_string(),
        "Isolate, lock off and test between all conductors".to_string(),
        "Re-prove the voltage indicator".to_string(),
    ];
    def
}

fn eicr_steps() -> Vec<StepDefinition> {
    vec![
        safe_isolation(),
        step("continuity-cpc", "Continuity of protective conductors (R1+R2)", "Dead tests", "BS 7671 643.2.1"),
        step("ring-continuity", "Continuity of ring final circuit conductors", "Dead tests", "BS 7671 643.2.1"),
        step("insulation-resistance", "Insulation resistance", "Dead tests", "BS 7671 643.3")
            .with_expected("MΩ", Some(1.0), None),
        step("polarity", "Polarity", "Dead tests", "BS 7671 643.6"),
        step("earth-electrode", "Earth electrode resistance", "Live tests", "BS 7671 643.7.2")
            .with_expected("Ω", None, Some(200.0)),
        step("ze", "External earth fault loop impedance (Ze)", "Live tests", "BS 7671 643.7.3")
            .with_expected("Ω", None, Some(0.8)),
        step("zs", "Earth fault loop impedance (Zs)", "Live tests", "BS 7671 643.7.3"),
        step("pfc", "Prospective fault current", "Live tests", "BS 7671 643.7.3.201"),
        step("rcd", "RCD operation at rated residual current", "Live tests", "BS 7671 643.8")
            .with_expected("ms", None, Some(300.0)),
        step("functional", "Functional testing of assemblies", "Live tests", "BS 7671 643.10"),
    ]
}

fn minor_works_steps() -> Vec<StepDefinition> {
    vec![
        safe_isolation(),
        step("continuity-cpc", "Continuity of protective conductors (R1+R2)", "Dead tests", "BS 7671 643.2.1"),
        step("insulation-resistance", "Insulation resistance", "Dead tests", "BS 7671 643.3")
            .with_expected("MΩ", Some(1.0), None),
        step("polarity", "Polarity", "Dead tests", "BS 7671 643.6"),
        step("zs", "Earth fault loop impedance (Zs)", "Live tests", "BS 7671 643.7.3"),
        step("rcd", "RCD operation at rated residual current", "Live tests", "BS 7671 643.8")
            .with_expected("ms", None, Some(300.0)),
        step("functional", "Functional testing of assemblies", "Live tests", "BS 7671 643.10"),
    ]
}
