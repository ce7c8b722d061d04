use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{FlowError, Result};
use crate::validation::{DEFAULT_ZS_CORRECTION, Insulation};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub flow: FlowConfig,
    #[serde(default)]
    pub checklist: ChecklistConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Defaults, then TOML patches, then `TESTFLOW_*` environment overrides.
    ///
    /// An explicit path (or `TESTFLOW_CONFIG`) replaces the global and
    /// project files rather than layering over them.
    pub fn load(explicit_path: Option<&Path>, data_root: &Path) -> Result<Self> {
        let mut config = Self::default();

        let explicit = explicit_path
            .map(PathBuf::from)
            .or_else(|| std::env::var("TESTFLOW_CONFIG").ok().map(PathBuf::from));

        if let Some(path) = explicit {
            match Self::load_patch(&path)? {
                Some(patch) => config.merge_patch(patch),
                None => {
                    return Err(FlowError::MissingConfig(format!(
                        "config file {} does not exist",
                        path.display()
                    )));
                }
            }
        } else {
            if let Some(global) = Self::load_global()? {
                config.merge_patch(global);
            }
            if let Some(project) = Self::load_project(data_root)? {
                config.merge_patch(project);
            }
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Check that `raw` would load cleanly as a config file over the defaults.
    pub fn validate_file_contents(raw: &str) -> Result<()> {
        let patch: ConfigPatch =
            toml::from_str(raw).map_err(|err| FlowError::Config(format!("parse config: {err}")))?;
        let mut config = Self::default();
        config.merge_patch(patch);
        config.validate()
    }

    /// `~/.config/testflow/config.toml` on Linux.
    #[must_use]
    pub fn global_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("testflow/config.toml"))
    }

    fn load_global() -> Result<Option<ConfigPatch>> {
        match Self::global_path() {
            Some(path) => Self::load_patch(&path),
            None => {
                debug!("no user config directory; skipping global config");
                Ok(None)
            }
        }
    }

    fn load_project(data_root: &Path) -> Result<Option<ConfigPatch>> {
        let path = data_root.join("config.toml");
        Self::load_patch(&path)
    }

    fn load_patch(path: &Path) -> Result<Option<ConfigPatch>> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|err| FlowError::Config(format!("read config {}: {err}", path.display())))?;
        let patch = toml::from_str(&raw)
            .map_err(|err| FlowError::Config(format!("parse config {}: {err}", path.display())))?;
        debug!(path = %path.display(), "applied config file");
        Ok(Some(patch))
    }

    fn merge_patch(&mut self, patch: ConfigPatch) {
        if let Some(patch) = patch.flow {
            self.flow.merge(patch);
        }
        if let Some(patch) = patch.checklist {
            self.checklist.merge(patch);
        }
        if let Some(patch) = patch.validation {
            self.validation.merge(patch);
        }
        if let Some(patch) = patch.output {
            self.output.merge(patch);
        }
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if env_bool("TESTFLOW_ROBOT").unwrap_or(false) {
            self.output.format = "json".to_string();
        }

        if let Some(value) = env_bool("TESTFLOW_FLOW_STRICT_STEP_IDS") {
            self.flow.strict_step_ids = value;
        }
        if let Some(value) = env_string("TESTFLOW_FLOW_DEFAULT_CATALOG") {
            self.flow.default_catalog = value;
        }

        if let Some(value) = env_bool("TESTFLOW_CHECKLIST_INCLUDE_OPTIONAL") {
            self.checklist.include_optional = value;
        }

        if let Some(value) = env_f64("TESTFLOW_VALIDATION_ZS_CORRECTION")? {
            self.validation.zs_correction_factor = value;
        }
        if let Some(value) = env_string("TESTFLOW_VALIDATION_DEFAULT_INSULATION") {
            self.validation.default_insulation = value.parse().map_err(|_| {
                FlowError::Config(format!(
                    "invalid TESTFLOW_VALIDATION_DEFAULT_INSULATION value {value}"
                ))
            })?;
        }

        if let Some(value) = env_string("TESTFLOW_OUTPUT_FORMAT") {
            self.output.format = value;
        }

        Ok(())
    }

    fn validate(&self) -> Result<()> {
        let factor = self.validation.zs_correction_factor;
        if !(factor > 0.0 && factor <= 1.0) {
            return Err(FlowError::Config(format!(
                "validation.zs_correction_factor must be in (0, 1], got {factor}"
            )));
        }
        if self.flow.default_catalog.trim().is_empty() {
            return Err(FlowError::Config(
                "flow.default_catalog must not be empty".to_string(),
            ));
        }
        if !matches!(self.output.format.as_str(), "human" | "json" | "plain") {
            return Err(FlowError::Config(format!(
                "output.format must be human, json or plain, got {}",
                self.output.format
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowConfig {
    /// Reject results for step ids outside the catalog.
    #[serde(default)]
    pub strict_step_ids: bool,
    #[serde(default)]
    pub default_catalog: String,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            strict_step_ids: false,
            default_catalog: "eicr".to_string(),
        }
    }
}

impl FlowConfig {
    fn merge(&mut self, patch: FlowPatch) {
        if let Some(value) = patch.strict_step_ids {
            self.strict_step_ids = value;
        }
        if let Some(value) = patch.default_catalog {
            self.default_catalog = value;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistConfig {
    #[serde(default)]
    pub include_optional: bool,
}

impl Default for ChecklistConfig {
    fn default() -> Self {
        Self {
            include_optional: true,
        }
    }
}

impl ChecklistConfig {
    fn merge(&mut self, patch: ChecklistPatch) {
        if let Some(value) = patch.include_optional {
            self.include_optional = value;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationConfig {
    #[serde(default)]
    pub zs_correction_factor: f64,
    #[serde(default)]
    pub default_insulation: Insulation,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            zs_correction_factor: DEFAULT_ZS_CORRECTION,
            default_insulation: Insulation::Thermoplastic,
        }
    }
}

impl ValidationConfig {
    fn merge(&mut self, patch: ValidationPatch) {
        if let Some(value) = patch.zs_correction_factor {
            self.zs_correction_factor = value;
        }
        if let Some(value) = patch.default_insulation {
            self.default_insulation = value;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "human".to_string(),
        }
    }
}

impl OutputConfig {
    fn merge(&mut self, patch: OutputPatch) {
        if let Some(value) = patch.format {
            self.format = value;
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigPatch {
    pub flow: Option<FlowPatch>,
    pub checklist: Option<ChecklistPatch>,
    pub validation: Option<ValidationPatch>,
    pub output: Option<OutputPatch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FlowPatch {
    pub strict_step_ids: Option<bool>,
    pub default_catalog: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ChecklistPatch {
    pub include_optional: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ValidationPatch {
    pub zs_correction_factor: Option<f64>,
    pub default_insulation: Option<Insulation>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct OutputPatch {
    pub format: Option<String>,
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key).ok().map(|value| {
        matches!(
            value.to_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        )
    })
}

fn env_f64(key: &str) -> Result<Option<f64>> {
    match std::env::var(key) {
        Ok(value) => value.parse::<f64>().map(Some).map_err(|err| {
            FlowError::Config(format!("invalid {key} value {value}: {err}"))
        }),
        Err(_) => Ok(None),
    }
}
