//! Per-invocation context shared by every CLI command.

use std::path::PathBuf;

use tracing::debug;

use crate::cli::{Cli, OutputFormat};
use crate::config::Config;
use crate::error::Result;
use crate::flow::{EngineOptions, EventLog, StepCatalog, TestFlowEngine, TracingObserver};
use crate::storage::SessionStore;

pub struct AppContext {
    pub config: Config,
    /// Project config file written by `config <key> <value>`.
    pub config_path: PathBuf,
    pub store: SessionStore,
    pub robot_mode: bool,
    pub output_format: OutputFormat,
}

impl AppContext {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let data_root = resolve_data_root(cli.root.clone());
        let config = Config::load(cli.config.as_deref(), &data_root)?;
        let output_format = OutputFormat::from_args(cli.robot, cli.output_format, &config.output.format);
        let config_path = cli
            .config
            .clone()
            .unwrap_or_else(|| data_root.join("config.toml"));
        debug!(root = %data_root.display(), ?output_format, "app context ready");

        Ok(Self {
            store: SessionStore::new(&data_root),
            config,
            config_path,
            robot_mode: output_format.is_machine_readable(),
            output_format,
        })
    }

    #[must_use]
    pub const fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            strict_step_ids: self.config.flow.strict_step_ids,
        }
    }

    /// Engine for the saved state, or a fresh one over the default catalog.
    pub fn load_engine(&self, events: &EventLog) -> Result<TestFlowEngine> {
        let engine = match self.store.load_state()? {
            Some(state) => TestFlowEngine::from_state(state)?,
            None => TestFlowEngine::new(StepCatalog::resolve(&self.config.flow.default_catalog)?),
        };
        Ok(self.wire(engine, events))
    }

    /// Fresh engine over `catalog`.
    #[must_use]
    pub fn new_engine(&self, catalog: StepCatalog, events: &EventLog) -> TestFlowEngine {
        self.wire(TestFlowEngine::new(catalog), events)
    }

    fn wire(&self, engine: TestFlowEngine, events: &EventLog) -> TestFlowEngine {
        engine
            .with_options(self.engine_options())
            .with_observer(TracingObserver)
            .with_observer(events.clone())
    }
}

fn resolve_data_root(explicit: Option<PathBuf>) -> PathBuf {
    explicit
        .or_else(|| dirs::data_dir().map(|dir| dir.join("testflow")))
        .unwrap_or_else(|| PathBuf::from(".testflow"))
}
