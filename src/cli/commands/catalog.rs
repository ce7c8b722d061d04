//! testflow catalog - List and inspect step catalogs

use clap::{Args, Subcommand};
use serde::Serialize;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, emit_json, robot_ok};
use crate::error::Result;
use crate::flow::StepCatalog;

#[derive(Args, Debug)]
pub struct CatalogArgs {
    #[command(subcommand)]
    pub command: CatalogCommand,
}

#[derive(Subcommand, Debug)]
pub enum CatalogCommand {
    /// List built-in catalogs
    List,
    /// Show the steps of a catalog
    Show(CatalogShowArgs),
}

#[derive(Args, Debug)]
pub struct CatalogShowArgs {
    /// Built-in catalog id or path to a YAML/JSON catalog file
    pub catalog: String,
}

#[derive(Serialize)]
struct CatalogEntry {
    id: String,
    name: String,
    steps: usize,
    default: bool,
}

pub fn run(ctx: &AppContext, args: &CatalogArgs) -> Result<()> {
    match &args.command {
        CatalogCommand::List => list(ctx),
        CatalogCommand::Show(show_args) => show(ctx, show_args),
    }
}

fn list(ctx: &AppContext) -> Result<()> {
    let entries: Vec<CatalogEntry> = StepCatalog::builtin_ids()
        .iter()
        .filter_map(|id| StepCatalog::builtin(id))
        .map(|catalog| CatalogEntry {
            default: catalog.id() == ctx.config.flow.default_catalog,
            id: catalog.id().to_string(),
            name: catalog.name().to_string(),
            steps: catalog.len(),
        })
        .collect();

    if ctx.robot_mode {
        return emit_json(&robot_ok(entries));
    }

    let mut layout = HumanLayout::for_format(ctx.output_format);
    layout.title("Catalogs");
    for entry in &entries {
        let marker = if entry.default { " (default)" } else { "" };
        layout.kv(
            &entry.id,
            &format!("{} - {} steps{marker}", entry.name, entry.steps),
        );
    }
    emit_human(layout);
    Ok(())
}

fn show(ctx: &AppContext, args: &CatalogShowArgs) -> Result<()> {
    let catalog = StepCatalog::resolve(&args.catalog)?;

    if ctx.robot_mode {
        return emit_json(&robot_ok(&catalog));
    }

    let mut layout = HumanLayout::for_format(ctx.output_format);
    layout.title(&format!("{} ({})", catalog.name(), catalog.id()));
    for (index, step) in catalog.steps().iter().enumerate() {
        let mut line = format!("{:>2}. {} [{}]", index + 1, step.title, step.id);
        if let Some(regulation) = &step.regulation {
            line.push_str(&format!(" - {regulation}"));
        }
        layout.push_line(line);
        if let Some(expected) = &step.expected {
            let bounds = match (expected.min, expected.max) {
                (Some(min), Some(max)) => format!("{min} to {max} {}", expected.unit),
                (Some(min), None) => format!(">= {min} {}", expected.unit),
                (None, Some(max)) => format!("<= {max} {}", expected.unit),
                (None, None) => expected.unit.clone(),
            };
            layout.push_line(format!("      expected: {bounds}"));
        }
    }
    emit_human(layout);
    Ok(())
}
