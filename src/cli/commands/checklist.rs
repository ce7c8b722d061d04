//! testflow checklist - Generate and tick pre-start checklists

use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use serde::Serialize;

use crate::app::AppContext;
use crate::checklist::{Checklist, ChecklistItem, SiteVisit};
use crate::cli::output::{HumanLayout, emit_human, emit_json, emit_notice, robot_ok};
use crate::error::{FlowError, Result};
use crate::storage::write_atomic;

#[derive(Args, Debug)]
pub struct ChecklistArgs {
    #[command(subcommand)]
    pub command: ChecklistCommand,
}

#[derive(Subcommand, Debug)]
pub enum ChecklistCommand {
    /// Generate a checklist from a site-visit record
    Generate(GenerateArgs),
    /// Regenerate a saved checklist for an updated visit, keeping ticks
    Regenerate(RegenerateArgs),
    /// Flip the checked state of an item in a saved checklist
    Toggle(ToggleArgs),
    /// Show a saved checklist
    Show(ShowArgs),
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Site-visit record (YAML, or JSON by extension)
    #[arg(long)]
    pub visit: PathBuf,

    /// Write the checklist to this file
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Only include required items
    #[arg(long)]
    pub required_only: bool,
}

#[derive(Args, Debug)]
pub struct RegenerateArgs {
    /// Saved checklist file, updated in place
    pub file: PathBuf,

    /// Updated site-visit record
    #[arg(long)]
    pub visit: PathBuf,
}

#[derive(Args, Debug)]
pub struct ToggleArgs {
    /// Saved checklist file
    pub file: PathBuf,
    pub item_id: String,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Saved checklist file
    pub file: PathBuf,
}

#[derive(Serialize)]
struct ChecklistReport<'a> {
    items: &'a [ChecklistItem],
    total: usize,
    checked: usize,
    outstanding_required: usize,
    ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    saved_to: Option<&'a Path>,
}

impl<'a> ChecklistReport<'a> {
    fn new(checklist: &'a Checklist, saved_to: Option<&'a Path>) -> Self {
        let items = checklist.items();
        Self {
            items,
            total: items.len(),
            checked: items.iter().filter(|item| item.checked).count(),
            outstanding_required: checklist.outstanding_required().len(),
            ready: checklist.is_ready(),
            saved_to,
        }
    }
}

pub fn run(ctx: &AppContext, args: &ChecklistArgs) -> Result<()> {
    match &args.command {
        ChecklistCommand::Generate(generate_args) => generate(ctx, generate_args),
        ChecklistCommand::Regenerate(regenerate_args) => regenerate(ctx, regenerate_args),
        ChecklistCommand::Toggle(toggle_args) => toggle(ctx, toggle_args),
        ChecklistCommand::Show(show_args) => {
            let checklist = load_checklist(&show_args.file)?;
            emit(ctx, &checklist, None)
        }
    }
}

fn generate(ctx: &AppContext, args: &GenerateArgs) -> Result<()> {
    let visit = SiteVisit::load(&args.visit)?;
    let mut checklist = Checklist::generate(&visit);
    if args.required_only || !ctx.config.checklist.include_optional {
        checklist.retain_required();
    }
    if let Some(out) = &args.out {
        save_checklist(out, &checklist)?;
    }
    emit(ctx, &checklist, args.out.as_deref())
}

fn regenerate(ctx: &AppContext, args: &RegenerateArgs) -> Result<()> {
    let mut checklist = load_checklist(&args.file)?;
    let visit = SiteVisit::load(&args.visit)?;
    let mut dropped_checked = checklist.regenerate(&visit);
    if !ctx.config.checklist.include_optional {
        dropped_checked += checklist.retain_required();
    }
    save_checklist(&args.file, &checklist)?;

    let mut warnings = Vec::new();
    if dropped_checked > 0 {
        warnings.push(format!(
            "{dropped_checked} ticked item(s) no longer apply to this visit"
        ));
    }
    emit_with_warnings(ctx, &checklist, Some(args.file.as_path()), warnings)
}

fn toggle(ctx: &AppContext, args: &ToggleArgs) -> Result<()> {
    let mut checklist = load_checklist(&args.file)?;
    checklist.toggle(&args.item_id)?;
    save_checklist(&args.file, &checklist)?;
    emit(ctx, &checklist, Some(args.file.as_path()))
}

fn load_checklist(path: &Path) -> Result<Checklist> {
    if !path.exists() {
        return Err(FlowError::NotFound(format!("checklist {}", path.display())));
    }
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn save_checklist(path: &Path, checklist: &Checklist) -> Result<()> {
    write_atomic(path, &serde_json::to_string_pretty(checklist)?)
}

fn emit(ctx: &AppContext, checklist: &Checklist, saved_to: Option<&Path>) -> Result<()> {
    emit_with_warnings(ctx, checklist, saved_to, Vec::new())
}

fn emit_with_warnings(
    ctx: &AppContext,
    checklist: &Checklist,
    saved_to: Option<&Path>,
    warnings: Vec<String>,
) -> Result<()> {
    let report = ChecklistReport::new(checklist, saved_to);
    if ctx.robot_mode {
        return emit_json(&robot_ok(&report).with_warnings(warnings));
    }
    for warning in &warnings {
        emit_notice(ctx.output_format, "Warning", warning);
    }

    let mut layout = HumanLayout::for_format(ctx.output_format);
    layout.title("Pre-start checklist");
    let mut category: Option<&str> = None;
    for item in report.items {
        if category != Some(item.category.as_str()) {
            if category.is_some() {
                layout.blank();
            }
            layout.section(&item.category);
            category = Some(item.category.as_str());
        }
        let mark = if item.checked { "[x]" } else { "[ ]" };
        let required = if item.required { "" } else { " (optional)" };
        layout.push_line(format!("{mark} {}{required}  {}", item.description, item.id));
    }
    layout.blank();
    layout.kv("Checked", &format!("{}/{}", report.checked, report.total));
    layout.kv(
        "Ready",
        if report.ready {
            "yes"
        } else {
            "no - required items outstanding"
        },
    );
    if let Some(path) = report.saved_to {
        layout.kv("Saved", &path.display().to_string());
    }
    emit_human(layout);
    Ok(())
}
