//! testflow validate - Cable capacity and earth fault loop impedance checks

use clap::{Args, Subcommand};

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, emit_json, robot_ok};
use crate::error::Result;
use crate::validation::{CableCheck, Insulation, check_cable, check_zs};

#[derive(Args, Debug)]
pub struct ValidateArgs {
    #[command(subcommand)]
    pub command: ValidateCommand,
}

#[derive(Subcommand, Debug)]
pub enum ValidateCommand {
    /// Check Ib <= In <= Iz after ambient and grouping correction
    Cable(CableArgs),
    /// Compare a measured Zs with the corrected tabulated maximum
    Zs(ZsArgs),
}

#[derive(Args, Debug)]
pub struct CableArgs {
    /// Design current Ib (A)
    #[arg(long = "ib")]
    pub design_current: f64,

    /// Protective device rating In (A)
    #[arg(long = "in")]
    pub device_rating: f64,

    /// Tabulated current-carrying capacity It (A)
    #[arg(long = "it")]
    pub tabulated_capacity: f64,

    /// Ambient temperature (°C)
    #[arg(long, default_value = "30")]
    pub ambient: f64,

    /// Number of grouped circuits
    #[arg(long, default_value = "1")]
    pub grouped: u32,

    /// Insulation: thermoplastic (70 °C) or thermosetting (90 °C)
    #[arg(long)]
    pub insulation: Option<Insulation>,
}

#[derive(Args, Debug)]
pub struct ZsArgs {
    /// Measured Zs (Ω)
    #[arg(long)]
    pub measured: f64,

    /// Tabulated maximum Zs for the protective device (Ω)
    #[arg(long)]
    pub max: f64,

    /// Correction factor (default: validation.zs_correction_factor)
    #[arg(long)]
    pub correction: Option<f64>,
}

pub fn run(ctx: &AppContext, args: &ValidateArgs) -> Result<()> {
    match &args.command {
        ValidateCommand::Cable(cable_args) => cable(ctx, cable_args),
        ValidateCommand::Zs(zs_args) => zs(ctx, zs_args),
    }
}

fn cable(ctx: &AppContext, args: &CableArgs) -> Result<()> {
    let check = CableCheck {
        design_current: args.design_current,
        device_rating: args.device_rating,
        tabulated_capacity: args.tabulated_capacity,
        ambient_c: args.ambient,
        grouped_circuits: args.grouped,
        insulation: args
            .insulation
            .unwrap_or(ctx.config.validation.default_insulation),
    };
    let assessment = check_cable(&check)?;

    if ctx.robot_mode {
        return emit_json(&robot_ok(serde_json::json!({
            "input": check,
            "assessment": assessment,
        })));
    }

    let mut layout = HumanLayout::for_format(ctx.output_format);
    layout.title("Cable check");
    layout.kv("Insulation", check.insulation.as_str());
    layout.kv("Ca", &format!("{:.2}", assessment.temperature_factor));
    layout.kv("Cg", &format!("{:.2}", assessment.grouping_factor));
    layout.kv("Iz", &format!("{:.2} A", assessment.effective_capacity));
    layout.kv(
        "Result",
        if assessment.compliant {
            "compliant"
        } else {
            "NOT compliant"
        },
    );
    for issue in &assessment.issues {
        layout.bullet(&issue.to_string());
    }
    emit_human(layout);
    Ok(())
}

fn zs(ctx: &AppContext, args: &ZsArgs) -> Result<()> {
    let correction = args
        .correction
        .unwrap_or(ctx.config.validation.zs_correction_factor);
    let assessment = check_zs(args.measured, args.max, correction);

    if ctx.robot_mode {
        return emit_json(&robot_ok(&assessment));
    }

    let mut layout = HumanLayout::for_format(ctx.output_format);
    layout.title("Zs check");
    layout.kv("Measured", &format!("{:.2} Ω", assessment.measured));
    layout.kv(
        "Limit",
        &format!(
            "{:.2} Ω ({:.2} × {:.2})",
            assessment.limit, assessment.tabulated_max, assessment.correction
        ),
    );
    layout.kv("Margin", &format!("{:.2} Ω", assessment.margin));
    layout.kv(
        "Result",
        if assessment.compliant {
            "compliant"
        } else {
            "NOT compliant"
        },
    );
    emit_human(layout);
    Ok(())
}
