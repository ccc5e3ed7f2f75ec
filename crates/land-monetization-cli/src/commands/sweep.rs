use clap::Args;
use serde_json::Value;

use land_monetization_core::simulator::ScenarioKind;
use land_monetization_core::sweep::{self, SweepInput};
use land_monetization_core::SweepVariable;

use crate::input;

/// Arguments for a one-variable sensitivity sweep
#[derive(Args)]
pub struct SweepArgs {
    /// Scenario kind: leaseholdCondo, landSwap, masterLease
    #[arg(long)]
    pub kind: String,

    /// Swept parameter in format name:min:max:step
    /// (e.g. "developer_margin_rate:0.10:0.30:0.05")
    #[arg(long)]
    pub var: String,

    /// Path to a JSON or YAML file of base overrides
    #[arg(long)]
    pub input: Option<String>,

    /// Override a base parameter, e.g. --set far=600 (repeatable)
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,
}

fn parse_sweep_var(spec: &str) -> Result<SweepVariable, Box<dyn std::error::Error>> {
    let parts: Vec<&str> = spec.split(':').collect();
    if parts.len() != 4 {
        return Err(format!("Sweep variable must be name:min:max:step, got '{}'", spec).into());
    }
    Ok(SweepVariable {
        name: parts[0].to_string(),
        min: parts[1].parse()?,
        max: parts[2].parse()?,
        step: parts[3].parse()?,
    })
}

pub fn run_sweep(args: SweepArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let scenario_kind: ScenarioKind = args.kind.parse()?;
    let variable = parse_sweep_var(&args.var)?;

    let document = input::load_document(args.input.as_deref())?;
    let base_overrides = input::apply_sets(document, &args.set)?;

    let result = sweep::sweep_parameter(&SweepInput {
        scenario_kind,
        base_overrides,
        variable,
    })?;
    Ok(serde_json::to_value(result)?)
}
