use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::SimulationError;
use crate::simulator::{ScenarioKind, ScenarioParameters};
use crate::types::*;
use crate::SimResult;

/// Upper bound on grid size so a tiny step cannot run away.
pub const MAX_SWEEP_POINTS: usize = 1000;

/// Input for a one-variable sensitivity sweep
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepInput {
    pub scenario_kind: ScenarioKind,
    /// Overrides applied to the scenario defaults before sweeping
    #[serde(default)]
    pub base_overrides: serde_json::Value,
    pub variable: SweepVariable,
}

/// One evaluated grid point
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepPoint {
    pub value: Decimal,
    pub npv: Money,
    pub irr: Option<Rate>,
    pub payback_year: Option<u32>,
    pub feasible: bool,
}

/// Output of a one-variable sweep
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepOutput {
    pub scenario_kind: ScenarioKind,
    pub variable_name: String,
    pub points: Vec<SweepPoint>,
    /// First swept value whose feasibility differs from the first point's
    pub feasibility_flip_at: Option<Decimal>,
}

/// Generate the sweep values from min to max with step.
fn generate_sweep_values(var: &SweepVariable) -> SimResult<Vec<Decimal>> {
    if var.step <= Decimal::ZERO {
        return Err(SimulationError::InvalidInput {
            field: format!("variable:{}", var.name),
            reason: "Step must be positive".into(),
        });
    }
    if var.min > var.max {
        return Err(SimulationError::InvalidInput {
            field: format!("variable:{}", var.name),
            reason: "Min must be <= max".into(),
        });
    }

    let mut values = Vec::new();
    let mut current = var.min;
    while current <= var.max {
        values.push(current);
        if values.len() > MAX_SWEEP_POINTS {
            return Err(SimulationError::InvalidInput {
                field: format!("variable:{}", var.name),
                reason: format!("Sweep would exceed {MAX_SWEEP_POINTS} points; widen the step"),
            });
        }
        current += var.step;
    }
    // Ensure max is included if step doesn't land exactly on it
    if let Some(&last) = values.last() {
        if last < var.max {
            values.push(var.max);
        }
    }

    Ok(values)
}

/// Set `name` to `value` in a JSON override object, creating it if needed.
///
/// Integer fields (term lengths) receive a JSON integer; everything else is
/// written as a decimal string so no precision is lost.
fn set_override(patch: &mut serde_json::Value, name: &str, value: Decimal) {
    if !patch.is_object() {
        *patch = serde_json::Value::Object(serde_json::Map::new());
    }
    let json_value = match value.to_u64() {
        Some(n) if value.fract().is_zero() && is_integer_field(name) => serde_json::Value::from(n),
        _ => serde_json::Value::String(value.to_string()),
    };
    if let Some(map) = patch.as_object_mut() {
        map.insert(name.to_string(), json_value);
    }
}

fn is_integer_field(name: &str) -> bool {
    matches!(name, "lease_years" | "term_years" | "construction_years")
}

/// Re-simulate a scenario across a range of values for one parameter.
///
/// Each point is rebuilt from the scenario defaults plus `base_overrides`
/// plus the swept value, so every point is a complete simulation.
pub fn sweep_parameter(input: &SweepInput) -> SimResult<ComputationOutput<SweepOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let values = generate_sweep_values(&input.variable)?;

    let mut points = Vec::with_capacity(values.len());
    for value in &values {
        let mut patch = input.base_overrides.clone();
        set_override(&mut patch, &input.variable.name, *value);

        let params = ScenarioParameters::with_overrides(input.scenario_kind, &patch)?;
        let output = crate::simulator::simulate(&params)?;
        for w in output.warnings {
            if !warnings.contains(&w) {
                warnings.push(w);
            }
        }

        let res = output.result;
        points.push(SweepPoint {
            value: *value,
            npv: res.npv,
            irr: res.irr,
            payback_year: res.payback_year,
            feasible: res.feasible,
        });
    }

    let feasibility_flip_at = points.first().and_then(|first| {
        points
            .iter()
            .find(|p| p.feasible != first.feasible)
            .map(|p| p.value)
    });

    let output = SweepOutput {
        scenario_kind: input.scenario_kind,
        variable_name: input.variable.name.clone(),
        points,
        feasibility_flip_at,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "One-Way Parameter Sweep",
        &serde_json::json!({
            "scenario_kind": input.scenario_kind,
            "variable": input.variable.name,
            "min": input.variable.min.to_string(),
            "max": input.variable.max.to_string(),
            "step": input.variable.step.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}
