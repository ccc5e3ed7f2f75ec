use clap::Args;
use serde_json::Value;
use tracing::debug;

use land_monetization_core::simulator::{
    run_simulation, ScenarioKind, ScenarioParameters, SimulationRequest,
};

use crate::input;

/// Arguments for a single simulation
#[derive(Args)]
pub struct SimulateArgs {
    /// Scenario kind: leaseholdCondo, landSwap, masterLease.
    /// Optional when the input document carries its own scenario_kind.
    #[arg(long)]
    pub kind: Option<String>,

    /// Path to a JSON or YAML parameter file
    #[arg(long)]
    pub input: Option<String>,

    /// Override a single parameter, e.g. --set lease_years=50 (repeatable)
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,
}

/// Arguments for printing a scenario's default parameters
#[derive(Args)]
pub struct DefaultsArgs {
    /// Scenario kind: leaseholdCondo, landSwap, masterLease
    #[arg(long)]
    pub kind: String,
}

pub fn run_simulate(args: SimulateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let document = input::load_document(args.input.as_deref())?;
    let mut request = build_request(args.kind, document)?;
    request.parameters = input::apply_sets(request.parameters, &args.set)?;

    debug!(kind = %request.scenario_kind, "running simulation from CLI");
    let result = run_simulation(&request)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_defaults(args: DefaultsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let kind: ScenarioKind = args.kind.parse()?;
    let params = ScenarioParameters::defaults(kind);
    Ok(serde_json::json!({
        "scenario_kind": kind,
        "parameters": params.to_record()?,
    }))
}

/// Accept either a bare parameter record or a full
/// `{ "scenario_kind": ..., "parameters": ... }` request document.
/// An explicit `--kind` always wins over the document's tag.
fn build_request(
    kind: Option<String>,
    document: Value,
) -> Result<SimulationRequest, Box<dyn std::error::Error>> {
    let is_request = document
        .as_object()
        .is_some_and(|m| m.contains_key("scenario_kind"));

    if is_request {
        let mut request: SimulationRequest = serde_json::from_value(document)?;
        if let Some(kind) = kind {
            request.scenario_kind = kind;
        }
        return Ok(request);
    }

    let scenario_kind = kind.ok_or("--kind is required unless the input names a scenario_kind")?;
    Ok(SimulationRequest {
        scenario_kind,
        parameters: document,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bare_record_needs_kind() {
        assert!(build_request(None, json!({ "lease_years": 50 })).is_err());

        let request = build_request(Some("leaseholdCondo".into()), json!({ "lease_years": 50 })).unwrap();
        assert_eq!(request.scenario_kind, "leaseholdCondo");
        assert_eq!(request.parameters, json!({ "lease_years": 50 }));
    }

    #[test]
    fn test_request_document_and_kind_override() {
        let doc = json!({ "scenario_kind": "landSwap", "parameters": { "far": 500 } });

        let request = build_request(None, doc.clone()).unwrap();
        assert_eq!(request.scenario_kind, "landSwap");

        let request = build_request(Some("masterLease".into()), doc).unwrap();
        assert_eq!(request.scenario_kind, "masterLease");
    }

    #[test]
    fn test_defaults_output_shape() {
        let value = run_defaults(DefaultsArgs {
            kind: "master_lease".into(),
        })
        .unwrap();
        assert_eq!(value["scenario_kind"], "masterLease");
        assert_eq!(value["parameters"]["term_years"], 20);
    }
}
