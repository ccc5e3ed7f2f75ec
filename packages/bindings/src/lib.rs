use napi::Result as NapiResult;
use napi_derive::napi;

use land_monetization_core::parcels::{self, InMemoryParcels, Parcel};
use land_monetization_core::simulator::{self, ScenarioKind, ScenarioParameters, SimulationRequest};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse_kind(kind: &str) -> NapiResult<ScenarioKind> {
    kind.parse().map_err(to_napi_error)
}

/// Parse an optional JSON patch; an empty string means no overrides.
fn parse_patch(patch_json: &str) -> NapiResult<serde_json::Value> {
    if patch_json.trim().is_empty() {
        return Ok(serde_json::Value::Null);
    }
    serde_json::from_str(patch_json).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

/// `{ "scenario_kind": "...", "parameters": { ... } }` in, result envelope out.
#[napi]
pub fn simulate(input_json: String) -> NapiResult<String> {
    let request: SimulationRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = simulator::run_simulation(&request).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn simulate_with_overrides(kind: String, patch_json: String) -> NapiResult<String> {
    let kind = parse_kind(&kind)?;
    let patch = parse_patch(&patch_json)?;
    let output = simulator::simulate_with_overrides(kind, &patch).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn scenario_defaults(kind: String) -> NapiResult<String> {
    let kind = parse_kind(&kind)?;
    let record = ScenarioParameters::defaults(kind)
        .to_record()
        .map_err(to_napi_error)?;
    serde_json::to_string(&record).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Sweep
// ---------------------------------------------------------------------------

#[napi]
pub fn sweep_parameter(input_json: String) -> NapiResult<String> {
    let input: land_monetization_core::sweep::SweepInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = land_monetization_core::sweep::sweep_parameter(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Parcels
// ---------------------------------------------------------------------------

#[derive(serde::Deserialize)]
struct ParcelBindingInput {
    parcels: Vec<Parcel>,
    id: String,
    scenario_kind: ScenarioKind,
    #[serde(default)]
    overrides: serde_json::Value,
}

#[napi]
pub fn simulate_parcel(input_json: String) -> NapiResult<String> {
    let binding_input: ParcelBindingInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let provider = InMemoryParcels::new(binding_input.parcels);
    let output = parcels::simulate_parcel(
        &provider,
        &binding_input.id,
        binding_input.scenario_kind,
        &binding_input.overrides,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
