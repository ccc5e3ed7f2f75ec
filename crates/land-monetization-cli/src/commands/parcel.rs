use clap::Args;
use serde_json::Value;
use tracing::debug;

use land_monetization_core::parcels::{simulate_parcel, InMemoryParcels, Parcel};
use land_monetization_core::simulator::ScenarioKind;

use crate::input;

/// Arguments for simulating a scenario on a stored parcel
#[derive(Args)]
pub struct ParcelArgs {
    /// JSON or YAML file holding an array of parcels
    #[arg(long)]
    pub parcels: String,

    /// Parcel id to simulate
    #[arg(long)]
    pub id: String,

    /// Scenario kind: leaseholdCondo, landSwap, masterLease
    #[arg(long)]
    pub kind: String,

    /// Path to a JSON or YAML file of parameter overrides
    #[arg(long)]
    pub input: Option<String>,

    /// Override a single parameter (repeatable)
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,
}

pub fn run_parcel(args: ParcelArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let kind: ScenarioKind = args.kind.parse()?;
    let parcels: Vec<Parcel> = input::file::read_typed(&args.parcels)?;
    let provider = InMemoryParcels::new(parcels);
    debug!(count = provider.len(), id = %args.id, "loaded parcels");

    let document = match args.input.as_deref() {
        Some(path) => input::file::read_value(path)?,
        None => Value::Null,
    };
    let patch = input::apply_sets(document, &args.set)?;

    let result = simulate_parcel(&provider, &args.id, kind, &patch)?;
    Ok(serde_json::to_value(result)?)
}
