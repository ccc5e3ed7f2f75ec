//! Read-only parcel lookup at the engine boundary.
//!
//! Parcel records live with the caller (sample data sets, a database, a map
//! layer). The engine only needs to read one by id to seed the land fields of
//! a scenario, so it depends on the [`ParcelProvider`] trait and nothing else.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::error::SimulationError;
use crate::simulator::{simulate, ScenarioKind, ScenarioParameters};
use crate::simulator::overrides::deep_merge;
use crate::types::{Area, ComputationOutput, Money, Rate, SimulationResult};
use crate::SimResult;

/// A land parcel as seen by the simulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parcel {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub land_area: Area,
    pub land_unit_price: Money,
    /// Zoned floor-area ratio in percent, where known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub far: Option<Rate>,
}

impl Parcel {
    /// Parameter overrides contributed by this parcel for `kind`.
    ///
    /// FAR only exists on the land swap record, so it is left out elsewhere.
    pub fn overrides_for(&self, kind: ScenarioKind) -> Value {
        let mut patch = serde_json::json!({
            "land_area": self.land_area.to_string(),
            "land_unit_price": self.land_unit_price.to_string(),
        });
        if let (ScenarioKind::LandSwap, Some(far)) = (kind, self.far) {
            patch["far"] = Value::String(far.to_string());
        }
        patch
    }
}

/// Read-only lookup of parcels by id.
pub trait ParcelProvider {
    fn parcel(&self, id: &str) -> Option<Parcel>;
}

/// `HashMap`-backed provider for fixtures and file-loaded sample data.
#[derive(Debug, Clone, Default)]
pub struct InMemoryParcels {
    parcels: HashMap<String, Parcel>,
}

impl InMemoryParcels {
    pub fn new(parcels: Vec<Parcel>) -> Self {
        Self {
            parcels: parcels.into_iter().map(|p| (p.id.clone(), p)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.parcels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parcels.is_empty()
    }
}

impl ParcelProvider for InMemoryParcels {
    fn parcel(&self, id: &str) -> Option<Parcel> {
        self.parcels.get(id).cloned()
    }
}

/// Simulate `kind` for the parcel `id`, with `patch` applied on top of the
/// parcel's land fields.
pub fn simulate_parcel(
    provider: &impl ParcelProvider,
    id: &str,
    kind: ScenarioKind,
    patch: &Value,
) -> SimResult<ComputationOutput<SimulationResult>> {
    let parcel = provider
        .parcel(id)
        .ok_or_else(|| SimulationError::ParcelNotFound(id.to_string()))?;

    let mut combined = parcel.overrides_for(kind);
    if !patch.is_null() {
        deep_merge(&mut combined, patch);
    }

    let params = ScenarioParameters::with_overrides(kind, &combined)?;
    let mut output = simulate(&params)?;
    let label = if parcel.name.is_empty() {
        parcel.id.clone()
    } else {
        format!("{} ({})", parcel.name, parcel.id)
    };
    output.result.notes.insert(0, format!("Parcel: {label}"));
    Ok(output)
}
