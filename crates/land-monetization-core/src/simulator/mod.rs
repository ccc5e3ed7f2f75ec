pub mod land_swap;
pub mod leasehold_condo;
pub mod master_lease;
pub mod overrides;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::error::SimulationError;
use crate::types::{ComputationOutput, Money, Rate, SimulationResult};
use crate::SimResult;

pub use land_swap::LandSwapParams;
pub use leasehold_condo::LeaseholdCondoParams;
pub use master_lease::MasterLeaseParams;

// ---------------------------------------------------------------------------
// Scenario kinds
// ---------------------------------------------------------------------------

/// The three mutually exclusive monetization strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScenarioKind {
    /// Long-term ground lease under a new residential building
    #[serde(alias = "leasehold_condo")]
    LeaseholdCondo,
    /// Land-for-new-floor value exchange with a developer
    #[serde(alias = "land_swap")]
    LandSwap,
    /// Guaranteed rent from a single operator
    #[serde(alias = "master_lease")]
    MasterLease,
}

impl ScenarioKind {
    pub const ALL: [ScenarioKind; 3] = [
        ScenarioKind::LeaseholdCondo,
        ScenarioKind::LandSwap,
        ScenarioKind::MasterLease,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioKind::LeaseholdCondo => "leaseholdCondo",
            ScenarioKind::LandSwap => "landSwap",
            ScenarioKind::MasterLease => "masterLease",
        }
    }
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScenarioKind {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "leaseholdCondo" | "leasehold_condo" => Ok(ScenarioKind::LeaseholdCondo),
            "landSwap" | "land_swap" => Ok(ScenarioKind::LandSwap),
            "masterLease" | "master_lease" => Ok(ScenarioKind::MasterLease),
            other => Err(SimulationError::InvalidScenarioKind {
                kind: other.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// Parameter record for one scenario, tagged by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "scenario_kind", content = "parameters", rename_all = "camelCase")]
pub enum ScenarioParameters {
    LeaseholdCondo(LeaseholdCondoParams),
    LandSwap(LandSwapParams),
    MasterLease(MasterLeaseParams),
}

impl ScenarioParameters {
    pub fn kind(&self) -> ScenarioKind {
        match self {
            ScenarioParameters::LeaseholdCondo(_) => ScenarioKind::LeaseholdCondo,
            ScenarioParameters::LandSwap(_) => ScenarioKind::LandSwap,
            ScenarioParameters::MasterLease(_) => ScenarioKind::MasterLease,
        }
    }

    /// Representative default record for `kind`.
    pub fn defaults(kind: ScenarioKind) -> Self {
        match kind {
            ScenarioKind::LeaseholdCondo => {
                ScenarioParameters::LeaseholdCondo(LeaseholdCondoParams::default())
            }
            ScenarioKind::LandSwap => ScenarioParameters::LandSwap(LandSwapParams::default()),
            ScenarioKind::MasterLease => {
                ScenarioParameters::MasterLease(MasterLeaseParams::default())
            }
        }
    }

    /// Serialise only the inner record (no kind tag).
    pub fn to_record(&self) -> SimResult<serde_json::Value> {
        let value = match self {
            ScenarioParameters::LeaseholdCondo(p) => serde_json::to_value(p)?,
            ScenarioParameters::LandSwap(p) => serde_json::to_value(p)?,
            ScenarioParameters::MasterLease(p) => serde_json::to_value(p)?,
        };
        Ok(value)
    }

    /// Decode an inner record as the parameters of `kind`.
    pub fn from_record(kind: ScenarioKind, record: serde_json::Value) -> SimResult<Self> {
        let decoded = match kind {
            ScenarioKind::LeaseholdCondo => {
                serde_json::from_value(record).map(ScenarioParameters::LeaseholdCondo)
            }
            ScenarioKind::LandSwap => serde_json::from_value(record).map(ScenarioParameters::LandSwap),
            ScenarioKind::MasterLease => {
                serde_json::from_value(record).map(ScenarioParameters::MasterLease)
            }
        };
        decoded.map_err(|e| SimulationError::InvalidParameters(format!("{kind}: {e}")))
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Untyped request as received from a caller: a scenario tag plus a
/// (possibly partial) parameter record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationRequest {
    pub scenario_kind: String,
    #[serde(default)]
    pub parameters: serde_json::Value,
}

/// Run the calculator matching the parameter variant.
pub fn simulate(
    params: &ScenarioParameters,
) -> SimResult<ComputationOutput<SimulationResult>> {
    debug!(kind = %params.kind(), "dispatching simulation");
    match params {
        ScenarioParameters::LeaseholdCondo(p) => leasehold_condo::simulate_leasehold_condo(p),
        ScenarioParameters::LandSwap(p) => land_swap::simulate_land_swap(p),
        ScenarioParameters::MasterLease(p) => master_lease::simulate_master_lease(p),
    }
}

/// Resolve an untyped request and run it.
///
/// The scenario tag is validated before the parameters are decoded, so an
/// unknown kind fails with `InvalidScenarioKind` and nothing is computed.
/// Parameters missing from the request take their default values.
pub fn run_simulation(
    request: &SimulationRequest,
) -> SimResult<ComputationOutput<SimulationResult>> {
    let kind: ScenarioKind = request.scenario_kind.parse()?;
    let params = ScenarioParameters::with_overrides(kind, &request.parameters)?;
    simulate(&params)
}

/// Rebuild the full parameter record for `kind` from defaults plus `patch`
/// and simulate it. Always returns a complete result.
pub fn simulate_with_overrides(
    kind: ScenarioKind,
    patch: &serde_json::Value,
) -> SimResult<ComputationOutput<SimulationResult>> {
    let params = ScenarioParameters::with_overrides(kind, patch)?;
    simulate(&params)
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Longest projection any calculator will build, in years.
pub const MAX_HORIZON_YEARS: u32 = 200;

pub(crate) fn validate_horizon(field: &str, years: u32) -> SimResult<()> {
    if years > MAX_HORIZON_YEARS {
        return Err(SimulationError::InvalidInput {
            field: field.into(),
            reason: format!("{years} years exceeds the {MAX_HORIZON_YEARS}-year projection limit"),
        });
    }
    Ok(())
}

/// Unwrap a checked Decimal operation, blaming `field` when it overflowed.
pub(crate) fn checked<T>(value: Option<T>, field: &str) -> SimResult<T> {
    value.ok_or_else(|| SimulationError::InvalidInput {
        field: field.into(),
        reason: "Cash flows exceed the representable decimal range".into(),
    })
}

pub(crate) fn validate_discount_rate(rate: Rate) -> SimResult<()> {
    if rate <= dec!(-1) {
        return Err(SimulationError::InvalidInput {
            field: "discount_rate".into(),
            reason: "Discount rate must be greater than -100%".into(),
        });
    }
    Ok(())
}

pub(crate) fn warn_if_negative(field: &str, value: Decimal, warnings: &mut Vec<String>) {
    if value < Decimal::ZERO {
        warnings.push(format!("{field} is negative ({value}); results may be meaningless"));
    }
}

/// Rate as a percentage string, e.g. 0.035 -> "3.50%".
pub(crate) fn pct(rate: Rate) -> String {
    format!("{:.2}%", (rate * dec!(100)).round_dp(2))
}

/// Money rounded to whole currency units.
pub(crate) fn money(value: Money) -> String {
    value.round_dp(0).to_string()
}
