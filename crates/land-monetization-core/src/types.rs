use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%). Never as percentages.
pub type Rate = Decimal;

/// Areas in square metres
pub type Area = Decimal;

/// One year of a projected cash-flow series.
///
/// `year = 0` holds undiscounted upfront lump sums (premiums, owner capex).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnualCashFlow {
    pub year: u32,
    pub cf: Money,
    pub cumulative: Money,
}

/// Uniform result shape shared by every monetization scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub npv: Money,
    /// `None` when no sign change exists or the solver diverges
    pub irr: Option<Rate>,
    pub payback_year: Option<u32>,
    pub annual_cf: Vec<AnnualCashFlow>,
    pub feasible: bool,
    pub notes: Vec<String>,
    pub initial_investment: Money,
    pub total_revenue: Money,
    pub total_cost: Money,
}

/// One swept parameter: name plus min..=max by step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepVariable {
    pub name: String,
    pub min: Decimal,
    pub max: Decimal,
    pub step: Decimal,
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
