use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::{checked, money, pct, validate_discount_rate, validate_horizon, warn_if_negative};
use crate::cash_flow::CashFlowSeries;
use crate::time_value::{payback_year, present_value, solve_irr, PaybackRule};
use crate::types::{with_metadata, Area, ComputationOutput, Money, Rate, SimulationResult};
use crate::SimResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Input parameters for a guaranteed-rent master lease to a single operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MasterLeaseParams {
    /// Site area in m²
    pub land_area: Area,
    /// Land price per m²
    pub land_unit_price: Money,
    /// Guaranteed monthly rent per m² of site area
    pub base_rent_per_m2_per_month: Money,
    pub term_years: u32,
    /// Annual rent escalation
    pub escalator_rate: Rate,
    pub tax_rate_fixed_asset: Rate,
    /// Owner-borne costs proportional to rent (insurance, management fees)
    pub variable_cost_rate: Rate,
    /// Owner fit-out / site preparation paid at signing
    pub initial_capex_owner: Money,
    /// Reinstatement cost borne by the owner at lease end
    pub terminal_cost: Money,
    pub discount_rate: Rate,
}

impl Default for MasterLeaseParams {
    fn default() -> Self {
        Self {
            land_area: dec!(300),
            land_unit_price: dec!(600000),
            base_rent_per_m2_per_month: dec!(2500),
            term_years: 20,
            escalator_rate: Decimal::ZERO,
            tax_rate_fixed_asset: dec!(0.014),
            variable_cost_rate: dec!(0.10),
            initial_capex_owner: Decimal::ZERO,
            terminal_cost: Decimal::ZERO,
            discount_rate: dec!(0.04),
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Project guaranteed-rent cash flows over the master-lease term.
///
/// Owner capex is a `year = 0` outflow. The terminal reinstatement cost is
/// charged to the final year of both the series and NPV so the two agree.
pub fn simulate_master_lease(
    input: &MasterLeaseParams,
) -> SimResult<ComputationOutput<SimulationResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_input(input, &mut warnings)?;

    let land_value = checked(input.land_area.checked_mul(input.land_unit_price), "land_area")?;
    let initial_annual_rent = checked(
        input
            .land_area
            .checked_mul(input.base_rent_per_m2_per_month)
            .and_then(|v| v.checked_mul(dec!(12))),
        "base_rent_per_m2_per_month",
    )?;
    let tax = checked(land_value.checked_mul(input.tax_rate_fixed_asset), "tax_rate_fixed_asset")?;

    let mut series = CashFlowSeries::with_capacity(input.term_years as usize + 1);
    let mut npv = -input.initial_capex_owner;
    let mut total_revenue = Decimal::ZERO;
    let mut total_cost = input.initial_capex_owner;

    // NPV starts at -capex, so any non-zero capex needs its year-0 entry
    if !input.initial_capex_owner.is_zero() {
        checked(series.push(0, -input.initial_capex_owner), "initial_capex_owner")?;
    }

    let growth = checked(Decimal::ONE.checked_add(input.escalator_rate), "escalator_rate")?;
    let mut rent = initial_annual_rent;

    for year in 1..=input.term_years {
        if year > 1 {
            rent = checked(rent.checked_mul(growth), "escalator_rate")?;
        }
        let variable_cost = checked(rent.checked_mul(input.variable_cost_rate), "variable_cost_rate")?;
        let cf = checked(
            rent.checked_sub(tax).and_then(|v| v.checked_sub(variable_cost)),
            "escalator_rate",
        )?;
        npv = checked(
            npv.checked_add(present_value(cf, input.discount_rate, year)),
            "escalator_rate",
        )?;
        checked(series.push(year, cf), "escalator_rate")?;

        total_revenue = checked(total_revenue.checked_add(rent), "escalator_rate")?;
        total_cost = checked(
            total_cost
                .checked_add(tax)
                .and_then(|v| v.checked_add(variable_cost)),
            "escalator_rate",
        )?;
    }

    if input.terminal_cost > Decimal::ZERO {
        if series.is_empty() {
            checked(series.push(0, Decimal::ZERO), "terminal_cost")?;
        }
        let final_year = series.last_year().unwrap_or(0);
        npv = checked(
            npv.checked_sub(present_value(input.terminal_cost, input.discount_rate, final_year)),
            "terminal_cost",
        )?;
        checked(series.adjust_last(-input.terminal_cost), "terminal_cost")?;
        total_cost = checked(total_cost.checked_add(input.terminal_cost), "terminal_cost")?;
    }

    let annual_cf = series.into_entries();
    // Capex already sits in the year-0 entry
    let irr = solve_irr(&annual_cf, Decimal::ZERO);
    let payback = payback_year(&annual_cf, PaybackRule::NonNegative);

    let feasible = npv > Decimal::ZERO && input.base_rent_per_m2_per_month > Decimal::ZERO;

    if irr.is_none() && input.initial_capex_owner > Decimal::ZERO {
        warnings.push("IRR could not be determined for this cash-flow profile".into());
    }

    let notes = build_notes(input, land_value, initial_annual_rent);

    let result = SimulationResult {
        npv,
        irr,
        payback_year: payback,
        annual_cf,
        feasible,
        notes,
        initial_investment: input.initial_capex_owner,
        total_revenue,
        total_cost,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Master Lease Guaranteed Rent (discounted net rent)",
        input,
        warnings,
        elapsed,
        result,
    ))
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_input(input: &MasterLeaseParams, warnings: &mut Vec<String>) -> SimResult<()> {
    validate_discount_rate(input.discount_rate)?;
    validate_horizon("term_years", input.term_years)?;

    warn_if_negative("land_area", input.land_area, warnings);
    warn_if_negative("land_unit_price", input.land_unit_price, warnings);
    warn_if_negative("initial_capex_owner", input.initial_capex_owner, warnings);
    warn_if_negative("terminal_cost", input.terminal_cost, warnings);

    if input.base_rent_per_m2_per_month <= Decimal::ZERO {
        warnings.push("Base rent is not positive; a master lease cannot be feasible".into());
    }

    if input.term_years == 0 {
        warnings.push("Lease term is zero years; no rent is modelled".into());
    }

    if input.variable_cost_rate >= Decimal::ONE {
        warnings.push(format!(
            "Variable cost rate {} consumes the entire rent",
            pct(input.variable_cost_rate)
        ));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Notes
// ---------------------------------------------------------------------------

fn build_notes(input: &MasterLeaseParams, land_value: Money, initial_annual_rent: Money) -> Vec<String> {
    let mut notes = Vec::with_capacity(6);

    notes.push(format!(
        "Term: {} years, rent escalation {} per year",
        input.term_years,
        pct(input.escalator_rate)
    ));
    notes.push(format!(
        "Guaranteed rent: {}/m²/month on {} m² ({} in year 1)",
        money(input.base_rent_per_m2_per_month),
        input.land_area,
        money(initial_annual_rent)
    ));

    if let Some(expected_yield) = initial_annual_rent.checked_div(land_value) {
        notes.push(format!(
            "Expected gross yield on land value: {}",
            pct(expected_yield)
        ));
    }

    notes.push(format!(
        "Variable costs: {} of rent",
        pct(input.variable_cost_rate)
    ));

    if input.initial_capex_owner > Decimal::ZERO {
        notes.push(format!(
            "Owner capex of {} paid at signing (year 0, undiscounted)",
            money(input.initial_capex_owner)
        ));
    }

    if input.terminal_cost > Decimal::ZERO {
        notes.push(format!(
            "Reinstatement cost of {} charged in year {}",
            money(input.terminal_cost),
            input.term_years
        ));
    }

    notes
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
