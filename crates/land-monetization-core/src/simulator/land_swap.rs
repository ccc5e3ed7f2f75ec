use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::{checked, money, pct, validate_discount_rate, validate_horizon, warn_if_negative};
use crate::cash_flow::CashFlowSeries;
use crate::time_value::{payback_year, present_value, solve_irr, PaybackRule};
use crate::types::{with_metadata, Area, ComputationOutput, Money, Rate, SimulationResult};
use crate::SimResult;

/// Years the owner lets the acquired floor area when not selling.
pub const RENTAL_HORIZON_YEARS: u32 = 30;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Input parameters for a land-for-floor-area exchange with a developer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LandSwapParams {
    /// Site area in m²
    pub land_area: Area,
    /// Land price per m²
    pub land_unit_price: Money,
    /// Floor-area ratio in percent (400 = 4.0x site area)
    pub far: Rate,
    /// Saleable share of permitted floor area
    pub efficiency: Rate,
    pub sales_price_per_m2: Money,
    pub build_cost_per_m2: Money,
    /// Soft costs (design, permits, marketing) as a fraction of build cost
    pub soft_cost_rate: Rate,
    /// Finance cost as a fraction of build plus soft cost
    pub finance_cost_rate: Rate,
    /// Developer profit as a fraction of GDV
    pub developer_margin_rate: Rate,
    pub construction_years: u32,
    /// Sell the acquired units on completion instead of letting them
    pub sell_after_acquisition: bool,
    /// Monthly rent per m² for the acquired units
    pub unit_rent_per_m2: Money,
    pub tax_rate_fixed_asset: Rate,
    pub maintenance_rate: Rate,
    pub discount_rate: Rate,
}

impl Default for LandSwapParams {
    fn default() -> Self {
        Self {
            land_area: dec!(300),
            land_unit_price: dec!(600000),
            far: dec!(400),
            efficiency: dec!(0.8),
            sales_price_per_m2: dec!(900000),
            build_cost_per_m2: dec!(400000),
            soft_cost_rate: dec!(0.10),
            finance_cost_rate: dec!(0.03),
            developer_margin_rate: dec!(0.15),
            construction_years: 3,
            sell_after_acquisition: false,
            unit_rent_per_m2: dec!(5000),
            tax_rate_fixed_asset: dec!(0.014),
            maintenance_rate: dec!(0.005),
            discount_rate: dec!(0.04),
        }
    }
}

/// Developer-side economics that cap what the exchange can pay for the land.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeveloperEconomics {
    pub planned_gfa: Area,
    pub gdv: Money,
    pub build_cost: Money,
    pub soft_cost: Money,
    pub finance_cost: Money,
    pub total_cost: Money,
    pub developer_profit: Money,
    /// Residual the scheme can pay for the land: GDV - costs - profit
    pub land_budget: Money,
    pub land_value: Money,
    /// `land_budget >= land_value`
    pub feasible: bool,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Residual land valuation from the developer's point of view.
///
/// Fails with `InvalidInput` when a product leaves the decimal range.
pub fn developer_economics(input: &LandSwapParams) -> SimResult<DeveloperEconomics> {
    let planned_gfa = checked(
        input
            .far
            .checked_div(dec!(100))
            .and_then(|ratio| input.land_area.checked_mul(ratio))
            .and_then(|v| v.checked_mul(input.efficiency)),
        "far",
    )?;
    let gdv = checked(planned_gfa.checked_mul(input.sales_price_per_m2), "sales_price_per_m2")?;

    let build_cost = checked(planned_gfa.checked_mul(input.build_cost_per_m2), "build_cost_per_m2")?;
    let soft_cost = checked(build_cost.checked_mul(input.soft_cost_rate), "soft_cost_rate")?;
    let hard_and_soft = checked(build_cost.checked_add(soft_cost), "soft_cost_rate")?;
    let finance_cost = checked(hard_and_soft.checked_mul(input.finance_cost_rate), "finance_cost_rate")?;
    let total_cost = checked(hard_and_soft.checked_add(finance_cost), "finance_cost_rate")?;

    let developer_profit = checked(gdv.checked_mul(input.developer_margin_rate), "developer_margin_rate")?;
    let land_budget = checked(
        gdv.checked_sub(total_cost)
            .and_then(|v| v.checked_sub(developer_profit)),
        "build_cost_per_m2",
    )?;
    let land_value = checked(input.land_area.checked_mul(input.land_unit_price), "land_area")?;

    Ok(DeveloperEconomics {
        planned_gfa,
        gdv,
        build_cost,
        soft_cost,
        finance_cost,
        total_cost,
        developer_profit,
        land_budget,
        land_value,
        feasible: land_budget >= land_value,
    })
}

/// Two-stage land swap: developer feasibility gate, then the owner's
/// post-acquisition cash flow (sale or rental).
///
/// An infeasible exchange reports the signed budget deficit as NPV rather
/// than a discounted flow, so callers can see how far the deal is from closing.
pub fn simulate_land_swap(input: &LandSwapParams) -> SimResult<ComputationOutput<SimulationResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_input(input, &mut warnings)?;

    let dev = developer_economics(input)?;

    // --- Owner outcome ---
    let owner_acquisition_value = dev
        .land_budget
        .max(Decimal::ZERO)
        .min(dev.land_value.max(Decimal::ZERO));
    let owner_unit_area = if input.sales_price_per_m2.is_zero() {
        Decimal::ZERO
    } else {
        checked(
            owner_acquisition_value.checked_div(input.sales_price_per_m2),
            "sales_price_per_m2",
        )?
    };

    let acquisition_year = checked(input.construction_years.checked_add(1), "construction_years")?;
    let horizon = checked(
        acquisition_year.checked_add(RENTAL_HORIZON_YEARS),
        "construction_years",
    )?;
    let mut series = CashFlowSeries::with_capacity(horizon as usize);

    for year in 1..=input.construction_years {
        checked(series.push(year, Decimal::ZERO), "construction_years")?;
    }

    let mut npv = Decimal::ZERO;
    let mut total_revenue = Decimal::ZERO;
    let mut total_cost = Decimal::ZERO;

    if !dev.feasible {
        checked(series.push(acquisition_year, Decimal::ZERO), "construction_years")?;
        npv = checked(dev.land_budget.checked_sub(dev.land_value), "land_unit_price")?;
    } else if input.sell_after_acquisition {
        checked(
            series.push(acquisition_year, owner_acquisition_value),
            "sales_price_per_m2",
        )?;
        npv = owner_acquisition_value;
        total_revenue = owner_acquisition_value;
    } else {
        checked(series.push(acquisition_year, Decimal::ZERO), "construction_years")?;

        let annual_rent = checked(
            owner_unit_area
                .checked_mul(input.unit_rent_per_m2)
                .and_then(|v| v.checked_mul(dec!(12))),
            "unit_rent_per_m2",
        )?;
        let tax = checked(
            owner_acquisition_value.checked_mul(input.tax_rate_fixed_asset),
            "tax_rate_fixed_asset",
        )?;
        let maintenance = checked(
            owner_acquisition_value.checked_mul(input.maintenance_rate),
            "maintenance_rate",
        )?;
        let owner_side_cost = checked(tax.checked_add(maintenance), "maintenance_rate")?;
        let net_cf = checked(annual_rent.checked_sub(owner_side_cost), "unit_rent_per_m2")?;

        for year in (acquisition_year + 1)..=horizon {
            npv = checked(
                npv.checked_add(present_value(net_cf, input.discount_rate, year)),
                "unit_rent_per_m2",
            )?;
            checked(series.push(year, net_cf), "unit_rent_per_m2")?;
            total_revenue = checked(total_revenue.checked_add(annual_rent), "unit_rent_per_m2")?;
            total_cost = checked(total_cost.checked_add(owner_side_cost), "maintenance_rate")?;
        }
    }

    let annual_cf = series.into_entries();
    let irr = solve_irr(&annual_cf, dev.land_value);
    let payback = payback_year(&annual_cf, PaybackRule::StrictlyPositive);

    if dev.feasible && irr.is_none() {
        warnings.push("IRR could not be determined for this cash-flow profile".into());
    }

    let notes = build_notes(input, &dev, owner_acquisition_value, owner_unit_area, acquisition_year);

    let result = SimulationResult {
        npv,
        irr,
        payback_year: payback,
        annual_cf,
        feasible: dev.feasible,
        notes,
        initial_investment: dev.land_value,
        total_revenue,
        total_cost,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Land Swap Value Exchange (residual land budget + owner cash flow)",
        input,
        warnings,
        elapsed,
        result,
    ))
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_input(input: &LandSwapParams, warnings: &mut Vec<String>) -> SimResult<()> {
    validate_discount_rate(input.discount_rate)?;
    validate_horizon("construction_years", input.construction_years)?;

    warn_if_negative("land_area", input.land_area, warnings);
    warn_if_negative("land_unit_price", input.land_unit_price, warnings);
    warn_if_negative("far", input.far, warnings);
    warn_if_negative("sales_price_per_m2", input.sales_price_per_m2, warnings);

    if input.efficiency <= Decimal::ZERO || input.efficiency > Decimal::ONE {
        warnings.push(format!(
            "Efficiency {} is outside (0, 1]; planned floor area may be unrealistic",
            input.efficiency
        ));
    }

    if input.far > Decimal::ZERO && input.far < dec!(10) {
        warnings.push(format!(
            "FAR {} looks like a multiple; FAR is expected in percent (e.g. 400)",
            input.far
        ));
    }

    if input.developer_margin_rate >= Decimal::ONE {
        warnings.push("Developer margin of 100% or more leaves nothing for the land".into());
    }

    if input.sales_price_per_m2.is_zero() {
        warnings.push("Sales price is zero; no floor area can be allocated to the owner".into());
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Notes
// ---------------------------------------------------------------------------

fn build_notes(
    input: &LandSwapParams,
    dev: &DeveloperEconomics,
    owner_acquisition_value: Money,
    owner_unit_area: Area,
    acquisition_year: u32,
) -> Vec<String> {
    let mut notes = Vec::with_capacity(7);

    notes.push(format!(
        "Planned GFA: {} m² (FAR {}%, efficiency {})",
        dev.planned_gfa.round_dp(1),
        input.far,
        pct(input.efficiency)
    ));
    notes.push(format!(
        "GDV: {}; development cost incl. soft and finance: {}; developer profit: {}",
        money(dev.gdv),
        money(dev.total_cost),
        money(dev.developer_profit)
    ));
    notes.push(format!(
        "Land budget {} vs land value {}",
        money(dev.land_budget),
        money(dev.land_value)
    ));

    if dev.feasible {
        notes.push(format!(
            "Owner receives {} m² of new floor area worth {} in year {}",
            owner_unit_area.round_dp(1),
            money(owner_acquisition_value),
            acquisition_year
        ));
        if input.sell_after_acquisition {
            notes.push("Owner sells the acquired units on completion".into());
        } else {
            notes.push(format!(
                "Owner lets the acquired units for {} years at {}/m²/month",
                RENTAL_HORIZON_YEARS,
                money(input.unit_rent_per_m2)
            ));
        }
        return notes;
    }

    let gap = dev.land_value.saturating_sub(dev.land_budget);
    notes.push(format!(
        "Exchange is not feasible: land budget falls short by {}",
        money(gap)
    ));

    if let Some(increase_per_m2) = gap.checked_div(dev.planned_gfa) {
        match increase_per_m2.checked_div(input.sales_price_per_m2) {
            Some(share) => notes.push(format!(
                "Sales price must rise by {}/m² ({}) to close the gap",
                money(increase_per_m2),
                pct(share)
            )),
            None => notes.push(format!(
                "Sales price must rise by {}/m² to close the gap",
                money(increase_per_m2)
            )),
        }
    }

    if let Some(share) = gap.checked_div(dev.total_cost) {
        notes.push(format!(
            "Alternatively, development cost must fall by {}",
            pct(share)
        ));
    }

    notes
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
