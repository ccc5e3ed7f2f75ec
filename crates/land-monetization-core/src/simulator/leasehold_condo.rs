use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::{checked, money, pct, validate_discount_rate, validate_horizon, warn_if_negative};
use crate::cash_flow::CashFlowSeries;
use crate::time_value::{payback_year, present_value, solve_irr, PaybackRule};
use crate::types::{with_metadata, Area, ComputationOutput, Money, Rate, SimulationResult};
use crate::SimResult;

/// Ground-rent yield band inside which a leasehold deal is considered marketable.
pub const YIELD_BAND_MIN: Rate = dec!(0.02);
pub const YIELD_BAND_MAX: Rate = dec!(0.06);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Input parameters for a ground lease under a new condominium.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LeaseholdCondoParams {
    /// Site area in m²
    pub land_area: Area,
    /// Land price per m²
    pub land_unit_price: Money,
    /// Year-1 ground rent as a fraction of land value
    pub ground_rent_yield: Rate,
    /// Lease term in years
    pub lease_years: u32,
    /// Annual ground-rent escalation
    pub escalator_rate: Rate,
    /// Lump sum paid by the developer at signing (0 = none)
    pub upfront_premium: Money,
    /// Floor area of the unit the owner keeps (0 = owner takes no unit)
    pub owner_unit_area: Area,
    /// Monthly market rent per m² for the owner's unit
    pub owner_unit_rent_per_m2: Money,
    /// Fixed-asset tax rate on land value
    pub tax_rate_fixed_asset: Rate,
    /// Annual owner-side maintenance as a fraction of land value
    pub maintenance_rate: Rate,
    pub discount_rate: Rate,
}

impl Default for LeaseholdCondoParams {
    fn default() -> Self {
        Self {
            land_area: dec!(300),
            land_unit_price: dec!(600000),
            ground_rent_yield: dec!(0.035),
            lease_years: 70,
            escalator_rate: dec!(0.005),
            upfront_premium: Decimal::ZERO,
            owner_unit_area: Decimal::ZERO,
            owner_unit_rent_per_m2: dec!(3500),
            tax_rate_fixed_asset: dec!(0.014),
            maintenance_rate: dec!(0.001),
            discount_rate: dec!(0.04),
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Project ground-rent cash flows over the lease term.
///
/// The upfront premium, when present, is booked as a `year = 0` entry and
/// enters NPV undiscounted. IRR is measured against the land value the
/// owner commits to the lease.
pub fn simulate_leasehold_condo(
    input: &LeaseholdCondoParams,
) -> SimResult<ComputationOutput<SimulationResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_input(input, &mut warnings)?;

    let land_value = checked(input.land_area.checked_mul(input.land_unit_price), "land_area")?;
    let initial_ground_rent =
        checked(land_value.checked_mul(input.ground_rent_yield), "ground_rent_yield")?;
    let owner_unit_revenue = if input.owner_unit_area > Decimal::ZERO {
        checked(
            input
                .owner_unit_area
                .checked_mul(input.owner_unit_rent_per_m2)
                .and_then(|v| v.checked_mul(dec!(12))),
            "owner_unit_rent_per_m2",
        )?
    } else {
        Decimal::ZERO
    };
    let tax = checked(land_value.checked_mul(input.tax_rate_fixed_asset), "tax_rate_fixed_asset")?;
    let maintenance = checked(land_value.checked_mul(input.maintenance_rate), "maintenance_rate")?;

    let mut series = CashFlowSeries::with_capacity(input.lease_years as usize + 1);
    let mut npv = Decimal::ZERO;
    let mut total_revenue = Decimal::ZERO;
    let mut total_cost = Decimal::ZERO;

    if input.upfront_premium > Decimal::ZERO {
        checked(series.push(0, input.upfront_premium), "upfront_premium")?;
        npv = input.upfront_premium;
        total_revenue = input.upfront_premium;
    }

    let growth = checked(Decimal::ONE.checked_add(input.escalator_rate), "escalator_rate")?;
    let mut ground_rent = initial_ground_rent;
    let owner_side_cost = checked(tax.checked_add(maintenance), "maintenance_rate")?;

    for year in 1..=input.lease_years {
        if year > 1 {
            ground_rent = checked(ground_rent.checked_mul(growth), "escalator_rate")?;
        }
        let revenue = checked(ground_rent.checked_add(owner_unit_revenue), "escalator_rate")?;
        let cf = checked(revenue.checked_sub(owner_side_cost), "escalator_rate")?;
        npv = checked(
            npv.checked_add(present_value(cf, input.discount_rate, year)),
            "escalator_rate",
        )?;
        checked(series.push(year, cf), "escalator_rate")?;

        total_revenue = checked(total_revenue.checked_add(revenue), "escalator_rate")?;
        total_cost = checked(total_cost.checked_add(owner_side_cost), "escalator_rate")?;
    }

    let annual_cf = series.into_entries();
    let irr = solve_irr(&annual_cf, land_value);
    let payback = payback_year(&annual_cf, PaybackRule::NonNegative);

    let yield_in_band =
        input.ground_rent_yield >= YIELD_BAND_MIN && input.ground_rent_yield <= YIELD_BAND_MAX;
    let feasible = npv > Decimal::ZERO && yield_in_band;

    if irr.is_none() && land_value > Decimal::ZERO {
        warnings.push("IRR could not be determined for this cash-flow profile".into());
    }

    let notes = build_notes(input, land_value, initial_ground_rent, owner_unit_revenue, yield_in_band);

    let result = SimulationResult {
        npv,
        irr,
        payback_year: payback,
        annual_cf,
        feasible,
        notes,
        initial_investment: land_value,
        total_revenue,
        total_cost,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Leasehold Condo Ground Lease (discounted ground rent)",
        input,
        warnings,
        elapsed,
        result,
    ))
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_input(input: &LeaseholdCondoParams, warnings: &mut Vec<String>) -> SimResult<()> {
    validate_discount_rate(input.discount_rate)?;
    validate_horizon("lease_years", input.lease_years)?;

    warn_if_negative("land_area", input.land_area, warnings);
    warn_if_negative("land_unit_price", input.land_unit_price, warnings);
    warn_if_negative("owner_unit_area", input.owner_unit_area, warnings);

    if input.lease_years == 0 {
        warnings.push("Lease term is zero years; only the upfront premium is modelled".into());
    }

    if input.lease_years > 0 && input.lease_years < 30 {
        warnings.push(format!(
            "Lease term of {} years is short for a condominium ground lease",
            input.lease_years
        ));
    }

    if input.escalator_rate < Decimal::ZERO {
        warnings.push(format!(
            "Negative escalation ({}) shrinks ground rent every year",
            pct(input.escalator_rate)
        ));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Notes
// ---------------------------------------------------------------------------

fn build_notes(
    input: &LeaseholdCondoParams,
    land_value: Money,
    initial_ground_rent: Money,
    owner_unit_revenue: Money,
    yield_in_band: bool,
) -> Vec<String> {
    let mut notes = Vec::with_capacity(6);

    notes.push(format!("Lease term: {} years", input.lease_years));
    notes.push(format!(
        "Ground rent yield: {} of land value {} (year-1 ground rent {})",
        pct(input.ground_rent_yield),
        money(land_value),
        money(initial_ground_rent)
    ));
    if !yield_in_band {
        notes.push(format!(
            "Ground rent yield is outside the {} to {} band developers accept",
            pct(YIELD_BAND_MIN),
            pct(YIELD_BAND_MAX)
        ));
    }
    notes.push(format!(
        "Ground rent escalation: {} per year",
        pct(input.escalator_rate)
    ));

    if input.upfront_premium > Decimal::ZERO {
        notes.push(format!(
            "Upfront premium of {} received at signing (year 0, undiscounted)",
            money(input.upfront_premium)
        ));
    } else {
        notes.push("No upfront premium".into());
    }

    if owner_unit_revenue > Decimal::ZERO {
        notes.push(format!(
            "Owner keeps a {} m² unit let at {}/m²/month ({} per year)",
            input.owner_unit_area,
            money(input.owner_unit_rent_per_m2),
            money(owner_unit_revenue)
        ));
    } else {
        notes.push("Owner takes no unit in the building".into());
    }

    notes
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimulationError;
    use rust_decimal_macros::dec;

    /// 100 m² at 500,000/m²: land value 50,000,000, one-year lease, no costs
    fn one_year_input() -> LeaseholdCondoParams {
        LeaseholdCondoParams {
            land_area: dec!(100),
            land_unit_price: dec!(500000),
            ground_rent_yield: dec!(0.03),
            lease_years: 1,
            escalator_rate: Decimal::ZERO,
            upfront_premium: Decimal::ZERO,
            owner_unit_area: Decimal::ZERO,
            owner_unit_rent_per_m2: Decimal::ZERO,
            tax_rate_fixed_asset: Decimal::ZERO,
            maintenance_rate: Decimal::ZERO,
            discount_rate: dec!(0.03),
        }
    }

    #[test]
    fn test_one_year_known_answer() {
        let out = simulate_leasehold_condo(&one_year_input()).unwrap().result;

        assert_eq!(out.annual_cf.len(), 1);
        assert_eq!(out.annual_cf[0].year, 1);
        assert_eq!(out.annual_cf[0].cf, dec!(1500000));

        // 1,500,000 / 1.03 = 1,456,310.68
        assert!((out.npv - dec!(1456310.68)).abs() < dec!(0.01), "npv {}", out.npv);
        assert!(out.feasible);
        assert_eq!(out.initial_investment, dec!(50000000));
    }

    #[test]
    fn test_escalation_compounds_from_year_two() {
        let mut input = one_year_input();
        input.lease_years = 3;
        input.escalator_rate = dec!(0.10);
        let out = simulate_leasehold_condo(&input).unwrap().result;

        assert_eq!(out.annual_cf[0].cf, dec!(1500000));
        assert_eq!(out.annual_cf[1].cf, dec!(1650000));
        assert_eq!(out.annual_cf[2].cf, dec!(1815000));
    }

    #[test]
    fn test_premium_is_year_zero_and_undiscounted() {
        let mut input = one_year_input();
        input.upfront_premium = dec!(2000000);
        let out = simulate_leasehold_condo(&input).unwrap().result;

        assert_eq!(out.annual_cf[0].year, 0);
        assert_eq!(out.annual_cf[0].cf, dec!(2000000));
        assert_eq!(out.annual_cf[1].cumulative, dec!(3500000));

        let base = simulate_leasehold_condo(&one_year_input()).unwrap().result;
        assert!((out.npv - base.npv - dec!(2000000)).abs() < dec!(0.0001));
    }

    #[test]
    fn test_owner_unit_revenue_added_every_year() {
        let mut input = one_year_input();
        input.owner_unit_area = dec!(50);
        input.owner_unit_rent_per_m2 = dec!(4000);
        let out = simulate_leasehold_condo(&input).unwrap().result;

        // 1,500,000 + 50 * 4,000 * 12
        assert_eq!(out.annual_cf[0].cf, dec!(3900000));
        assert!(out.notes.iter().any(|n| n.contains("Owner keeps")));
    }

    #[test]
    fn test_owner_rent_ignored_without_unit() {
        let mut input = one_year_input();
        input.owner_unit_rent_per_m2 = dec!(4000);
        let out = simulate_leasehold_condo(&input).unwrap().result;
        assert_eq!(out.annual_cf[0].cf, dec!(1500000));
        assert!(out.notes.iter().any(|n| n.contains("no unit")));
    }

    #[test]
    fn test_tax_and_maintenance_deducted() {
        let mut input = one_year_input();
        input.tax_rate_fixed_asset = dec!(0.014);
        input.maintenance_rate = dec!(0.001);
        let out = simulate_leasehold_condo(&input).unwrap().result;

        // 1,500,000 - 700,000 - 50,000
        assert_eq!(out.annual_cf[0].cf, dec!(750000));
        assert_eq!(out.total_cost, dec!(750000));
        assert_eq!(out.total_revenue, dec!(1500000));
    }

    #[test]
    fn test_yield_outside_band_is_infeasible() {
        let mut input = one_year_input();
        input.ground_rent_yield = dec!(0.07);
        let out = simulate_leasehold_condo(&input).unwrap().result;
        assert!(out.npv > Decimal::ZERO);
        assert!(!out.feasible);
        assert!(out.notes.iter().any(|n| n.contains("outside")));

        input.ground_rent_yield = dec!(0.015);
        let out = simulate_leasehold_condo(&input).unwrap().result;
        assert!(!out.feasible);
    }

    #[test]
    fn test_yield_band_edges_are_inclusive() {
        let mut input = one_year_input();
        input.ground_rent_yield = YIELD_BAND_MIN;
        assert!(simulate_leasehold_condo(&input).unwrap().result.feasible);
        input.ground_rent_yield = YIELD_BAND_MAX;
        assert!(simulate_leasehold_condo(&input).unwrap().result.feasible);
    }

    #[test]
    fn test_negative_npv_is_infeasible() {
        let mut input = one_year_input();
        input.tax_rate_fixed_asset = dec!(0.05);
        let out = simulate_leasehold_condo(&input).unwrap().result;
        assert!(out.npv < Decimal::ZERO);
        assert!(!out.feasible);
        assert_eq!(out.payback_year, None);
    }

    #[test]
    fn test_payback_year_one_when_first_flow_positive() {
        let out = simulate_leasehold_condo(&one_year_input()).unwrap().result;
        assert_eq!(out.payback_year, Some(1));
    }

    #[test]
    fn test_irr_measured_against_land_value() {
        let mut input = one_year_input();
        input.lease_years = 30;
        input.ground_rent_yield = dec!(0.05);
        let out = simulate_leasehold_condo(&input).unwrap().result;

        // 2.5M a year on 50M for 30 years: well below the 5% running yield
        let irr = out.irr.unwrap();
        assert!(irr > Decimal::ZERO && irr < dec!(0.05), "irr {irr}");
    }

    #[test]
    fn test_zero_term_without_premium_is_empty() {
        let mut input = one_year_input();
        input.lease_years = 0;
        let output = simulate_leasehold_condo(&input).unwrap();
        assert!(output.result.annual_cf.is_empty());
        assert_eq!(output.result.npv, Decimal::ZERO);
        assert!(!output.result.feasible);
        assert!(!output.warnings.is_empty());
    }

    #[test]
    fn test_invalid_discount_rate_errors() {
        let mut input = one_year_input();
        input.discount_rate = dec!(-1.5);
        assert!(simulate_leasehold_condo(&input).is_err());
    }

    #[test]
    fn test_default_parameters_are_feasible() {
        let out = simulate_leasehold_condo(&LeaseholdCondoParams::default())
            .unwrap()
            .result;
        assert_eq!(out.annual_cf.len(), 70);
        assert!(out.feasible);
    }

    #[test]
    fn test_runaway_escalation_is_rejected() {
        let mut input = LeaseholdCondoParams::default();
        input.escalator_rate = dec!(1);
        input.lease_years = 99;
        match simulate_leasehold_condo(&input) {
            Err(SimulationError::InvalidInput { field, .. }) => assert_eq!(field, "escalator_rate"),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_lease_beyond_projection_limit_is_rejected() {
        let mut input = one_year_input();
        input.lease_years = u32::MAX;
        match simulate_leasehold_condo(&input) {
            Err(SimulationError::InvalidInput { field, .. }) => assert_eq!(field, "lease_years"),
            other => panic!("expected InvalidInput, got {other:?}"),
        }

        input.lease_years = crate::simulator::MAX_HORIZON_YEARS;
        assert!(simulate_leasehold_condo(&input).is_ok());
    }
}
