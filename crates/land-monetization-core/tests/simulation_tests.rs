use land_monetization_core::simulator::land_swap::{developer_economics, simulate_land_swap};
use land_monetization_core::simulator::leasehold_condo::simulate_leasehold_condo;
use land_monetization_core::simulator::master_lease::simulate_master_lease;
use land_monetization_core::simulator::{
    run_simulation, simulate, simulate_with_overrides, LandSwapParams, LeaseholdCondoParams,
    MasterLeaseParams, ScenarioKind, ScenarioParameters, SimulationRequest,
};
use land_monetization_core::time_value::{payback_year, solve_irr, PaybackRule};
use land_monetization_core::{AnnualCashFlow, SimulationError, SimulationResult};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;

fn flows(values: &[(u32, Decimal)]) -> Vec<AnnualCashFlow> {
    let mut cumulative = Decimal::ZERO;
    values
        .iter()
        .map(|&(year, cf)| {
            cumulative += cf;
            AnnualCashFlow {
                year,
                cf,
                cumulative,
            }
        })
        .collect()
}

fn assert_series_invariants(result: &SimulationResult) {
    let mut running = Decimal::ZERO;
    for (i, entry) in result.annual_cf.iter().enumerate() {
        if i > 0 {
            assert!(
                entry.year > result.annual_cf[i - 1].year,
                "years not strictly ascending at index {i}"
            );
        }
        running += entry.cf;
        assert_eq!(entry.cumulative, running, "cumulative drift at year {}", entry.year);
    }
}

// ===========================================================================
// Series invariants across every scenario
// ===========================================================================

#[test]
fn test_default_scenarios_keep_series_invariants() {
    for kind in ScenarioKind::ALL {
        let out = simulate(&ScenarioParameters::defaults(kind)).unwrap();
        assert_series_invariants(&out.result);
        assert_eq!(out.metadata.precision, "rust_decimal_128bit");
    }
}

#[test]
fn test_varied_scenarios_keep_series_invariants() {
    let mut lease = LeaseholdCondoParams::default();
    lease.upfront_premium = dec!(25000000);
    lease.owner_unit_area = dec!(60);
    assert_series_invariants(&simulate_leasehold_condo(&lease).unwrap().result);

    let mut swap = LandSwapParams::default();
    swap.sell_after_acquisition = true;
    assert_series_invariants(&simulate_land_swap(&swap).unwrap().result);
    swap.developer_margin_rate = dec!(0.45);
    assert_series_invariants(&simulate_land_swap(&swap).unwrap().result);

    let mut master = MasterLeaseParams::default();
    master.initial_capex_owner = dec!(40000000);
    master.terminal_cost = dec!(8000000);
    master.escalator_rate = dec!(0.01);
    assert_series_invariants(&simulate_master_lease(&master).unwrap().result);
}

// ===========================================================================
// Time-value helpers
// ===========================================================================

#[test]
fn test_irr_two_period_reference() {
    // -100 today, +121 in two years => 10% per year
    let irr = solve_irr(
        &flows(&[(0, dec!(-100)), (1, Decimal::ZERO), (2, dec!(121))]),
        Decimal::ZERO,
    )
    .unwrap();
    assert!((irr - dec!(0.10)).abs() < dec!(0.001), "irr {irr}");

    // Investment of 100 against a single 121 inflow at year 1 => 21%
    let irr = solve_irr(&flows(&[(1, dec!(121))]), dec!(100)).unwrap();
    assert!((irr - dec!(0.21)).abs() < dec!(0.001), "irr {irr}");
}

#[test]
fn test_irr_absent_without_sign_change() {
    assert_eq!(solve_irr(&flows(&[(1, dec!(50)), (2, dec!(50))]), Decimal::ZERO), None);
    assert_eq!(solve_irr(&[], dec!(100)), None);
}

#[test]
fn test_payback_rules() {
    let never = flows(&[(1, dec!(-10)), (2, dec!(-5))]);
    assert_eq!(payback_year(&never, PaybackRule::NonNegative), None);

    let immediate = flows(&[(1, dec!(10)), (2, dec!(10))]);
    assert_eq!(payback_year(&immediate, PaybackRule::NonNegative), Some(1));

    // Zero cumulative counts as recovered only under the non-negative rule
    let break_even = flows(&[(1, Decimal::ZERO), (2, dec!(5))]);
    assert_eq!(payback_year(&break_even, PaybackRule::NonNegative), Some(1));
    assert_eq!(payback_year(&break_even, PaybackRule::StrictlyPositive), Some(2));
}

// ===========================================================================
// Leasehold condo
// ===========================================================================

#[test]
fn test_leasehold_known_answer_via_request() {
    let request = SimulationRequest {
        scenario_kind: "leaseholdCondo".into(),
        parameters: json!({
            "land_area": 100,
            "land_unit_price": 500000,
            "ground_rent_yield": "0.03",
            "lease_years": 1,
            "escalator_rate": 0,
            "tax_rate_fixed_asset": 0,
            "maintenance_rate": 0,
            "discount_rate": "0.03",
        }),
    };
    let out = run_simulation(&request).unwrap().result;

    assert_eq!(out.annual_cf.len(), 1);
    assert_eq!(out.annual_cf[0].cf, dec!(1500000));
    assert!((out.npv - dec!(1456310.68)).abs() < dec!(0.01), "npv {}", out.npv);
    assert!(out.feasible);
    assert_eq!(out.payback_year, Some(1));
}

#[test]
fn test_leasehold_longer_term_raises_npv() {
    let short = simulate_with_overrides(ScenarioKind::LeaseholdCondo, &json!({ "lease_years": 30 }))
        .unwrap()
        .result;
    let long = simulate_with_overrides(ScenarioKind::LeaseholdCondo, &json!({ "lease_years": 70 }))
        .unwrap()
        .result;
    assert!(long.npv > short.npv);
    assert_eq!(long.annual_cf.len(), 70);
}

// ===========================================================================
// Land swap
// ===========================================================================

#[test]
fn test_land_swap_margin_never_raises_budget() {
    let mut input = LandSwapParams::default();
    let mut previous = developer_economics(&input).unwrap().land_budget;
    for step in 1..=10 {
        input.developer_margin_rate = dec!(0.05) * Decimal::from(step);
        let budget = developer_economics(&input).unwrap().land_budget;
        assert!(budget <= previous);
        previous = budget;
    }
}

#[test]
fn test_land_swap_feasibility_flips_with_margin() {
    let feasible = simulate_with_overrides(
        ScenarioKind::LandSwap,
        &json!({ "developer_margin_rate": "0.15" }),
    )
    .unwrap()
    .result;
    let infeasible = simulate_with_overrides(
        ScenarioKind::LandSwap,
        &json!({ "developer_margin_rate": "0.40" }),
    )
    .unwrap()
    .result;

    assert!(feasible.feasible);
    assert!(!infeasible.feasible);
    assert!(infeasible.npv < Decimal::ZERO);
    assert!(infeasible.notes.iter().any(|n| n.contains("must rise by")));
}

#[test]
fn test_land_swap_default_rental_profile() {
    // 300 m² * 600,000 = 180M land value, fully covered by the budget.
    // 180M / 900,000 = 200 m² acquired; 200 * 5,000 * 12 = 12M rent;
    // 12M - 2.52M tax - 0.9M maintenance = 8.58M a year.
    let out = simulate_land_swap(&LandSwapParams::default()).unwrap().result;

    assert!(out.feasible);
    assert_eq!(out.initial_investment, dec!(180000000));
    assert_eq!(out.annual_cf.len(), 34);
    assert_eq!(out.annual_cf[3].year, 4);
    assert_eq!(out.annual_cf[3].cf, Decimal::ZERO);
    assert_eq!(out.annual_cf[4].cf, dec!(8580000));
    assert_eq!(out.payback_year, Some(5));
    assert_eq!(out.total_revenue, dec!(360000000));
}

#[test]
fn test_land_swap_sale_books_value_at_acquisition() {
    let out = simulate_with_overrides(
        ScenarioKind::LandSwap,
        &json!({ "sell_after_acquisition": true }),
    )
    .unwrap()
    .result;

    let last = out.annual_cf.last().unwrap();
    assert_eq!(last.year, 4);
    assert_eq!(last.cf, dec!(180000000));
    assert_eq!(out.total_revenue, dec!(180000000));
    assert_eq!(out.payback_year, Some(4));
}

// ===========================================================================
// Master lease
// ===========================================================================

#[test]
fn test_master_lease_variable_cost_monotonic() {
    let mut previous: Option<Decimal> = None;
    for rate in [dec!(0), dec!(0.05), dec!(0.10), dec!(0.20), dec!(0.30)] {
        let input = MasterLeaseParams {
            variable_cost_rate: rate,
            ..MasterLeaseParams::default()
        };
        let npv = simulate_master_lease(&input).unwrap().result.npv;
        if let Some(prev) = previous {
            assert!(npv < prev, "npv did not fall at variable_cost_rate {rate}");
        }
        previous = Some(npv);
    }
}

#[test]
fn test_master_lease_capex_gives_irr() {
    let out = simulate_with_overrides(
        ScenarioKind::MasterLease,
        &json!({ "initial_capex_owner": "50000000" }),
    )
    .unwrap()
    .result;

    assert_eq!(out.annual_cf[0].year, 0);
    assert_eq!(out.initial_investment, dec!(50000000));
    assert!(out.irr.is_some());
    assert!(out.payback_year.unwrap() > 1);
}

// ===========================================================================
// Dispatcher errors
// ===========================================================================

#[test]
fn test_unknown_kind_is_rejected() {
    let request = SimulationRequest {
        scenario_kind: "reverseMortgage".into(),
        parameters: json!({}),
    };
    match run_simulation(&request) {
        Err(SimulationError::InvalidScenarioKind { kind }) => assert_eq!(kind, "reverseMortgage"),
        other => panic!("expected InvalidScenarioKind, got {other:?}"),
    }
}

#[test]
fn test_bad_parameter_type_is_rejected() {
    let err = simulate_with_overrides(ScenarioKind::LeaseholdCondo, &json!({ "lease_years": "long" }))
        .unwrap_err();
    assert!(matches!(err, SimulationError::InvalidParameters(_)));
}

#[test]
fn test_discount_rate_below_minus_one_is_rejected() {
    let err = simulate_with_overrides(ScenarioKind::MasterLease, &json!({ "discount_rate": "-1" }))
        .unwrap_err();
    assert!(matches!(err, SimulationError::InvalidInput { .. }));
}
