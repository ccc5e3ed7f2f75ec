use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::types::{AnnualCashFlow, Money, Rate};

pub const IRR_INITIAL_GUESS: Rate = dec!(0.10);
pub const IRR_MAX_ITERATIONS: u32 = 20;
/// Convergence threshold on |NPV(r)|, in currency units
pub const IRR_TOLERANCE: Money = dec!(0.01);

const IRR_LOWER_BOUND: Rate = dec!(-0.99);
const IRR_UPPER_BOUND: Rate = dec!(10);

/// Present value of `cf` received at the end of `year`, discounted at `rate`.
///
/// Year 0 is returned undiscounted. A discount factor too large to represent
/// contributes nothing, which is the limit of `cf / (1+r)^t`.
pub fn present_value(cf: Money, rate: Rate, year: u32) -> Money {
    if year == 0 {
        return cf;
    }
    match Decimal::ONE
        .checked_add(rate)
        .and_then(|base| base.checked_powu(u64::from(year)))
    {
        Some(factor) if !factor.is_zero() => cf.checked_div(factor).unwrap_or(Decimal::ZERO),
        _ => Decimal::ZERO,
    }
}

/// Internal rate of return of `cash_flows` against a separate upfront outlay.
///
/// Solves `-initial_investment + sum(cf_t / (1+r)^year) = 0` by Newton-Raphson
/// starting at 10%. Returns `None` when the flows never change sign, when an
/// iterate leaves (-0.99, 10), or when the derivative vanishes.
pub fn solve_irr(cash_flows: &[AnnualCashFlow], initial_investment: Money) -> Option<Rate> {
    if !has_sign_change(cash_flows, initial_investment) {
        debug!("IRR undefined: cash flows never change sign");
        return None;
    }

    let mut rate = IRR_INITIAL_GUESS;

    for i in 0..IRR_MAX_ITERATIONS {
        let (npv, dnpv) = npv_and_derivative(cash_flows, initial_investment, rate)?;
        trace!(iteration = i, %rate, %npv, "IRR newton step");

        if npv.abs() < IRR_TOLERANCE {
            return Some(rate);
        }

        if dnpv.is_zero() {
            debug!(iteration = i, %rate, "IRR undefined: derivative vanished");
            return None;
        }

        rate = rate.checked_sub(npv.checked_div(dnpv)?)?;

        if rate <= IRR_LOWER_BOUND || rate >= IRR_UPPER_BOUND {
            debug!(iteration = i, %rate, "IRR undefined: iterate left solver domain");
            return None;
        }
    }

    debug!(%rate, "IRR iteration cap reached; returning last iterate");
    Some(rate)
}

/// NPV(r) = -I + sum CF_t / (1+r)^t and its derivative d(NPV)/dr.
///
/// Returns `None` when a discount factor underflows to zero (the iterate is
/// too close to -100% for the horizon) or a sum leaves the decimal range.
fn npv_and_derivative(
    cash_flows: &[AnnualCashFlow],
    initial_investment: Money,
    rate: Rate,
) -> Option<(Decimal, Decimal)> {
    let one_plus_r = Decimal::ONE + rate;
    let mut npv = -initial_investment;
    let mut dnpv = Decimal::ZERO;

    for entry in cash_flows {
        if entry.year == 0 {
            npv = npv.checked_add(entry.cf)?;
            continue;
        }

        let factor = match one_plus_r.checked_powu(u64::from(entry.year)) {
            Some(f) if f.is_zero() => return None,
            Some(f) => f,
            // (1+r)^t beyond Decimal range: the term is negligible
            None if one_plus_r > Decimal::ONE => continue,
            None => return None,
        };

        npv = npv.checked_add(entry.cf.checked_div(factor)?)?;
        // d/dr of CF_t / (1+r)^t = -t * CF_t / ((1+r)^t * (1+r))
        let weighted = entry.cf.checked_mul(Decimal::from(entry.year))?;
        let denom = factor.checked_mul(one_plus_r)?;
        dnpv = dnpv.checked_sub(weighted.checked_div(denom)?)?;
    }

    Some((npv, dnpv))
}

/// True when the outlay and the flows contain both a positive and a negative value.
fn has_sign_change(cash_flows: &[AnnualCashFlow], initial_investment: Money) -> bool {
    let outlay = -initial_investment;
    let values = std::iter::once(outlay).chain(cash_flows.iter().map(|e| e.cf));

    let mut positive = false;
    let mut negative = false;
    for v in values {
        if v > Decimal::ZERO {
            positive = true;
        } else if v < Decimal::ZERO {
            negative = true;
        }
    }
    positive && negative
}

/// Threshold a cumulative total must reach for the outlay to count as recovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaybackRule {
    /// `cumulative >= 0` (leasehold condo, master lease)
    NonNegative,
    /// `cumulative > 0` (land swap)
    StrictlyPositive,
}

impl PaybackRule {
    fn is_recovered(self, cumulative: Money) -> bool {
        match self {
            PaybackRule::NonNegative => cumulative >= Decimal::ZERO,
            PaybackRule::StrictlyPositive => cumulative > Decimal::ZERO,
        }
    }
}

/// First year whose cumulative cash flow satisfies `rule`.
pub fn payback_year(cash_flows: &[AnnualCashFlow], rule: PaybackRule) -> Option<u32> {
    cash_flows
        .iter()
        .find(|e| rule.is_recovered(e.cumulative))
        .map(|e| e.year)
}
