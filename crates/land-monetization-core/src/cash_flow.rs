use rust_decimal::Decimal;

use crate::types::{AnnualCashFlow, Money};

/// Ordered annual cash-flow series with a running cumulative total.
///
/// Entries are appended in strictly ascending year order; each entry's
/// `cumulative` equals the previous entry's `cumulative` plus its own `cf`.
#[derive(Debug, Clone, Default)]
pub struct CashFlowSeries {
    entries: Vec<AnnualCashFlow>,
}

impl CashFlowSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Append the cash flow for `year`, extending the cumulative total.
    ///
    /// Returns `None` and leaves the series untouched when the running total
    /// would overflow.
    #[must_use]
    pub fn push(&mut self, year: u32, cf: Money) -> Option<()> {
        debug_assert!(
            self.entries.last().is_none_or(|last| last.year < year),
            "cash-flow years must be strictly ascending (got {year})"
        );
        let cumulative = self.cumulative().checked_add(cf)?;
        self.entries.push(AnnualCashFlow {
            year,
            cf,
            cumulative,
        });
        Some(())
    }

    /// Shift the final entry's `cf` and `cumulative` by `delta`.
    ///
    /// Only the last entry may be adjusted after the fact, so the cumulative
    /// invariant holds for every earlier entry without a rescan. An empty
    /// series is left as is.
    #[must_use]
    pub fn adjust_last(&mut self, delta: Money) -> Option<()> {
        if let Some(last) = self.entries.last_mut() {
            let cf = last.cf.checked_add(delta)?;
            let cumulative = last.cumulative.checked_add(delta)?;
            last.cf = cf;
            last.cumulative = cumulative;
        }
        Some(())
    }

    /// Running total through the last entry (zero when empty).
    pub fn cumulative(&self) -> Money {
        self.entries
            .last()
            .map(|e| e.cumulative)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn last_year(&self) -> Option<u32> {
        self.entries.last().map(|e| e.year)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[AnnualCashFlow] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<AnnualCashFlow> {
        self.entries
    }
}
