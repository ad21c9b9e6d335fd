// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::errors::{Error, Result};
use crate::ledger::LedgerStore;
use crate::models::{AccountBalance, UnitType};
use crate::month::{Month, TimeWindow};
use log::debug;

const INCOME: &[Option<UnitType>] = &[Some(UnitType::Income)];
const INCOME_NEXT: &[Option<UnitType>] = &[Some(UnitType::IncomeNext)];
const UNBUDGETED: &[Option<UnitType>] = &[None];
const OUTFLOW: &[Option<UnitType>] = &[None, Some(UnitType::Budget)];

/// Raw sums for one window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowTotals {
    pub income: i64,
    pub budgeted: i64,
    pub unbudgeted_units: i64,
    pub unbudgeted_transactions: i64,
}

impl WindowTotals {
    /// `None` when the sum leaves the i64 range.
    pub fn unbudgeted(&self) -> Option<i64> {
        self.unbudgeted_units
            .checked_add(self.unbudgeted_transactions)
    }
}

/// Everything the calculator needs for one (document, month).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonthFigures {
    pub till_last_month: WindowTotals,
    pub this_month: WindowTotals,
    pub outflow_units: i64,
    pub accounts: Vec<AccountBalance>,
}

impl MonthFigures {
    /// Document-wide balance; `None` when it leaves the i64 range.
    pub fn balance(&self) -> Option<i64> {
        self.accounts
            .iter()
            .try_fold(0i64, |acc, a| acc.checked_add(a.total()?))
    }
}

fn checked_income(income: i64, deferred: i64) -> Result<i64> {
    income.checked_add(deferred).ok_or(Error::Overflow("income"))
}

pub struct MonthAggregator<'a, S: LedgerStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: LedgerStore + ?Sized> MonthAggregator<'a, S> {
    pub fn new(store: &'a S) -> Self {
        MonthAggregator { store }
    }

    pub fn aggregate(&self, document_id: i64, month: Month) -> Result<MonthFigures> {
        let last = month.prev();
        let figures = MonthFigures {
            till_last_month: self.till(document_id, last)?,
            this_month: self.within(document_id, month)?,
            outflow_units: self
                .store
                .sum_units(document_id, OUTFLOW, TimeWindow::within(month))?,
            accounts: self.store.account_balances(document_id, month.end())?,
        };
        debug!(
            "aggregated document {} {}: till={:?} this={:?} outflow_units={} balance={:?}",
            document_id,
            month,
            figures.till_last_month,
            figures.this_month,
            figures.outflow_units,
            figures.balance()
        );
        Ok(figures)
    }

    /// Totals for everything up to the end of `month`.
    fn till(&self, document_id: i64, month: Month) -> Result<WindowTotals> {
        let window = TimeWindow::through(month);
        Ok(WindowTotals {
            income: checked_income(
                self.store.sum_units(document_id, INCOME, window)?,
                self.store
                    .sum_units(document_id, INCOME_NEXT, TimeWindow::through(month.prev()))?,
            )?,
            budgeted: self.store.sum_portions(document_id, None, month)?,
            unbudgeted_units: self.store.sum_units(document_id, UNBUDGETED, window)?,
            unbudgeted_transactions: self.store.sum_bare_transactions(document_id, window)?,
        })
    }

    /// Totals for the span of `month` alone.
    fn within(&self, document_id: i64, month: Month) -> Result<WindowTotals> {
        let window = TimeWindow::within(month);
        Ok(WindowTotals {
            income: checked_income(
                self.store.sum_units(document_id, INCOME, window)?,
                self.store
                    .sum_units(document_id, INCOME_NEXT, TimeWindow::within(month.prev()))?,
            )?,
            budgeted: self.store.sum_portions(document_id, Some(month), month)?,
            unbudgeted_units: self.store.sum_units(document_id, UNBUDGETED, window)?,
            unbudgeted_transactions: self.store.sum_bare_transactions(document_id, window)?,
        })
    }
}
