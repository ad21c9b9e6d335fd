// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::aggregator::MonthFigures;
use crate::errors::{Error, Result};
use crate::models::Summary;

/// The published figures of one month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SummaryFigures {
    pub available: i64,
    pub available_last_month: i64,
    pub income: i64,
    pub budgeted: i64,
    pub unbudgeted: i64,
    pub outflow: i64,
    pub balance: i64,
}

fn add(field: &'static str, a: i64, b: i64) -> Result<i64> {
    a.checked_add(b).ok_or(Error::Overflow(field))
}

fn sub(field: &'static str, a: i64, b: i64) -> Result<i64> {
    a.checked_sub(b).ok_or(Error::Overflow(field))
}

/// Combines both windows. Any figure leaving the i64 range is an
/// [`Error::Overflow`] naming it.
pub fn calculate(figures: &MonthFigures) -> Result<SummaryFigures> {
    let last = &figures.till_last_month;
    let this = &figures.this_month;

    let last_unbudgeted = last.unbudgeted().ok_or(Error::Overflow("unbudgeted"))?;
    let this_unbudgeted = this.unbudgeted().ok_or(Error::Overflow("unbudgeted"))?;

    let income_till_this_month = add("income", last.income, this.income)?;
    let budgeted_till_this_month = add("budgeted", last.budgeted, this.budgeted)?;
    let unbudgeted_till_this_month = add("unbudgeted", last_unbudgeted, this_unbudgeted)?;

    Ok(SummaryFigures {
        available: add(
            "available",
            sub("available", income_till_this_month, budgeted_till_this_month)?,
            unbudgeted_till_this_month,
        )?,
        available_last_month: add(
            "availableLastMonth",
            sub("availableLastMonth", last.income, last.budgeted)?,
            last_unbudgeted,
        )?,
        income: this.income,
        budgeted: this.budgeted,
        unbudgeted: this_unbudgeted,
        outflow: add(
            "outflow",
            figures.outflow_units,
            this.unbudgeted_transactions,
        )?,
        balance: figures.balance().ok_or(Error::Overflow("balance"))?,
    })
}

impl Summary {
    /// Replaces every figure; identity fields are untouched.
    pub fn apply(&mut self, figures: SummaryFigures) {
        self.available = figures.available;
        self.available_last_month = figures.available_last_month;
        self.income = figures.income;
        self.budgeted = figures.budgeted;
        self.unbudgeted = figures.unbudgeted;
        self.outflow = figures.outflow;
        self.balance = figures.balance;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AccountBalance;
    use crate::summary::aggregator::WindowTotals;

    fn figures() -> MonthFigures {
        MonthFigures {
            till_last_month: WindowTotals {
                income: 5000,
                budgeted: 3000,
                unbudgeted_units: -200,
                unbudgeted_transactions: -100,
            },
            this_month: WindowTotals {
                income: 1000,
                budgeted: 800,
                unbudgeted_units: -50,
                unbudgeted_transactions: -25,
            },
            outflow_units: -400,
            accounts: vec![
                AccountBalance {
                    account_id: 1,
                    bare: -125,
                    units: 5350,
                    transfer_source: -300,
                    transfer_destination: 0,
                },
                AccountBalance {
                    account_id: 2,
                    transfer_destination: -300,
                    ..Default::default()
                },
            ],
        }
    }

    #[test]
    fn combines_windows() {
        let out = calculate(&figures()).unwrap();
        assert_eq!(out.available, 6000 - 3800 - 375);
        assert_eq!(out.available_last_month, 5000 - 3000 - 300);
        assert_eq!(out.income, 1000);
        assert_eq!(out.budgeted, 800);
        assert_eq!(out.unbudgeted, -75);
        assert_eq!(out.outflow, -425);
        assert_eq!(out.balance, 5225);
    }

    #[test]
    fn empty_figures_are_zero() {
        assert_eq!(
            calculate(&MonthFigures::default()).unwrap(),
            SummaryFigures::default()
        );
    }

    #[test]
    fn out_of_range_figures_are_errors() {
        let mut f = figures();
        f.till_last_month.income = i64::MAX;
        assert!(matches!(calculate(&f), Err(Error::Overflow("income"))));

        let mut f = figures();
        f.till_last_month.budgeted = i64::MAX;
        assert!(matches!(calculate(&f), Err(Error::Overflow("budgeted"))));

        let mut f = figures();
        f.outflow_units = i64::MIN;
        assert!(matches!(calculate(&f), Err(Error::Overflow("outflow"))));

        let mut f = figures();
        f.accounts[1].bare = i64::MAX;
        assert!(matches!(calculate(&f), Err(Error::Overflow("balance"))));
    }
}
