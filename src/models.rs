// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::month::Month;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub document_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payee {
    pub id: i64,
    pub name: String,
    pub document_id: i64,
    pub updated_at: String,
}

/// A document-scoped setting. The key is fixed once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Setting {
    pub id: i64,
    pub document_id: i64,
    pub key: String,
    pub value: serde_json::Value,
}

/// Classification of a transaction split. An untyped split is unbudgeted money.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnitType {
    Income,
    IncomeNext,
    Budget,
    Transfer,
}

impl UnitType {
    pub fn as_str(self) -> &'static str {
        match self {
            UnitType::Income => "INCOME",
            UnitType::IncomeNext => "INCOME_NEXT",
            UnitType::Budget => "BUDGET",
            UnitType::Transfer => "TRANSFER",
        }
    }
}

impl fmt::Display for UnitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub document_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub id: i64,
    pub name: String,
    pub category_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Portion {
    pub id: i64,
    pub budget_id: i64,
    pub month: Month,
    pub budgeted: i64,
}

/// Monthly rollup for one document. All amounts are minor units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub month: Month,
    pub available: i64,
    pub available_last_month: i64,
    pub income: i64,
    pub budgeted: i64,
    pub unbudgeted: i64,
    pub outflow: i64,
    pub balance: i64,
    pub document_id: i64,
}

impl Summary {
    /// An unsaved summary with every figure zeroed.
    pub fn new(document_id: i64, month: Month) -> Self {
        Summary {
            id: None,
            month,
            available: 0,
            available_last_month: 0,
            income: 0,
            budgeted: 0,
            unbudgeted: 0,
            outflow: 0,
            balance: 0,
            document_id,
        }
    }

    /// True when both carry the same figures, ignoring identity.
    pub fn same_figures(&self, other: &Summary) -> bool {
        (
            self.available,
            self.available_last_month,
            self.income,
            self.budgeted,
            self.unbudgeted,
            self.outflow,
            self.balance,
        ) == (
            other.available,
            other.available_last_month,
            other.income,
            other.budgeted,
            other.unbudgeted,
            other.outflow,
            other.balance,
        )
    }
}

/// Balance breakdown of one account at a cutoff instant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountBalance {
    pub account_id: i64,
    pub bare: i64,
    pub units: i64,
    pub transfer_source: i64,
    pub transfer_destination: i64,
}

impl AccountBalance {
    /// Transfer units count with their own sign on the posting account and
    /// negated on the named counterpart, so both legs cancel document-wide.
    /// `None` when the total leaves the i64 range.
    pub fn total(&self) -> Option<i64> {
        self.bare
            .checked_add(self.units)?
            .checked_add(self.transfer_source)?
            .checked_sub(self.transfer_destination)
    }
}
