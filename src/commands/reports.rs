// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::Engine;
use crate::commands::accounts::accounts_of;
use crate::ledger::LedgerStore;
use crate::models::AccountBalance;
use crate::month::Month;
use crate::utils::{fmt_money, id_for_document, maybe_print_json, parse_month, pretty_table};
use anyhow::{Result, anyhow};
use serde::Serialize;
use std::collections::HashMap;

pub fn handle(engine: &Engine, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("balances", sub)) => balances(engine, sub)?,
        _ => {}
    }
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceRow {
    pub account: String,
    #[serde(flatten)]
    pub balance: AccountBalance,
    pub total: i64,
}

/// Per-account balances at the end of `month`.
pub fn balance_rows(engine: &Engine, document_id: i64, month: Month) -> Result<Vec<BalanceRow>> {
    let names: HashMap<i64, String> = accounts_of(&*engine.store().conn()?, document_id)?
        .into_iter()
        .map(|a| (a.id, a.name))
        .collect();
    let balances = engine.store().account_balances(document_id, month.end())?;
    let mut rows = Vec::with_capacity(balances.len());
    for b in balances {
        let account = names
            .get(&b.account_id)
            .cloned()
            .unwrap_or_else(|| format!("#{}", b.account_id));
        let total = b
            .total()
            .ok_or_else(|| anyhow!("Balance of account '{}' is out of range", account))?;
        rows.push(BalanceRow {
            account,
            balance: b,
            total,
        });
    }
    Ok(rows)
}

fn balances(engine: &Engine, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let month = match sub.get_one::<String>("month") {
        Some(raw) => parse_month(raw)?,
        None => Month::of(chrono::Utc::now().date_naive()),
    };
    let document_id = id_for_document(
        &*engine.store().conn()?,
        sub.get_one::<String>("document").unwrap(),
    )?;
    let rows = balance_rows(engine, document_id, month)?;
    if !maybe_print_json(json_flag, jsonl_flag, &rows)? {
        let total = rows
            .iter()
            .try_fold(0i64, |acc, r| acc.checked_add(r.total))
            .ok_or_else(|| anyhow!("Document balance is out of range"))?;
        let mut data: Vec<Vec<String>> = rows
            .iter()
            .map(|r| {
                vec![
                    r.account.clone(),
                    fmt_money(r.balance.bare),
                    fmt_money(r.balance.units),
                    fmt_money(r.balance.transfer_source),
                    fmt_money(-r.balance.transfer_destination),
                    fmt_money(r.total),
                ]
            })
            .collect();
        data.push(vec![
            "(document)".into(),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            fmt_money(total),
        ]);
        println!("Balances at end of {}", month);
        println!(
            "{}",
            pretty_table(
                &[
                    "Account",
                    "Unsplit",
                    "Units",
                    "Transfers out",
                    "Transfers in",
                    "Balance"
                ],
                data
            )
        );
    }
    Ok(())
}
