// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::Engine;
use crate::ledger::LedgerStore;
use crate::models::Summary;
use crate::month::Month;
use crate::utils::{fmt_money, id_for_document, maybe_print_json, pretty_table};
use anyhow::{Context, Result};
use rusqlite::{Connection, params};

pub fn handle(engine: &Engine, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => show(engine, sub)?,
        Some(("list", sub)) => list(engine, sub)?,
        Some(("recalc", sub)) => recalc(engine, sub)?,
        _ => {}
    }
    Ok(())
}

const HEADERS: [&str; 8] = [
    "Month",
    "Available",
    "Avail. last month",
    "Income",
    "Budgeted",
    "Unbudgeted",
    "Outflow",
    "Balance",
];

fn summary_row(s: &Summary) -> Vec<String> {
    vec![
        s.month.to_string(),
        fmt_money(s.available),
        fmt_money(s.available_last_month),
        fmt_money(s.income),
        fmt_money(s.budgeted),
        fmt_money(s.unbudgeted),
        fmt_money(s.outflow),
        fmt_money(s.balance),
    ]
}

fn document_id(engine: &Engine, sub: &clap::ArgMatches) -> Result<i64> {
    let conn = engine.store().conn()?;
    id_for_document(&conn, sub.get_one::<String>("document").unwrap())
}

pub fn earliest_month(conn: &Connection, document_id: i64) -> Result<Option<Month>> {
    let m: Option<Month> = conn.query_row(
        "SELECT MIN(month) FROM summaries WHERE document_id=?1",
        params![document_id],
        |r| r.get(0),
    )?;
    Ok(m)
}

/// Every stored summary of the document, oldest first.
pub fn stored_summaries(engine: &Engine, document_id: i64) -> Result<Vec<Summary>> {
    let earliest = earliest_month(&*engine.store().conn()?, document_id)?;
    match earliest {
        Some(month) => Ok(engine.store().summaries_from(document_id, month)?),
        None => Ok(Vec::new()),
    }
}

fn show(engine: &Engine, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let month = sub.get_one::<String>("month").unwrap();
    let document_id = document_id(engine, sub)?;
    let summary = engine
        .get_or_create(document_id, month)
        .with_context(|| format!("Summary for {}", month.trim()))?;
    if !maybe_print_json(json_flag, jsonl_flag, &summary)? {
        println!("{}", pretty_table(&HEADERS, vec![summary_row(&summary)]));
    }
    Ok(())
}

fn list(engine: &Engine, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let summaries = stored_summaries(engine, document_id(engine, sub)?)?;
    if !maybe_print_json(json_flag, jsonl_flag, &summaries)? {
        let rows = summaries.iter().map(summary_row).collect();
        println!("{}", pretty_table(&HEADERS, rows));
    }
    Ok(())
}

fn recalc(engine: &Engine, sub: &clap::ArgMatches) -> Result<()> {
    let document_id = document_id(engine, sub)?;
    let from = match sub.get_one::<String>("from") {
        Some(raw) => Some(raw.parse::<Month>()?),
        None => earliest_month(&*engine.store().conn()?, document_id)?,
    };
    let Some(from) = from else {
        println!("No stored summaries to recalculate");
        return Ok(());
    };
    let updated = engine.recalculate_after_change(document_id, from)?;
    println!("Recalculated {} summaries from {}", updated.len(), from);
    Ok(())
}
