// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::Engine;
use crate::models::Portion;
use crate::month::Month;
use crate::utils::{
    fmt_money, id_for_budget, id_for_document, maybe_print_json, parse_amount, parse_month,
    pretty_table,
};
use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, params};

pub fn handle(engine: &Engine, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => set(engine, sub)?,
        Some(("move", sub)) => move_between(engine, sub)?,
        Some(("list", sub)) => list(engine, sub)?,
        _ => {}
    }
    Ok(())
}

fn budgeted_for(conn: &Connection, budget_id: i64, month: Month) -> Result<i64> {
    let v: Option<i64> = conn
        .query_row(
            "SELECT budgeted FROM portions WHERE budget_id=?1 AND month=?2",
            params![budget_id, month],
            |r| r.get(0),
        )
        .optional()?;
    Ok(v.unwrap_or(0))
}

fn upsert(conn: &Connection, budget_id: i64, month: Month, budgeted: i64) -> Result<()> {
    conn.execute(
        "INSERT INTO portions(budget_id, month, budgeted) VALUES (?1,?2,?3)
         ON CONFLICT(budget_id, month) DO UPDATE SET budgeted=excluded.budgeted",
        params![budget_id, month, budgeted],
    )?;
    Ok(())
}

fn set(engine: &Engine, sub: &clap::ArgMatches) -> Result<()> {
    let month = parse_month(sub.get_one::<String>("month").unwrap())?;
    let budget = sub.get_one::<String>("budget").unwrap().trim().to_string();
    let amount = parse_amount(sub.get_one::<String>("amount").unwrap())?;

    let document_id = {
        let conn = engine.store().conn()?;
        let document_id = id_for_document(&conn, sub.get_one::<String>("document").unwrap())?;
        let budget_id = id_for_budget(&conn, document_id, &budget)?;
        upsert(&conn, budget_id, month, amount)?;
        document_id
    };
    engine.recalculate_after_change(document_id, month)?;
    println!("Budgeted {} to {} for {}", fmt_money(amount), budget, month);
    Ok(())
}

fn move_between(engine: &Engine, sub: &clap::ArgMatches) -> Result<()> {
    let month = parse_month(sub.get_one::<String>("month").unwrap())?;
    let from = sub.get_one::<String>("from").unwrap().trim().to_string();
    let to = sub.get_one::<String>("to").unwrap().trim().to_string();
    let amount = parse_amount(sub.get_one::<String>("amount").unwrap())?;

    let document_id = {
        let mut conn = engine.store().conn()?;
        let document_id = id_for_document(&conn, sub.get_one::<String>("document").unwrap())?;
        let from_id = id_for_budget(&conn, document_id, &from)?;
        let to_id = id_for_budget(&conn, document_id, &to)?;

        let tx = conn.transaction()?;
        let from_amt = budgeted_for(&tx, from_id, month)?;
        let to_amt = budgeted_for(&tx, to_id, month)?;
        upsert(&tx, from_id, month, from_amt - amount)?;
        upsert(&tx, to_id, month, to_amt + amount)?;
        tx.commit()?;
        document_id
    };
    engine.recalculate_after_change(document_id, month)?;
    println!("Moved {} from {} to {} in {}", fmt_money(amount), from, to, month);
    Ok(())
}

fn list(engine: &Engine, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let month = parse_month(sub.get_one::<String>("month").unwrap())?;
    let conn = engine.store().conn()?;
    let document_id = id_for_document(&conn, sub.get_one::<String>("document").unwrap())?;
    let portions = portions_in(&conn, document_id, month)?;
    if !maybe_print_json(json_flag, jsonl_flag, &portions)? {
        let rows = portions
            .into_iter()
            .map(|(budget, p)| vec![budget, p.month.to_string(), fmt_money(p.budgeted)])
            .collect();
        println!("{}", pretty_table(&["Budget", "Month", "Budgeted"], rows));
    }
    Ok(())
}

pub fn portions_in(
    conn: &Connection,
    document_id: i64,
    month: Month,
) -> Result<Vec<(String, Portion)>> {
    let mut stmt = conn.prepare(
        "SELECT b.name, p.id, p.budget_id, p.month, p.budgeted FROM portions p
         JOIN budgets b ON b.id=p.budget_id
         JOIN categories c ON c.id=b.category_id
         WHERE c.document_id=?1 AND p.month=?2
         ORDER BY b.name",
    )?;
    let rows = stmt.query_map(params![document_id, month], |r| {
        Ok((
            r.get::<_, String>(0)?,
            Portion {
                id: r.get(1)?,
                budget_id: r.get(2)?,
                month: r.get(3)?,
                budgeted: r.get(4)?,
            },
        ))
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}
