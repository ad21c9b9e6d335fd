// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::Engine;
use crate::commands::payees::payee_id_for;
use crate::models::UnitType;
use crate::month::{Month, TimeWindow, format_instant, parse_instant};
use crate::utils::{
    fmt_money, id_for_account, id_for_budget, id_for_document, maybe_print_json, parse_amount,
    parse_month, parse_time, pretty_table,
};
use anyhow::{Result, anyhow};
use chrono::NaiveDateTime;
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;

pub fn handle(engine: &Engine, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(engine, sub)?,
        Some(("edit", sub)) => edit(engine, sub)?,
        Some(("delete", sub)) => delete(engine, sub)?,
        Some(("list", sub)) => list(engine, sub)?,
        _ => {}
    }
    Ok(())
}

/// A parsed `--unit KIND:AMOUNT[:TARGET]` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitSpec {
    pub unit_type: Option<UnitType>,
    pub amount: i64,
    pub target: Option<String>,
}

pub fn parse_unit_spec(raw: &str) -> Result<UnitSpec> {
    let mut parts = raw.trim().splitn(3, ':');
    let kind = parts.next().unwrap_or_default().trim().to_lowercase();
    let amount = parts
        .next()
        .ok_or_else(|| anyhow!("Unit '{}' is missing an amount", raw.trim()))?;
    let target = parts
        .next()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let unit_type = match kind.as_str() {
        "unassigned" | "none" => None,
        "income" => Some(UnitType::Income),
        "income-next" | "income_next" => Some(UnitType::IncomeNext),
        "budget" => Some(UnitType::Budget),
        "transfer" => Some(UnitType::Transfer),
        other => return Err(anyhow!("Unknown unit kind '{}'", other)),
    };
    match unit_type {
        Some(UnitType::Budget) | Some(UnitType::Transfer) if target.is_none() => {
            return Err(anyhow!(
                "Unit '{}' needs a target ({} name)",
                raw.trim(),
                if unit_type == Some(UnitType::Budget) {
                    "budget"
                } else {
                    "account"
                }
            ));
        }
        _ => {}
    }
    Ok(UnitSpec {
        unit_type,
        amount: parse_amount(amount)?,
        target,
    })
}

struct ResolvedUnit {
    spec: UnitSpec,
    budget_id: Option<i64>,
    transfer_account_id: Option<i64>,
}

fn resolve_unit(
    conn: &Connection,
    document_id: i64,
    account_id: i64,
    spec: UnitSpec,
) -> Result<ResolvedUnit> {
    let target = spec.target.as_deref();
    let (budget_id, transfer_account_id) = match (spec.unit_type, target) {
        (Some(UnitType::Transfer), Some(name)) => {
            let counterpart = id_for_account(conn, document_id, name)?;
            if counterpart == account_id {
                return Err(anyhow!("Transfer counterpart must be a different account"));
            }
            (None, Some(counterpart))
        }
        (Some(UnitType::Budget), Some(name)) => {
            (Some(id_for_budget(conn, document_id, name)?), None)
        }
        (_, Some(name)) => {
            return Err(anyhow!(
                "Unit kind {} does not take a target (got '{}')",
                spec.unit_type.map_or("unassigned", UnitType::as_str),
                name
            ));
        }
        (_, None) => (None, None),
    };
    Ok(ResolvedUnit {
        spec,
        budget_id,
        transfer_account_id,
    })
}

fn add(engine: &Engine, sub: &clap::ArgMatches) -> Result<()> {
    let time = parse_time(sub.get_one::<String>("time").unwrap())?;
    let account_name = sub.get_one::<String>("account").unwrap().trim().to_string();
    let amount = parse_amount(sub.get_one::<String>("amount").unwrap())?;
    let payee = sub.get_one::<String>("payee").map(|s| s.trim().to_string());
    let memo = sub.get_one::<String>("memo").map(|s| s.to_string());
    let specs = sub
        .get_many::<String>("unit")
        .map(|vals| vals.map(|v| parse_unit_spec(v)).collect::<Result<Vec<_>>>())
        .transpose()?
        .unwrap_or_default();

    let (document_id, unit_count) = {
        let mut conn = engine.store().conn()?;
        let document_id = id_for_document(&conn, sub.get_one::<String>("document").unwrap())?;
        let account_id = id_for_account(&conn, document_id, &account_name)?;
        let units = specs
            .into_iter()
            .map(|spec| resolve_unit(&conn, document_id, account_id, spec))
            .collect::<Result<Vec<_>>>()?;

        let tx = conn.transaction()?;
        let payee_id = payee
            .as_deref()
            .map(|name| payee_id_for(&tx, document_id, name))
            .transpose()?;
        tx.execute(
            "INSERT INTO transactions(account_id, time, amount, payee_id, memo)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![account_id, format_instant(time), amount, payee_id, memo],
        )?;
        let transaction_id = tx.last_insert_rowid();
        for unit in &units {
            tx.execute(
                "INSERT INTO units(transaction_id, amount, type, budget_id, transfer_account_id)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    transaction_id,
                    unit.spec.amount,
                    unit.spec.unit_type.map(UnitType::as_str),
                    unit.budget_id,
                    unit.transfer_account_id
                ],
            )?;
        }
        tx.commit()?;
        (document_id, units.len())
    };

    engine.recalculate_after_change(document_id, Month::containing(time))?;
    println!(
        "Recorded {} on {} (acct: {}, {} unit(s))",
        fmt_money(amount),
        time.date(),
        account_name,
        unit_count
    );
    Ok(())
}

/// Time of a transaction, which must belong to the document.
fn transaction_time(conn: &Connection, document_id: i64, id: i64) -> Result<NaiveDateTime> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT t.time FROM transactions t JOIN accounts a ON a.id=t.account_id
             WHERE t.id=?1 AND a.document_id=?2",
            params![id, document_id],
            |r| r.get(0),
        )
        .optional()?;
    let raw = raw.ok_or_else(|| anyhow!("Transaction {} not found in document", id))?;
    parse_instant(&raw).ok_or_else(|| anyhow!("Transaction {} has invalid time '{}'", id, raw))
}

fn edit(engine: &Engine, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let new_time = sub
        .get_one::<String>("time")
        .map(|s| parse_time(s))
        .transpose()?;
    let amount = sub
        .get_one::<String>("amount")
        .map(|s| parse_amount(s))
        .transpose()?;
    let payee = sub.get_one::<String>("payee").map(|s| s.trim().to_string());
    let memo = sub.get_one::<String>("memo").cloned();
    if new_time.is_none() && amount.is_none() && payee.is_none() && memo.is_none() {
        return Err(anyhow!("Nothing to change: pass --time, --amount, --payee or --memo"));
    }

    let (document_id, old_time, time) = {
        let mut conn = engine.store().conn()?;
        let document_id = id_for_document(&conn, sub.get_one::<String>("document").unwrap())?;
        let old_time = transaction_time(&conn, document_id, id)?;
        let time = new_time.unwrap_or(old_time);

        let tx = conn.transaction()?;
        let payee_id = payee
            .as_deref()
            .map(|name| payee_id_for(&tx, document_id, name))
            .transpose()?;
        tx.execute(
            "UPDATE transactions SET time=?2,
                amount=COALESCE(?3, amount),
                payee_id=COALESCE(?4, payee_id),
                memo=COALESCE(?5, memo)
             WHERE id=?1",
            params![id, format_instant(time), amount, payee_id, memo],
        )?;
        tx.commit()?;
        (document_id, old_time, time)
    };

    // a move between months affects both; the later one is covered from the earlier
    let from = Month::containing(old_time).min(Month::containing(time));
    engine.recalculate_after_change(document_id, from)?;
    println!("Updated transaction {} (recalculated from {})", id, from);
    Ok(())
}

fn delete(engine: &Engine, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let (document_id, time) = {
        let mut conn = engine.store().conn()?;
        let document_id = id_for_document(&conn, sub.get_one::<String>("document").unwrap())?;
        let time = transaction_time(&conn, document_id, id)?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM units WHERE transaction_id=?1", params![id])?;
        tx.execute("DELETE FROM transactions WHERE id=?1", params![id])?;
        tx.commit()?;
        (document_id, time)
    };
    engine.recalculate_after_change(document_id, Month::containing(time))?;
    println!("Deleted transaction {}", id);
    Ok(())
}

fn list(engine: &Engine, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_rows(&*engine.store().conn()?, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.id.to_string(),
                    r.time.clone(),
                    r.account.clone(),
                    r.payee.clone(),
                    fmt_money(r.amount),
                    r.units.to_string(),
                    r.memo.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["ID", "Time", "Account", "Payee", "Amount", "Units", "Memo"], rows)
        );
    }
    Ok(())
}

#[derive(Serialize)]
pub struct TransactionRow {
    pub id: i64,
    pub time: String,
    pub account: String,
    pub payee: String,
    pub amount: i64,
    pub units: i64,
    pub memo: String,
}

pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<TransactionRow>> {
    let document_id = id_for_document(conn, sub.get_one::<String>("document").unwrap())?;
    let mut sql = String::from(
        "SELECT t.time, a.name, p.name, t.amount,
                (SELECT COUNT(*) FROM units u WHERE u.transaction_id=t.id), t.memo, t.id
         FROM transactions t JOIN accounts a ON t.account_id=a.id
         LEFT JOIN payees p ON p.id=t.payee_id
         WHERE a.document_id=?",
    );
    let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(document_id)];

    if let Some(month) = sub.get_one::<String>("month") {
        let window = TimeWindow::within(parse_month(month)?);
        sql.push_str(" AND t.time>=? AND t.time<=?");
        params_vec.push(Box::new(window.start_text()));
        params_vec.push(Box::new(window.end_text()));
    }
    sql.push_str(" ORDER BY t.time DESC, t.id DESC");
    if let Some(limit) = sub.get_one::<usize>("limit") {
        sql.push_str(" LIMIT ?");
        params_vec.push(Box::new(*limit as i64));
    }

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(rusqlite::params_from_iter(params_vec.iter()))?;

    let mut data = Vec::new();
    while let Some(r) = rows.next()? {
        let payee: Option<String> = r.get(2)?;
        let memo: Option<String> = r.get(5)?;
        data.push(TransactionRow {
            id: r.get(6)?,
            time: r.get(0)?,
            account: r.get(1)?,
            payee: payee.unwrap_or_default(),
            amount: r.get(3)?,
            units: r.get(4)?,
            memo: memo.unwrap_or_default(),
        });
    }
    Ok(data)
}
