// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::Payee;
use crate::month::format_instant;
use crate::utils::{id_for_document, maybe_print_json, now_instant, parse_time, pretty_table};
use anyhow::{Result, anyhow};
use chrono::NaiveDateTime;
use rusqlite::{Connection, OptionalExtension, params};

const MAX_NAME_LEN: usize = 255;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let document_id = id_for_document(conn, sub.get_one::<String>("document").unwrap())?;
            let name = sub.get_one::<String>("name").unwrap().trim();
            if find_payee(conn, document_id, name)?.is_some() {
                return Err(anyhow!("Payee '{}' already exists", name));
            }
            add_payee(conn, document_id, name)?;
            println!("Added payee '{}'", name);
        }
        Some(("list", sub)) => {
            let document_id = id_for_document(conn, sub.get_one::<String>("document").unwrap())?;
            let filter = PayeeFilter {
                search: sub.get_one::<String>("search").map(|s| s.trim().to_string()),
                updated_since: sub
                    .get_one::<String>("updated-since")
                    .map(|s| parse_time(s))
                    .transpose()?,
                limit: sub.get_one::<usize>("limit").copied(),
            };
            let payees = query_payees(conn, document_id, &filter)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &payees)? {
                let data = payees
                    .into_iter()
                    .map(|p| vec![p.id.to_string(), p.name, p.updated_at])
                    .collect();
                println!("{}", pretty_table(&["ID", "Payee", "Updated"], data));
            }
        }
        _ => {}
    }
    Ok(())
}

fn find_payee(conn: &Connection, document_id: i64, name: &str) -> Result<Option<i64>> {
    let id = conn
        .query_row(
            "SELECT id FROM payees WHERE document_id=?1 AND name=?2",
            params![document_id, name],
            |r| r.get(0),
        )
        .optional()?;
    Ok(id)
}

fn add_payee(conn: &Connection, document_id: i64, name: &str) -> Result<i64> {
    if name.is_empty() {
        return Err(anyhow!("Payee name must not be empty"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(anyhow!(
            "Payee name is too long, only {} characters allowed",
            MAX_NAME_LEN
        ));
    }
    conn.execute(
        "INSERT INTO payees(document_id, name, updated_at) VALUES (?1, ?2, ?3)",
        params![document_id, name, now_instant()],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Id of the named payee in the document, created on first use.
pub fn payee_id_for(conn: &Connection, document_id: i64, name: &str) -> Result<i64> {
    let name = name.trim();
    match find_payee(conn, document_id, name)? {
        Some(id) => Ok(id),
        None => add_payee(conn, document_id, name),
    }
}

#[derive(Debug, Clone, Default)]
pub struct PayeeFilter {
    /// Substring match on the name.
    pub search: Option<String>,
    pub updated_since: Option<NaiveDateTime>,
    pub limit: Option<usize>,
}

pub fn query_payees(
    conn: &Connection,
    document_id: i64,
    filter: &PayeeFilter,
) -> Result<Vec<Payee>> {
    let mut sql =
        String::from("SELECT id, name, document_id, updated_at FROM payees WHERE document_id=?");
    let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(document_id)];

    if let Some(q) = filter.search.as_deref().filter(|q| !q.is_empty()) {
        sql.push_str(" AND name LIKE ?");
        params_vec.push(Box::new(format!("%{}%", q)));
    }
    if let Some(since) = filter.updated_since {
        sql.push_str(" AND updated_at>=?");
        params_vec.push(Box::new(format_instant(since)));
    }
    sql.push_str(" ORDER BY name");
    if let Some(limit) = filter.limit {
        sql.push_str(" LIMIT ?");
        params_vec.push(Box::new(limit as i64));
    }

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(params_vec.iter()), |r| {
        Ok(Payee {
            id: r.get(0)?,
            name: r.get(1)?,
            document_id: r.get(2)?,
            updated_at: r.get(3)?,
        })
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}
