// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::Account;
use crate::utils::{id_for_document, pretty_table};
use anyhow::Result;
use rusqlite::{Connection, params};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let document = sub.get_one::<String>("document").unwrap();
            let name = sub.get_one::<String>("name").unwrap().trim();
            let document_id = id_for_document(conn, document)?;
            conn.execute(
                "INSERT INTO accounts(document_id, name) VALUES (?1, ?2)",
                params![document_id, name],
            )?;
            println!("Added account '{}' to {}", name, document.trim());
        }
        Some(("list", sub)) => {
            let document_id = id_for_document(conn, sub.get_one::<String>("document").unwrap())?;
            let data = accounts_of(conn, document_id)?
                .into_iter()
                .map(|a| vec![a.id.to_string(), a.name])
                .collect();
            println!("{}", pretty_table(&["ID", "Account"], data));
        }
        _ => {}
    }
    Ok(())
}

pub fn accounts_of(conn: &Connection, document_id: i64) -> Result<Vec<Account>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, document_id FROM accounts WHERE document_id=?1 ORDER BY name",
    )?;
    let rows = stmt.query_map(params![document_id], |r| {
        Ok(Account {
            id: r.get(0)?,
            name: r.get(1)?,
            document_id: r.get(2)?,
        })
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}
