// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::Budget;
use crate::utils::{id_for_category, id_for_document, pretty_table};
use anyhow::Result;
use rusqlite::{Connection, params};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let document_id = id_for_document(conn, sub.get_one::<String>("document").unwrap())?;
    let cat = sub.get_one::<String>("category").unwrap().trim();
    let name = sub.get_one::<String>("name").unwrap().trim();
    let cat_id = id_for_category(conn, document_id, cat)?;
    conn.execute(
        "INSERT INTO budgets(category_id, name) VALUES (?1, ?2)",
        params![cat_id, name],
    )?;
    println!("Added budget '{}' under {}", name, cat);
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let document_id = id_for_document(conn, sub.get_one::<String>("document").unwrap())?;
    let mut stmt = conn.prepare(
        "SELECT b.id, b.name, b.category_id, c.name FROM budgets b
         JOIN categories c ON c.id=b.category_id
         WHERE c.document_id=?1 ORDER BY c.name, b.name",
    )?;
    let rows = stmt.query_map(params![document_id], |r| {
        Ok((
            Budget {
                id: r.get(0)?,
                name: r.get(1)?,
                category_id: r.get(2)?,
            },
            r.get::<_, String>(3)?,
        ))
    })?;
    let mut data = Vec::new();
    for row in rows {
        let (budget, category) = row?;
        data.push(vec![category, budget.name]);
    }
    println!("{}", pretty_table(&["Category", "Budget"], data));
    Ok(())
}
