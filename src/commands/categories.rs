// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::Category;
use crate::utils::{id_for_document, pretty_table};
use anyhow::Result;
use rusqlite::{Connection, params};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let document_id = id_for_document(conn, sub.get_one::<String>("document").unwrap())?;
            let name = sub.get_one::<String>("name").unwrap().trim();
            conn.execute(
                "INSERT INTO categories(document_id, name) VALUES (?1, ?2)",
                params![document_id, name],
            )?;
            println!("Added category '{}'", name);
        }
        Some(("list", sub)) => {
            let document_id = id_for_document(conn, sub.get_one::<String>("document").unwrap())?;
            let mut stmt = conn.prepare(
                "SELECT id, name, document_id FROM categories WHERE document_id=?1 ORDER BY name",
            )?;
            let rows = stmt.query_map(params![document_id], |r| {
                Ok(Category {
                    id: r.get(0)?,
                    name: r.get(1)?,
                    document_id: r.get(2)?,
                })
            })?;
            let mut data = Vec::new();
            for row in rows {
                data.push(vec![row?.name]);
            }
            println!("{}", pretty_table(&["Category"], data));
        }
        _ => {}
    }
    Ok(())
}
