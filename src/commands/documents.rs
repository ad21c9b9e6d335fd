// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::Document;
use crate::utils::pretty_table;
use anyhow::Result;
use rusqlite::{Connection, params};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").unwrap().trim();
            conn.execute("INSERT INTO documents(name) VALUES (?1)", params![name])?;
            println!("Added document '{}'", name);
        }
        Some(("list", _)) => {
            let data = list_documents(conn)?
                .into_iter()
                .map(|d| vec![d.id.to_string(), d.name])
                .collect();
            println!("{}", pretty_table(&["ID", "Document"], data));
        }
        _ => {}
    }
    Ok(())
}

pub fn list_documents(conn: &Connection) -> Result<Vec<Document>> {
    let mut stmt = conn.prepare("SELECT id, name FROM documents ORDER BY name")?;
    let rows = stmt.query_map([], |r| {
        Ok(Document {
            id: r.get(0)?,
            name: r.get(1)?,
        })
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}
