// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::{
    create_setting, get_setting, id_for_document, list_settings, maybe_print_json, pretty_table,
    update_setting,
};
use anyhow::{Result, anyhow};
use rusqlite::Connection;

// Bare words are stored as JSON strings
fn value_arg(sub: &clap::ArgMatches) -> serde_json::Value {
    let raw = sub.get_one::<String>("value").unwrap().trim();
    serde_json::from_str(raw).unwrap_or_else(|_| serde_json::Value::String(raw.to_string()))
}

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let Some((name, sub)) = m.subcommand() else {
        return Ok(());
    };
    let document = sub.get_one::<String>("document").unwrap();
    let document_id = id_for_document(conn, document)?;
    match name {
        "set" => {
            let key = sub.get_one::<String>("key").unwrap().trim();
            let value = value_arg(sub);
            create_setting(conn, document_id, key, &value)?;
            println!("Set {} = {} in {}", key, value, document.trim());
        }
        "update" => {
            let key = sub.get_one::<String>("key").unwrap().trim();
            let value = value_arg(sub);
            update_setting(conn, document_id, key, &value)?;
            println!("Updated {} = {} in {}", key, value, document.trim());
        }
        "get" => {
            let key = sub.get_one::<String>("key").unwrap().trim();
            match get_setting(conn, document_id, key)? {
                Some(v) => println!("{}", v),
                None => return Err(anyhow!("Setting '{}' not found", key)),
            }
        }
        "list" => {
            let settings = list_settings(conn, document_id)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &settings)? {
                let data = settings
                    .into_iter()
                    .map(|s| vec![s.key, s.value.to_string()])
                    .collect();
                println!("{}", pretty_table(&["Key", "Value"], data));
            }
        }
        _ => {}
    }
    Ok(())
}
