// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::Setting;
use crate::month::{Month, format_instant, parse_instant};
use anyhow::{Context, Result, anyhow};
use chrono::NaiveDateTime;
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use log::warn;
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

pub fn parse_time(s: &str) -> Result<NaiveDateTime> {
    parse_instant(s).ok_or_else(|| {
        anyhow!(
            "Invalid time '{}', expected YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS",
            s.trim()
        )
    })
}

/// The current UTC instant in stored text form.
pub fn now_instant() -> String {
    format_instant(chrono::Utc::now().naive_utc())
}

pub fn parse_month(s: &str) -> Result<Month> {
    Ok(s.parse::<Month>()?)
}

/// Parses a decimal amount ("12.34") into minor units (1234).
pub fn parse_amount(s: &str) -> Result<i64> {
    let d = s
        .trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid amount '{}'", s.trim()))?;
    let minor = d * Decimal::ONE_HUNDRED;
    if minor.fract() != Decimal::ZERO {
        return Err(anyhow!("Amount '{}' has more than two decimals", s.trim()));
    }
    minor
        .to_i64()
        .ok_or_else(|| anyhow!("Amount '{}' is out of range", s.trim()))
}

pub fn fmt_money(minor: i64) -> String {
    format!("{:.2}", Decimal::new(minor, 2))
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn id_for_document(conn: &Connection, name: &str) -> Result<i64> {
    let mut stmt = conn.prepare("SELECT id FROM documents WHERE name=?1")?;
    let id: i64 = stmt
        .query_row(params![name.trim()], |r| r.get(0))
        .with_context(|| format!("Document '{}' not found", name.trim()))?;
    Ok(id)
}

pub fn id_for_account(conn: &Connection, document_id: i64, name: &str) -> Result<i64> {
    let mut stmt = conn.prepare("SELECT id FROM accounts WHERE document_id=?1 AND name=?2")?;
    let id: i64 = stmt
        .query_row(params![document_id, name.trim()], |r| r.get(0))
        .with_context(|| format!("Account '{}' not found", name.trim()))?;
    Ok(id)
}

pub fn id_for_category(conn: &Connection, document_id: i64, name: &str) -> Result<i64> {
    let mut stmt = conn.prepare("SELECT id FROM categories WHERE document_id=?1 AND name=?2")?;
    let id: i64 = stmt
        .query_row(params![document_id, name.trim()], |r| r.get(0))
        .with_context(|| format!("Category '{}' not found", name.trim()))?;
    Ok(id)
}

pub fn id_for_budget(conn: &Connection, document_id: i64, name: &str) -> Result<i64> {
    let mut stmt = conn.prepare(
        "SELECT b.id FROM budgets b JOIN categories c ON c.id=b.category_id
         WHERE c.document_id=?1 AND b.name=?2 ORDER BY b.id LIMIT 1",
    )?;
    let id: i64 = stmt
        .query_row(params![document_id, name.trim()], |r| r.get(0))
        .with_context(|| format!("Budget '{}' not found", name.trim()))?;
    Ok(id)
}

// Settings hold JSON-encoded values, scoped to a document
fn decode_setting(key: &str, raw: &str) -> serde_json::Value {
    serde_json::from_str(raw).unwrap_or_else(|err| {
        warn!("unable to parse value of setting '{}' ({}): {}", key, raw, err);
        serde_json::Value::Null
    })
}

pub fn get_setting(
    conn: &Connection,
    document_id: i64,
    key: &str,
) -> Result<Option<serde_json::Value>> {
    let v: Option<String> = conn
        .query_row(
            "SELECT value FROM settings WHERE document_id=?1 AND key=?2",
            params![document_id, key],
            |r| r.get(0),
        )
        .optional()?;
    Ok(v.map(|raw| decode_setting(key, &raw)))
}

/// Creates a setting; a key exists at most once per document.
pub fn create_setting(
    conn: &Connection,
    document_id: i64,
    key: &str,
    value: &serde_json::Value,
) -> Result<i64> {
    let key = key.trim();
    if key.is_empty() {
        return Err(anyhow!("Setting key must not be empty"));
    }
    if get_setting(conn, document_id, key)?.is_some() {
        return Err(anyhow!("Setting '{}' already exists in this document", key));
    }
    conn.execute(
        "INSERT INTO settings(document_id, key, value) VALUES (?1, ?2, ?3)",
        params![document_id, key, serde_json::to_string(value)?],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_setting(
    conn: &Connection,
    document_id: i64,
    key: &str,
    value: &serde_json::Value,
) -> Result<()> {
    let changed = conn.execute(
        "UPDATE settings SET value=?3 WHERE document_id=?1 AND key=?2",
        params![document_id, key.trim(), serde_json::to_string(value)?],
    )?;
    if changed == 0 {
        return Err(anyhow!("Setting '{}' not found", key.trim()));
    }
    Ok(())
}

pub fn list_settings(conn: &Connection, document_id: i64) -> Result<Vec<Setting>> {
    let mut stmt = conn.prepare(
        "SELECT id, document_id, key, value FROM settings WHERE document_id=?1 ORDER BY key",
    )?;
    let rows = stmt.query_map(params![document_id], |r| {
        Ok((
            r.get::<_, i64>(0)?,
            r.get::<_, i64>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, String>(3)?,
        ))
    })?;
    let mut out = Vec::new();
    for row in rows {
        let (id, document_id, key, raw) = row?;
        out.push(Setting {
            id,
            document_id,
            value: decode_setting(&key, &raw),
            key,
        });
    }
    Ok(out)
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}
