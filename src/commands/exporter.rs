// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::Engine;
use crate::commands::summaries::stored_summaries;
use crate::utils::id_for_document;
use anyhow::{Result, anyhow};

pub fn handle(engine: &Engine, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("summaries", sub)) => export_summaries(engine, sub),
        _ => Ok(()),
    }
}

fn export_summaries(engine: &Engine, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().trim().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();
    let document_id = id_for_document(
        &*engine.store().conn()?,
        sub.get_one::<String>("document").unwrap(),
    )?;
    let summaries = stored_summaries(engine, document_id)?;

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "month",
                "available",
                "available_last_month",
                "income",
                "budgeted",
                "unbudgeted",
                "outflow",
                "balance",
            ])?;
            for s in &summaries {
                wtr.write_record([
                    s.month.to_string(),
                    s.available.to_string(),
                    s.available_last_month.to_string(),
                    s.income.to_string(),
                    s.budgeted.to_string(),
                    s.unbudgeted.to_string(),
                    s.outflow.to_string(),
                    s.balance.to_string(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            std::fs::write(out, serde_json::to_string_pretty(&summaries)?)?;
        }
        _ => return Err(anyhow!("Unknown format: {} (use csv|json)", fmt)),
    }
    println!("Exported {} summaries to {}", summaries.len(), out);
    Ok(())
}
