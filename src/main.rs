// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use std::sync::Arc;

use pennyjar::summary::DEFAULT_THREADS;
use pennyjar::{Engine, cli, commands, db, ledger::SqliteLedger};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let conn = db::open_or_init()?;
    let threads = matches
        .get_one::<usize>("threads")
        .copied()
        .unwrap_or(DEFAULT_THREADS);
    let engine = Engine::new(Arc::new(SqliteLedger::new(conn)), threads)?;

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", db::db_path()?.display());
        }
        Some(("document", sub)) => commands::documents::handle(&*engine.store().conn()?, sub)?,
        Some(("account", sub)) => commands::accounts::handle(&*engine.store().conn()?, sub)?,
        Some(("category", sub)) => commands::categories::handle(&*engine.store().conn()?, sub)?,
        Some(("budget", sub)) => commands::budgets::handle(&*engine.store().conn()?, sub)?,
        Some(("payee", sub)) => commands::payees::handle(&*engine.store().conn()?, sub)?,
        Some(("settings", sub)) => commands::settings::handle(&*engine.store().conn()?, sub)?,
        Some(("portion", sub)) => commands::portions::handle(&engine, sub)?,
        Some(("tx", sub)) => commands::transactions::handle(&engine, sub)?,
        Some(("summary", sub)) => commands::summaries::handle(&engine, sub)?,
        Some(("report", sub)) => commands::reports::handle(&engine, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&engine, sub)?,
        Some(("doctor", _)) => commands::doctor::handle(&engine)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
