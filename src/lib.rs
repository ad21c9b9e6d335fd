// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod cli;
pub mod commands;
pub mod db;
pub mod errors;
pub mod ledger;
pub mod models;
pub mod month;
pub mod summary;
pub mod utils;

/// The scheduler wired to the SQLite ledger, as used by the CLI.
pub type Engine = summary::SummaryScheduler<ledger::SqliteLedger>;
