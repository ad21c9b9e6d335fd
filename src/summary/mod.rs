// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Monthly summary engine: aggregate the ledger, combine the windows, and
//! keep stored rollups current as history changes.

pub mod aggregator;
pub mod calculator;
pub mod scheduler;

pub use aggregator::{MonthAggregator, MonthFigures, WindowTotals};
pub use calculator::{SummaryFigures, calculate};
pub use scheduler::{DEFAULT_THREADS, SummaryScheduler};
