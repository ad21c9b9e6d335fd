// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::aggregator::MonthAggregator;
use super::calculator::calculate;
use crate::errors::{Error, Result};
use crate::ledger::LedgerStore;
use crate::models::Summary;
use crate::month::Month;
use log::{info, warn};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::sync::Arc;

pub const DEFAULT_THREADS: usize = 4;

/// Owns the worker pool that fans recalculation out across months.
///
/// Each month only reads the ledger and writes its own summary row, so months
/// run in any order. Mutations racing with a recalculation are not detected;
/// callers that need consistency serialize mutate-then-recalculate per
/// document.
pub struct SummaryScheduler<S: LedgerStore> {
    store: Arc<S>,
    pool: ThreadPool,
}

impl<S: LedgerStore> SummaryScheduler<S> {
    pub fn new(store: Arc<S>, threads: usize) -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads.max(1))
            .thread_name(|i| format!("summary-{}", i))
            .build()?;
        Ok(SummaryScheduler { store, pool })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the stored summary, or calculates and persists a fresh one.
    pub fn get_or_create(&self, document_id: i64, month: &str) -> Result<Summary> {
        let month: Month = month.parse()?;
        if let Some(summary) = self.store.find_summary(document_id, month)? {
            return Ok(summary);
        }
        if !self.store.document_exists(document_id)? {
            return Err(Error::DocumentNotFound(document_id));
        }
        let mut summary = Summary::new(document_id, month);
        self.recalculate(&mut summary)?;
        Ok(summary)
    }

    /// Recalculates every stored summary of the document from `month` on.
    pub fn recalculate_from(&self, document_id: i64, month: &str) -> Result<Vec<Summary>> {
        let month: Month = month.parse()?;
        self.recalculate_from_month(document_id, month)
    }

    /// Hook for ledger mutations: refresh everything the change can reach.
    pub fn recalculate_after_change(
        &self,
        document_id: i64,
        changed: Month,
    ) -> Result<Vec<Summary>> {
        self.recalculate_from_month(document_id, changed)
    }

    fn recalculate_from_month(&self, document_id: i64, month: Month) -> Result<Vec<Summary>> {
        if !self.store.document_exists(document_id)? {
            return Err(Error::DocumentNotFound(document_id));
        }
        let summaries = self.store.summaries_from(document_id, month)?;
        let total = summaries.len();

        let results: Vec<Result<Summary>> = self.pool.install(|| {
            summaries
                .into_par_iter()
                .map(|mut summary| -> Result<Summary> {
                    self.recalculate(&mut summary)?;
                    Ok(summary)
                })
                .collect()
        });

        let mut updated = Vec::with_capacity(total);
        let mut failures = Vec::new();
        for result in results {
            match result {
                Ok(summary) => updated.push(summary),
                Err(err) => failures.push(err),
            }
        }
        if failures.is_empty() {
            info!(
                "recalculated {} summaries of document {} from {}",
                total, document_id, month
            );
            return Ok(updated);
        }

        for err in &failures {
            warn!("summary recalculation for document {} failed: {}", document_id, err);
        }
        let failed = failures.len();
        let first = failures.swap_remove(0);
        Err(Error::Recalculation {
            failed,
            total,
            first: Box::new(first),
        })
    }

    /// Recomputes one summary from the full ledger history and saves it.
    pub fn recalculate(&self, summary: &mut Summary) -> Result<()> {
        let figures =
            MonthAggregator::new(self.store.as_ref()).aggregate(summary.document_id, summary.month)?;
        let mut next = summary.clone();
        next.apply(calculate(&figures)?);
        next.id = Some(self.store.save_summary(&next)?);
        *summary = next;
        Ok(())
    }

    /// Calculates without persisting.
    pub fn preview(&self, document_id: i64, month: Month) -> Result<Summary> {
        let figures = MonthAggregator::new(self.store.as_ref()).aggregate(document_id, month)?;
        let mut summary = Summary::new(document_id, month);
        summary.apply(calculate(&figures)?);
        Ok(summary)
    }
}
